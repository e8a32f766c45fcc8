use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::LoaderError;
use crate::schema::Table;

/// Reads every row of `table` from `path`, converting each into `R`.
///
/// The header is checked against the table's required columns before any row
/// is parsed, so a renamed column is reported even for an empty file.
pub(crate) fn read_table<T, R>(table: Table, path: &Path) -> Result<Vec<R>, LoaderError>
where
    T: DeserializeOwned,
    R: From<T>,
{
    if !path.is_file() {
        return Err(LoaderError::DataUnavailable {
            table,
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| map_csv_error(table, e))?;

    let headers = reader
        .headers()
        .map_err(|e| map_csv_error(table, e))?
        .clone();
    for column in table.required_columns() {
        if !headers.iter().any(|header| header == *column) {
            return Err(LoaderError::malformed(
                table,
                Some(1),
                format!("missing required column `{column}`"),
            ));
        }
    }

    let rows = reader
        .deserialize::<T>()
        .map(|row| row.map(R::from).map_err(|e| map_csv_error(table, e)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(%table, rows = rows.len(), path = %path.display(), "Read table.");
    Ok(rows)
}

fn map_csv_error(table: Table, err: csv::Error) -> LoaderError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoaderError::Io { table, source },
        csv::ErrorKind::Deserialize { pos, err } => {
            LoaderError::malformed(table, pos.map(|p| p.line()), err.to_string())
        }
        csv::ErrorKind::Utf8 { pos, err } => {
            LoaderError::malformed(table, pos.map(|p| p.line()), format!("invalid UTF-8: {err}"))
        }
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => LoaderError::malformed(
            table,
            pos.map(|p| p.line()),
            format!("expected {expected_len} fields, found {len}"),
        ),
        other => LoaderError::malformed(table, None, format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{OrderItemRow, OrderRow, ReviewRow};
    use core_types::{Order, OrderItem, OrderStatus, Review};
    use rust_decimal_macros::dec;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table::<OrderRow, Order>(Table::Orders, &dir.path().join("nope.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::DataUnavailable { table: Table::Orders, .. }));
    }

    #[test]
    fn missing_column_is_malformed_even_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "items.csv", "order_id,product_id,price\n");
        let err = read_table::<OrderItemRow, OrderItem>(Table::OrderItems, &path).unwrap_err();
        match err {
            LoaderError::MalformedInput { table, reason, .. } => {
                assert_eq!(table, Table::OrderItems);
                assert!(reason.contains("freight_value"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparsable_price_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "items.csv",
            "order_id,product_id,price,freight_value\nord1,prod1,10.00,1.00\nord2,prod2,abc,1.00\n",
        );
        let err = read_table::<OrderItemRow, OrderItem>(Table::OrderItems, &path).unwrap_err();
        match err {
            LoaderError::MalformedInput { line, reason, .. } => {
                assert_eq!(line, Some(3));
                assert!(reason.contains("abc"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_rows_ignoring_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "orders.csv",
            "order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date,extra\n\
             ord1,cust1,delivered,2023-01-01 10:00:00,2023-01-05 10:00:00,x\n\
             ord2,cust2,canceled,2023-03-01 12:00:00,,y\n\
             ord3,cust3,returned,2023-03-02 12:00:00,,z\n",
        );
        let orders = read_table::<OrderRow, Order>(Table::Orders, &path).unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].delivery_days(), Some(4));
        assert_eq!(orders[1].status, OrderStatus::Canceled);
        assert_eq!(orders[1].delivered_at, None);
        assert_eq!(orders[2].status, OrderStatus::Other);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "items.csv",
            "order_id,product_id,price,freight_value\nord1,prod1,19.90,2.10\n",
        );
        let items = read_table::<OrderItemRow, OrderItem>(Table::OrderItems, &path).unwrap();
        assert_eq!(items[0].order_item_id, 1);
        assert_eq!(items[0].price, dec!(19.90));
    }

    #[test]
    fn out_of_range_review_score_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "reviews.csv", "order_id,review_score\nord1,9\n");
        let err = read_table::<ReviewRow, Review>(Table::Reviews, &path).unwrap_err();
        assert!(matches!(err, LoaderError::MalformedInput { table: Table::Reviews, line: Some(2), .. }));
    }
}
