use configuration::DataSettings;
use core_types::{SalesFilter, SalesRecord};
use std::path::{Path, PathBuf};

use crate::dataset::Dataset;
use crate::error::LoaderError;
use crate::reader::read_table;
use crate::schema::{
    CustomerRow, OrderItemRow, OrderRow, PaymentRow, ProductRow, ReviewRow, Table,
};

/// Reads the six source files from a data directory.
///
/// The loader keeps no cache: every call re-reads the files, so each filter
/// change works on what is on disk at that moment.
#[derive(Debug, Clone)]
pub struct DataLoader {
    settings: DataSettings,
}

impl DataLoader {
    /// A loader for `dir` using the default file names.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            settings: DataSettings {
                dir: dir.into(),
                ..DataSettings::default()
            },
        }
    }

    pub fn from_settings(settings: &DataSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.settings.dir
    }

    pub fn path_for(&self, table: Table) -> PathBuf {
        self.settings.dir.join(table.file_name(&self.settings))
    }

    /// Reads all six tables.
    ///
    /// Every file's presence is checked before any is parsed, so a missing file
    /// is reported as `DataUnavailable` rather than hidden behind a parse error
    /// in another table.
    pub fn load(&self) -> Result<Dataset, LoaderError> {
        for table in Table::ALL {
            let path = self.path_for(table);
            if !path.is_file() {
                return Err(LoaderError::DataUnavailable { table, path });
            }
        }

        let dataset = Dataset {
            orders: read_table::<OrderRow, _>(Table::Orders, &self.path_for(Table::Orders))?,
            order_items: read_table::<OrderItemRow, _>(
                Table::OrderItems,
                &self.path_for(Table::OrderItems),
            )?,
            products: read_table::<ProductRow, _>(Table::Products, &self.path_for(Table::Products))?,
            customers: read_table::<CustomerRow, _>(
                Table::Customers,
                &self.path_for(Table::Customers),
            )?,
            reviews: read_table::<ReviewRow, _>(Table::Reviews, &self.path_for(Table::Reviews))?,
            payments: read_table::<PaymentRow, _>(Table::Payments, &self.path_for(Table::Payments))?,
        };

        let orphans = dataset.orphan_item_count();
        if orphans > 0 {
            tracing::warn!(orphans, "Order items reference orders that do not exist; they are dropped.");
        }
        tracing::info!(
            dir = %self.settings.dir.display(),
            orders = dataset.orders.len(),
            order_items = dataset.order_items.len(),
            "Loaded dataset."
        );
        Ok(dataset)
    }

    /// Loads the data and returns the joined table for `filter`.
    pub fn load_sales(&self, filter: &SalesFilter) -> Result<Vec<SalesRecord>, LoaderError> {
        Ok(self.load()?.sales(filter))
    }
}
