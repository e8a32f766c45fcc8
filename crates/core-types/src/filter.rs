use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::OrderStatus;
use crate::error::CoreError;
use crate::records::Order;

/// Narrows the orders considered by the loader. Every unset field matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesFilter {
    year: Option<i32>,
    month: Option<u32>,
    status: Option<OrderStatus>,
}

impl SalesFilter {
    /// Builds a filter, rejecting a month outside 1..=12.
    pub fn new(
        year: Option<i32>,
        month: Option<u32>,
        status: Option<OrderStatus>,
    ) -> Result<Self, CoreError> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(CoreError::InvalidInput("month".to_string(), m.to_string()));
            }
        }
        Ok(Self { year, month, status })
    }

    /// A filter that keeps every order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn status(&self) -> Option<OrderStatus> {
        self.status
    }

    pub fn is_unfiltered(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.status.is_none()
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.year.is_none_or(|y| order.purchase_year() == y)
            && self.month.is_none_or(|m| order.purchase_month() == m)
            && self.status.is_none_or(|s| order.status == s)
    }

    /// The same filter shifted one year back; the comparison slice.
    /// `None` when no year is selected, since there is no earlier period to compare with.
    pub fn previous_year(&self) -> Option<Self> {
        self.year.map(|y| Self { year: Some(y - 1), ..*self })
    }
}

impl fmt::Display for SalesFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.year, self.month) {
            (Some(y), Some(m)) => write!(f, "{y}-{m:02}")?,
            (Some(y), None) => write!(f, "{y}")?,
            (None, Some(m)) => write!(f, "all years, month {m:02}")?,
            (None, None) => f.write_str("all periods")?,
        }
        if let Some(status) = self.status {
            write!(f, " ({status})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(y: i32, m: u32, status: OrderStatus) -> Order {
        Order {
            order_id: "o".into(),
            customer_id: "c".into(),
            status,
            purchased_at: NaiveDate::from_ymd_opt(y, m, 15).unwrap().and_hms_opt(12, 0, 0).unwrap(),
            delivered_at: None,
        }
    }

    #[test]
    fn rejects_month_out_of_range() {
        assert!(SalesFilter::new(Some(2017), Some(0), None).is_err());
        assert!(SalesFilter::new(Some(2017), Some(13), None).is_err());
        assert!(SalesFilter::new(Some(2017), Some(12), None).is_ok());
    }

    #[test]
    fn matches_every_set_field() {
        let filter = SalesFilter::new(Some(2017), Some(5), Some(OrderStatus::Delivered)).unwrap();
        assert!(filter.matches(&order(2017, 5, OrderStatus::Delivered)));
        assert!(!filter.matches(&order(2017, 5, OrderStatus::Shipped)));
        assert!(!filter.matches(&order(2017, 6, OrderStatus::Delivered)));
        assert!(!filter.matches(&order(2018, 5, OrderStatus::Delivered)));
        assert!(SalesFilter::all().matches(&order(2016, 1, OrderStatus::Other)));
    }

    #[test]
    fn previous_year_keeps_month_and_status() {
        let filter = SalesFilter::new(Some(2018), Some(3), Some(OrderStatus::Delivered)).unwrap();
        let previous = filter.previous_year().unwrap();
        assert_eq!(previous.year(), Some(2017));
        assert_eq!(previous.month(), Some(3));
        assert_eq!(previous.status(), Some(OrderStatus::Delivered));
        assert_eq!(SalesFilter::all().previous_year(), None);
    }

    #[test]
    fn displays_period() {
        let filter = SalesFilter::new(Some(2017), Some(5), Some(OrderStatus::Delivered)).unwrap();
        assert_eq!(filter.to_string(), "2017-05 (delivered)");
        assert_eq!(SalesFilter::all().to_string(), "all periods");
    }
}
