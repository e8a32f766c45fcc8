use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Lifecycle state of an order as recorded in the orders file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Approved,
    Invoiced,
    Processing,
    Shipped,
    Delivered,
    Unavailable,
    Canceled,
    /// Any status string the dataset uses that is not one of the above.
    #[serde(other)]
    Other,
}

impl OrderStatus {
    /// Every status a user can filter on, in display order.
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Created,
        OrderStatus::Approved,
        OrderStatus::Invoiced,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Unavailable,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Approved => "approved",
            OrderStatus::Invoiced => "invoiced",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Unavailable => "unavailable",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Other => "other",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    /// Parses a status typed by a user. Unlike CSV deserialization, unknown values are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        // The dataset spells it "canceled"; accept the British spelling from users too.
        let normalized = if normalized == "cancelled" { "canceled".to_string() } else { normalized };
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidInput("order status".to_string(), s.to_string()))
    }
}

/// Delivery time bucket used by the satisfaction-versus-delivery breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeliverySpeed {
    #[serde(rename = "1-3 days")]
    Fast,
    #[serde(rename = "4-7 days")]
    Standard,
    #[serde(rename = "8+ days")]
    Slow,
    Unknown,
}

impl DeliverySpeed {
    pub const ALL: [DeliverySpeed; 4] = [
        DeliverySpeed::Fast,
        DeliverySpeed::Standard,
        DeliverySpeed::Slow,
        DeliverySpeed::Unknown,
    ];

    /// Buckets a delivery duration in whole days. `None` means the order was never delivered.
    pub fn from_days(days: Option<i64>) -> Self {
        match days {
            None => DeliverySpeed::Unknown,
            Some(d) if d <= 3 => DeliverySpeed::Fast,
            Some(d) if d <= 7 => DeliverySpeed::Standard,
            Some(_) => DeliverySpeed::Slow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliverySpeed::Fast => "1-3 days",
            DeliverySpeed::Standard => "4-7 days",
            DeliverySpeed::Slow => "8+ days",
            DeliverySpeed::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeliverySpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
