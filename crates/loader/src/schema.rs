//! Column layouts of the six source files and their conversion into domain records.
//!
//! Each `*Row` struct mirrors one CSV file by column name. Extra columns are
//! ignored; columns listed in [`Table::required_columns`] must be present in the
//! header, the rest may be omitted entirely.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use core_types::{Customer, Order, OrderItem, OrderStatus, Payment, Product, Review};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, de};
use std::fmt;
use std::str::FromStr;

use configuration::DataSettings;

/// One of the six input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Orders,
    OrderItems,
    Products,
    Customers,
    Reviews,
    Payments,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Orders,
        Table::OrderItems,
        Table::Products,
        Table::Customers,
        Table::Reviews,
        Table::Payments,
    ];

    /// Columns the header must contain for the file to be usable.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Orders => &[
                "order_id",
                "customer_id",
                "order_status",
                "order_purchase_timestamp",
            ],
            Table::OrderItems => &["order_id", "product_id", "price", "freight_value"],
            Table::Products => &["product_id", "product_category_name"],
            Table::Customers => &["customer_id", "customer_state"],
            Table::Reviews => &["order_id", "review_score"],
            Table::Payments => &["order_id", "payment_value"],
        }
    }

    pub fn file_name<'a>(&self, settings: &'a DataSettings) -> &'a str {
        match self {
            Table::Orders => &settings.orders_file,
            Table::OrderItems => &settings.order_items_file,
            Table::Products => &settings.products_file,
            Table::Customers => &settings.customers_file,
            Table::Reviews => &settings.reviews_file,
            Table::Payments => &settings.payments_file,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Orders => "orders",
            Table::OrderItems => "order items",
            Table::Products => "products",
            Table::Customers => "customers",
            Table::Reviews => "reviews",
            Table::Payments => "payments",
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderRow {
    order_id: String,
    customer_id: String,
    order_status: OrderStatus,
    #[serde(deserialize_with = "timestamp")]
    order_purchase_timestamp: NaiveDateTime,
    #[serde(default, deserialize_with = "optional_timestamp")]
    order_delivered_customer_date: Option<NaiveDateTime>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            order_id: row.order_id,
            customer_id: row.customer_id,
            status: row.order_status,
            purchased_at: row.order_purchase_timestamp,
            delivered_at: row.order_delivered_customer_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderItemRow {
    order_id: String,
    #[serde(default = "first_item")]
    order_item_id: u32,
    product_id: String,
    #[serde(deserialize_with = "decimal")]
    price: Decimal,
    #[serde(deserialize_with = "decimal")]
    freight_value: Decimal,
}

fn first_item() -> u32 {
    1
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            order_id: row.order_id,
            order_item_id: row.order_item_id,
            product_id: row.product_id,
            price: row.price,
            freight_value: row.freight_value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRow {
    product_id: String,
    product_category_name: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            product_id: row.product_id,
            category: row.product_category_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerRow {
    customer_id: String,
    customer_state: Option<String>,
    #[serde(default)]
    customer_city: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            customer_id: row.customer_id,
            state: row.customer_state,
            city: row.customer_city,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRow {
    order_id: String,
    #[serde(deserialize_with = "review_score")]
    review_score: u8,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            order_id: row.order_id,
            score: row.review_score,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentRow {
    order_id: String,
    #[serde(default)]
    payment_type: Option<String>,
    #[serde(deserialize_with = "decimal")]
    payment_value: Decimal,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            order_id: row.order_id,
            payment_type: row.payment_type,
            payment_value: row.payment_value,
        }
    }
}

// --- Field parsers ---

/// Accepted purchase/delivery timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub(crate) fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| format!("invalid timestamp '{value}'"))
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| format!("invalid decimal '{value}'"))
}

pub(crate) fn parse_review_score(value: &str) -> Result<u8, String> {
    let score = parse_decimal(value).map_err(|_| format!("invalid review score '{value}'"))?;
    match score.to_u8() {
        Some(whole @ 1..=5) if score.fract().is_zero() => Ok(whole),
        _ => Err(format!("review score '{value}' is outside 1..=5")),
    }
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).map_err(de::Error::custom)
}

fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.is_empty() => parse_timestamp(&value).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_decimal(&value).map_err(de::Error::custom)
}

fn review_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_review_score(&value).map_err(de::Error::custom)
}
