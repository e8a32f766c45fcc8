use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{DeliverySpeed, OrderStatus};

/// A customer order. One row of the orders file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub purchased_at: NaiveDateTime,
    /// When the order reached the customer. `None` for orders still in flight or canceled.
    pub delivered_at: Option<NaiveDateTime>,
}

impl Order {
    pub fn purchase_year(&self) -> i32 {
        self.purchased_at.year()
    }

    pub fn purchase_month(&self) -> u32 {
        self.purchased_at.month()
    }

    /// Whole days between purchase and delivery, truncated.
    pub fn delivery_days(&self) -> Option<i64> {
        self.delivered_at
            .map(|delivered| (delivered - self.purchased_at).num_days())
    }
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    /// Position of the item within its order, starting at 1.
    pub order_item_id: u32,
    pub product_id: String,
    pub price: Decimal,
    pub freight_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub state: Option<String>,
    pub city: Option<String>,
}

/// A satisfaction review. `score` is always within 1..=5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub order_id: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub order_id: String,
    pub payment_type: Option<String>,
    pub payment_value: Decimal,
}

/// One row of the joined table: an order item enriched with everything the
/// metrics need from the other five tables.
///
/// Attributes that come from a left join are `Option`s; a `None` means the
/// referenced row was absent from its source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_id: String,
    pub order_item_id: u32,
    pub product_id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub purchased_at: NaiveDateTime,
    pub purchase_year: i32,
    pub purchase_month: u32,
    pub delivered_at: Option<NaiveDateTime>,
    pub delivery_days: Option<i64>,
    pub price: Decimal,
    pub freight_value: Decimal,
    pub category: Option<String>,
    pub customer_state: Option<String>,
    pub customer_city: Option<String>,
    pub review_score: Option<u8>,
    /// Sum of every payment made for the order this item belongs to.
    pub order_payment_value: Option<Decimal>,
}

impl SalesRecord {
    /// Builds the joined row for `item`, which must belong to `order`.
    pub fn from_parts(
        order: &Order,
        item: &OrderItem,
        product: Option<&Product>,
        customer: Option<&Customer>,
        review_score: Option<u8>,
        order_payment_value: Option<Decimal>,
    ) -> Self {
        Self {
            order_id: order.order_id.clone(),
            order_item_id: item.order_item_id,
            product_id: item.product_id.clone(),
            customer_id: order.customer_id.clone(),
            status: order.status,
            purchased_at: order.purchased_at,
            purchase_year: order.purchase_year(),
            purchase_month: order.purchase_month(),
            delivered_at: order.delivered_at,
            delivery_days: order.delivery_days(),
            price: item.price,
            freight_value: item.freight_value,
            category: product.and_then(|p| p.category.clone()),
            customer_state: customer.and_then(|c| c.state.clone()),
            customer_city: customer.and_then(|c| c.city.clone()),
            review_score,
            order_payment_value,
        }
    }

    /// Item price plus its freight.
    pub fn total_item_value(&self) -> Decimal {
        self.price + self.freight_value
    }

    pub fn delivery_speed(&self) -> DeliverySpeed {
        DeliverySpeed::from_days(self.delivery_days)
    }
}
