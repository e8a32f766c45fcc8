use core_types::{
    Customer, Order, OrderItem, Payment, Product, Review, SalesFilter, SalesRecord,
};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap, HashSet};

/// The six source tables, typed and held in memory for one render cycle.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub reviews: Vec<Review>,
    pub payments: Vec<Payment>,
}

impl Dataset {
    /// Produces the joined table for the orders matching `filter`.
    ///
    /// Join rules:
    /// - items to orders is an inner join: items whose order is missing or
    ///   filtered out are dropped.
    /// - products, customers, reviews and payments are left joins.
    /// - when an order has several reviews, the last one in the file wins.
    /// - payments are summed per order first, so items are never duplicated.
    ///
    /// Rows come out in order-items file order.
    pub fn sales(&self, filter: &SalesFilter) -> Vec<SalesRecord> {
        let orders: HashMap<&str, &Order> = self
            .orders
            .iter()
            .filter(|order| filter.matches(order))
            .map(|order| (order.order_id.as_str(), order))
            .collect();
        if orders.is_empty() {
            return Vec::new();
        }

        let products: HashMap<&str, &Product> = self
            .products
            .iter()
            .map(|p| (p.product_id.as_str(), p))
            .collect();
        let customers: HashMap<&str, &Customer> = self
            .customers
            .iter()
            .map(|c| (c.customer_id.as_str(), c))
            .collect();
        let reviews: HashMap<&str, u8> = self
            .reviews
            .iter()
            .map(|r| (r.order_id.as_str(), r.score))
            .collect();
        let mut payments: HashMap<&str, Decimal> = HashMap::new();
        for payment in &self.payments {
            *payments.entry(payment.order_id.as_str()).or_insert(Decimal::ZERO) +=
                payment.payment_value;
        }

        let records: Vec<SalesRecord> = self
            .order_items
            .iter()
            .filter_map(|item| {
                let order = orders.get(item.order_id.as_str())?;
                Some(SalesRecord::from_parts(
                    order,
                    item,
                    products.get(item.product_id.as_str()).copied(),
                    customers.get(order.customer_id.as_str()).copied(),
                    reviews.get(order.order_id.as_str()).copied(),
                    payments.get(order.order_id.as_str()).copied(),
                ))
            })
            .collect();

        tracing::debug!(%filter, orders = orders.len(), rows = records.len(), "Joined sales table.");
        records
    }

    /// Distinct purchase years present in the orders table, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.orders
            .iter()
            .map(Order::purchase_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct purchase months, ascending. Restricted to `year` when one is given,
    /// so a selector never offers a month without orders.
    pub fn available_months(&self, year: Option<i32>) -> Vec<u32> {
        self.orders
            .iter()
            .filter(|order| year.is_none_or(|y| order.purchase_year() == y))
            .map(Order::purchase_month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of order items whose order does not exist. These never reach the joined table.
    pub fn orphan_item_count(&self) -> usize {
        let known: HashSet<&str> = self.orders.iter().map(|o| o.order_id.as_str()).collect();
        self.order_items
            .iter()
            .filter(|item| !known.contains(item.order_id.as_str()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use core_types::OrderStatus;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    fn order(id: &str, customer: &str, status: OrderStatus, purchased_at: NaiveDateTime) -> Order {
        Order {
            order_id: id.into(),
            customer_id: customer.into(),
            status,
            purchased_at,
            delivered_at: None,
        }
    }

    fn item(order_id: &str, seq: u32, product_id: &str, price: Decimal) -> OrderItem {
        OrderItem {
            order_id: order_id.into(),
            order_item_id: seq,
            product_id: product_id.into(),
            price,
            freight_value: dec!(10),
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            orders: vec![
                order("ord1", "cust1", OrderStatus::Delivered, at(2023, 1, 1)),
                order("ord2", "cust2", OrderStatus::Delivered, at(2023, 2, 1)),
                order("ord3", "cust3", OrderStatus::Canceled, at(2022, 3, 1)),
            ],
            order_items: vec![
                item("ord1", 1, "prod1", dec!(100)),
                item("ord1", 2, "prod2", dec!(50)),
                item("ord2", 1, "prod2", dec!(200)),
                item("ord3", 1, "prod3", dec!(300)),
                item("ghost", 1, "prod1", dec!(999)),
            ],
            products: vec![
                Product { product_id: "prod1".into(), category: Some("electronics".into()) },
                Product { product_id: "prod2".into(), category: Some("books".into()) },
            ],
            customers: vec![
                Customer { customer_id: "cust1".into(), state: Some("CA".into()), city: None },
                Customer { customer_id: "cust2".into(), state: Some("TX".into()), city: None },
            ],
            reviews: vec![
                Review { order_id: "ord1".into(), score: 2 },
                Review { order_id: "ord1".into(), score: 5 },
                Review { order_id: "ord2".into(), score: 4 },
            ],
            payments: vec![
                Payment { order_id: "ord1".into(), payment_type: None, payment_value: dec!(100) },
                Payment { order_id: "ord1".into(), payment_type: None, payment_value: dec!(70) },
            ],
        }
    }

    #[test]
    fn inner_joins_orders_and_left_joins_the_rest() {
        let rows = dataset().sales(&SalesFilter::all());

        // The item of the unknown order "ghost" is dropped.
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows.iter().map(|r| r.order_id.as_str()).collect::<Vec<_>>(),
            ["ord1", "ord1", "ord2", "ord3"]
        );

        let ord3 = &rows[3];
        assert_eq!(ord3.category, None);
        assert_eq!(ord3.customer_state, None);
        assert_eq!(ord3.review_score, None);
        assert_eq!(ord3.order_payment_value, None);
    }

    #[test]
    fn last_review_wins_and_payments_are_summed_per_order() {
        let rows = dataset().sales(&SalesFilter::all());
        assert!(rows[..2].iter().all(|r| r.review_score == Some(5)));
        assert!(rows[..2].iter().all(|r| r.order_payment_value == Some(dec!(170))));
        assert_eq!(rows[2].review_score, Some(4));
    }

    #[test]
    fn filters_apply_to_the_order() {
        let data = dataset();
        let year = SalesFilter::new(Some(2023), None, None).unwrap();
        assert_eq!(data.sales(&year).len(), 3);

        let month = SalesFilter::new(Some(2023), Some(2), None).unwrap();
        let rows = data.sales(&month);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_state.as_deref(), Some("TX"));

        let canceled = SalesFilter::new(None, None, Some(OrderStatus::Canceled)).unwrap();
        assert_eq!(data.sales(&canceled).len(), 1);

        let empty = SalesFilter::new(Some(2030), None, None).unwrap();
        assert!(data.sales(&empty).is_empty());
    }

    #[test]
    fn lists_periods_present_in_orders() {
        let data = dataset();
        assert_eq!(data.available_years(), vec![2022, 2023]);
        assert_eq!(data.available_months(Some(2023)), vec![1, 2]);
        assert_eq!(data.available_months(None), vec![1, 2, 3]);
        assert!(data.available_months(Some(2019)).is_empty());
        assert_eq!(data.orphan_item_count(), 1);
    }
}
