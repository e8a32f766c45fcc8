use core_types::DeliverySpeed;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The headline KPIs of one slice of the joined table.
///
/// Ratios that are undefined for an empty slice are `Option`s rather than zero,
/// so callers can tell "no orders" apart from "orders worth nothing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    // I. Revenue
    /// Sum of item prices. Freight is reported separately.
    pub total_revenue: Decimal,
    pub total_freight: Decimal,
    /// Sum of payment totals over the distinct orders in the slice.
    pub total_payments: Decimal,

    // II. Volume
    pub total_orders: usize,
    pub total_items_sold: usize,
    pub average_order_value: Option<Decimal>, // Option<> for cases with 0 orders

    // III. Customer Experience
    pub average_review_score: Option<Decimal>, // Option<> when no row has a review
    pub average_delivery_days: Option<Decimal>, // Option<> when nothing was delivered
}

impl KpiSummary {
    /// Creates a new, zeroed-out summary: what an empty slice reports.
    pub fn new() -> Self {
        Self {
            total_revenue: Decimal::ZERO,
            total_freight: Decimal::ZERO,
            total_payments: Decimal::ZERO,
            total_orders: 0,
            total_items_sold: 0,
            average_order_value: None,
            average_review_score: None,
            average_delivery_days: None,
        }
    }
}

impl Default for KpiSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Percentage change of each KPI between two periods.
///
/// A change is `None` when it is undefined: the previous value is zero, or
/// either side has no value at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiComparison {
    pub revenue_change_pct: Option<Decimal>,
    pub orders_change_pct: Option<Decimal>,
    pub items_change_pct: Option<Decimal>,
    pub average_order_value_change_pct: Option<Decimal>,
    pub review_score_change_pct: Option<Decimal>,
    pub delivery_days_change_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current: KpiSummary,
    pub previous: KpiSummary,
    pub change: KpiComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub revenue: Decimal,
    pub orders: usize,
    pub items: usize,
    pub average_price: Decimal,
    /// Share of the slice's total revenue, in percent.
    pub revenue_share_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePerformance {
    pub state: String,
    pub revenue: Decimal,
    pub orders: usize,
    pub average_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub orders: usize,
    /// Change against the preceding month in the list.
    pub revenue_growth_pct: Option<Decimal>,
}

/// Bucket size of a revenue trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGranularity {
    /// Day of month; the slice covers a single month.
    Day,
    /// Month of year; the slice covers a single year.
    Month,
    /// Calendar month across several years.
    YearMonth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Ordinal of the bucket. Day of month, month number, or `year * 100 + month`,
    /// depending on the granularity. Points of two periods line up on equal keys.
    pub key: u32,
    pub label: String,
    pub revenue: Decimal,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionSummary {
    pub average_score: Option<Decimal>,
    pub total_reviews: usize,
    /// One entry per score 1..=5, ascending, zero counts included.
    pub distribution: Vec<ScoreCount>,
    pub five_star_pct: Option<Decimal>,
    pub four_plus_pct: Option<Decimal>,
    pub one_two_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedBreakdown {
    pub speed: DeliverySpeed,
    pub rows: usize,
    pub average_review_score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPerformance {
    pub average_days: Option<Decimal>,
    pub median_days: Option<Decimal>,
    /// Share of delivered rows that arrived within 3 days.
    pub fast_delivery_pct: Option<Decimal>,
    /// Share of delivered rows that took more than 7 days.
    pub slow_delivery_pct: Option<Decimal>,
    pub by_speed: Vec<SpeedBreakdown>,
}

/// Everything the engine knows about one period, optionally against another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessReport {
    pub analysis_period: String,
    pub comparison_period: Option<String>,
    pub summary: KpiSummary,
    pub comparison: Option<KpiComparison>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub top_categories: Vec<CategoryPerformance>,
    pub states: Vec<StatePerformance>,
    pub satisfaction: SatisfactionSummary,
    pub delivery: DeliveryPerformance,
}
