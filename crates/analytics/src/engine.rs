use crate::report::{
    BusinessReport, CategoryPerformance, DeliveryPerformance, KpiComparison, KpiSummary,
    MonthlyTrend, PeriodComparison, SatisfactionSummary, ScoreCount, SpeedBreakdown,
    StatePerformance, TrendGranularity, TrendPoint,
};
use chrono::Datelike;
use core_types::{DeliverySpeed, SalesFilter, SalesRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Group name for rows whose product has no category.
pub const UNCATEGORIZED: &str = "uncategorized";
/// Group name for rows whose customer has no state.
pub const UNKNOWN_STATE: &str = "unknown";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short English name of a month number (1 = "Jan").
pub fn month_abbreviation(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_ABBREVIATIONS.get(index as usize))
        .copied()
        .unwrap_or("?")
}

/// Percentage change from `previous` to `current`.
///
/// Returns `None` when `previous` is zero: the change is undefined, and callers
/// render it as "N/A" rather than failing.
pub fn percent_change(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    (current - previous)
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

fn optional_change(current: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    percent_change(current?, previous?)
}

fn ratio(total: Decimal, count: usize) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    total.checked_div(Decimal::from(count))
}

fn share_pct(part: usize, whole: usize) -> Option<Decimal> {
    ratio(Decimal::from(part), whole).and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
}

/// Running totals for one group of rows.
#[derive(Debug, Default)]
struct Bucket<'a> {
    revenue: Decimal,
    orders: HashSet<&'a str>,
    items: usize,
}

impl<'a> Bucket<'a> {
    fn add(&mut self, record: &'a SalesRecord) {
        self.revenue += record.price;
        self.orders.insert(record.order_id.as_str());
        self.items += 1;
    }
}

/// A stateless calculator for the business KPIs of a joined sales table.
///
/// Every operation takes a slice of `SalesRecord`s and never fails: values that
/// are undefined for the given rows (an average of nothing, a change against
/// zero) come back as `None`.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the headline KPIs.
    pub fn summarize(&self, records: &[SalesRecord]) -> KpiSummary {
        let mut summary = KpiSummary::new();

        if records.is_empty() {
            // Zero revenue, zero orders, and every average undefined.
            return summary;
        }

        // Payment totals are per order, so each order contributes once.
        let mut orders: HashMap<&str, Option<Decimal>> = HashMap::new();
        let mut review_total = Decimal::ZERO;
        let mut reviews = 0usize;
        let mut delivery_total = Decimal::ZERO;
        let mut deliveries = 0usize;

        for record in records {
            summary.total_revenue += record.price;
            summary.total_freight += record.freight_value;
            summary.total_items_sold += 1;
            orders
                .entry(record.order_id.as_str())
                .or_insert(record.order_payment_value);

            if let Some(score) = record.review_score {
                review_total += Decimal::from(score);
                reviews += 1;
            }
            if let Some(days) = record.delivery_days {
                delivery_total += Decimal::from(days);
                deliveries += 1;
            }
        }

        summary.total_orders = orders.len();
        summary.total_payments = orders.values().flatten().sum();
        summary.average_order_value = ratio(summary.total_revenue, summary.total_orders);
        summary.average_review_score = ratio(review_total, reviews);
        summary.average_delivery_days = ratio(delivery_total, deliveries);

        summary
    }

    /// Percentage change of every KPI from `previous` to `current`.
    pub fn compare(&self, current: &KpiSummary, previous: &KpiSummary) -> KpiComparison {
        KpiComparison {
            revenue_change_pct: percent_change(current.total_revenue, previous.total_revenue),
            orders_change_pct: percent_change(
                Decimal::from(current.total_orders),
                Decimal::from(previous.total_orders),
            ),
            items_change_pct: percent_change(
                Decimal::from(current.total_items_sold),
                Decimal::from(previous.total_items_sold),
            ),
            average_order_value_change_pct: optional_change(
                current.average_order_value,
                previous.average_order_value,
            ),
            review_score_change_pct: optional_change(
                current.average_review_score,
                previous.average_review_score,
            ),
            delivery_days_change_pct: optional_change(
                current.average_delivery_days,
                previous.average_delivery_days,
            ),
        }
    }

    /// Summarizes two disjoint slices and compares them.
    pub fn compare_slices(
        &self,
        current: &[SalesRecord],
        previous: &[SalesRecord],
    ) -> PeriodComparison {
        let current = self.summarize(current);
        let previous = self.summarize(previous);
        let change = self.compare(&current, &previous);
        PeriodComparison {
            current,
            previous,
            change,
        }
    }

    /// Revenue per product category, highest first, ties broken by name.
    ///
    /// Rows without a category are grouped under [`UNCATEGORIZED`] so the
    /// category revenues always add up to the slice's total revenue.
    pub fn category_performance(&self, records: &[SalesRecord]) -> Vec<CategoryPerformance> {
        let total: Decimal = records.iter().map(|r| r.price).sum();
        let mut buckets: HashMap<&str, Bucket> = HashMap::new();
        for record in records {
            let category = record.category.as_deref().unwrap_or(UNCATEGORIZED);
            buckets.entry(category).or_default().add(record);
        }

        let mut categories: Vec<CategoryPerformance> = buckets
            .into_iter()
            .map(|(category, bucket)| CategoryPerformance {
                category: category.to_string(),
                revenue: bucket.revenue,
                orders: bucket.orders.len(),
                items: bucket.items,
                average_price: bucket.revenue / Decimal::from(bucket.items),
                revenue_share_pct: if total.is_zero() {
                    None
                } else {
                    bucket
                        .revenue
                        .checked_div(total)
                        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                },
            })
            .collect();

        categories.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.category.cmp(&b.category))
        });
        categories
    }

    /// Revenue per customer state, highest first, ties broken by state code.
    pub fn geographic_performance(&self, records: &[SalesRecord]) -> Vec<StatePerformance> {
        let mut buckets: HashMap<&str, Bucket> = HashMap::new();
        for record in records {
            let state = record.customer_state.as_deref().unwrap_or(UNKNOWN_STATE);
            buckets.entry(state).or_default().add(record);
        }

        let mut states: Vec<StatePerformance> = buckets
            .into_iter()
            .map(|(state, bucket)| StatePerformance {
                state: state.to_string(),
                revenue: bucket.revenue,
                orders: bucket.orders.len(),
                average_order_value: bucket.revenue / Decimal::from(bucket.orders.len()),
            })
            .collect();

        states.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.state.cmp(&b.state)));
        states
    }

    /// Review score statistics over the rows that have a review.
    pub fn satisfaction(&self, records: &[SalesRecord]) -> SatisfactionSummary {
        let mut counts = [0usize; 5];
        let mut total = Decimal::ZERO;
        let mut reviews = 0usize;
        for score in records.iter().filter_map(|r| r.review_score) {
            if let Some(slot) = counts.get_mut(usize::from(score).wrapping_sub(1)) {
                *slot += 1;
                total += Decimal::from(score);
                reviews += 1;
            }
        }

        SatisfactionSummary {
            average_score: ratio(total, reviews),
            total_reviews: reviews,
            distribution: (1u8..=5)
                .zip(counts)
                .map(|(score, count)| ScoreCount { score, count })
                .collect(),
            five_star_pct: share_pct(counts[4], reviews),
            four_plus_pct: share_pct(counts[3] + counts[4], reviews),
            one_two_pct: share_pct(counts[0] + counts[1], reviews),
        }
    }

    /// Delivery time statistics, and review scores per delivery speed bucket.
    pub fn delivery_performance(&self, records: &[SalesRecord]) -> DeliveryPerformance {
        let mut days: Vec<i64> = records.iter().filter_map(|r| r.delivery_days).collect();
        days.sort_unstable();

        let median_days = match days.len() {
            0 => None,
            n if n % 2 == 1 => Some(Decimal::from(days[n / 2])),
            n => Some((Decimal::from(days[n / 2 - 1]) + Decimal::from(days[n / 2])) / Decimal::TWO),
        };
        let fast = days.iter().filter(|&&d| d <= 3).count();
        let slow = days.iter().filter(|&&d| d > 7).count();

        let by_speed = DeliverySpeed::ALL
            .into_iter()
            .map(|speed| {
                let rows: Vec<&SalesRecord> =
                    records.iter().filter(|r| r.delivery_speed() == speed).collect();
                let scores: Vec<u8> = rows.iter().filter_map(|r| r.review_score).collect();
                let score_total: Decimal = scores.iter().map(|&s| Decimal::from(s)).sum();
                SpeedBreakdown {
                    speed,
                    rows: rows.len(),
                    average_review_score: ratio(score_total, scores.len()),
                }
            })
            .collect();

        DeliveryPerformance {
            average_days: ratio(days.iter().map(|&d| Decimal::from(d)).sum(), days.len()),
            median_days,
            fast_delivery_pct: share_pct(fast, days.len()),
            slow_delivery_pct: share_pct(slow, days.len()),
            by_speed,
        }
    }

    /// Revenue and orders per calendar month, oldest first, with month-over-month growth.
    pub fn monthly_trends(&self, records: &[SalesRecord]) -> Vec<MonthlyTrend> {
        let mut buckets: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();
        for record in records {
            buckets
                .entry((record.purchase_year, record.purchase_month))
                .or_default()
                .add(record);
        }

        let mut previous_revenue: Option<Decimal> = None;
        buckets
            .into_iter()
            .map(|((year, month), bucket)| {
                let revenue_growth_pct =
                    previous_revenue.and_then(|previous| percent_change(bucket.revenue, previous));
                previous_revenue = Some(bucket.revenue);
                MonthlyTrend {
                    year,
                    month,
                    revenue: bucket.revenue,
                    orders: bucket.orders.len(),
                    revenue_growth_pct,
                }
            })
            .collect()
    }

    /// The finest granularity that keeps trend keys unique for `records`.
    pub fn trend_granularity(&self, records: &[SalesRecord]) -> TrendGranularity {
        let periods: BTreeSet<(i32, u32)> = records
            .iter()
            .map(|r| (r.purchase_year, r.purchase_month))
            .collect();
        let years: BTreeSet<i32> = periods.iter().map(|&(year, _)| year).collect();
        if periods.len() <= 1 {
            TrendGranularity::Day
        } else if years.len() == 1 {
            TrendGranularity::Month
        } else {
            TrendGranularity::YearMonth
        }
    }

    /// Revenue over time, bucketed at `granularity`, in key order.
    pub fn revenue_trend(
        &self,
        records: &[SalesRecord],
        granularity: TrendGranularity,
    ) -> Vec<TrendPoint> {
        let mut buckets: BTreeMap<u32, (String, Bucket)> = BTreeMap::new();
        for record in records {
            let (key, label) = match granularity {
                TrendGranularity::Day => {
                    let day = record.purchased_at.day();
                    (day, format!("{day:02}"))
                }
                TrendGranularity::Month => (
                    record.purchase_month,
                    month_abbreviation(record.purchase_month).to_string(),
                ),
                TrendGranularity::YearMonth => (
                    record.purchase_year.unsigned_abs() * 100 + record.purchase_month,
                    format!("{}-{:02}", record.purchase_year, record.purchase_month),
                ),
            };
            buckets
                .entry(key)
                .or_insert_with(|| (label, Bucket::default()))
                .1
                .add(record);
        }

        buckets
            .into_iter()
            .map(|(key, (label, bucket))| TrendPoint {
                key,
                label,
                revenue: bucket.revenue,
                orders: bucket.orders.len(),
            })
            .collect()
    }

    /// Builds the comprehensive report for `period`.
    ///
    /// `previous` is the comparison slice, normally the same filter one year back.
    pub fn report(
        &self,
        period: &SalesFilter,
        current: &[SalesRecord],
        previous: Option<&[SalesRecord]>,
        top_n: usize,
    ) -> BusinessReport {
        let summary = self.summarize(current);
        let comparison = previous.map(|rows| self.compare(&summary, &self.summarize(rows)));

        let mut top_categories = self.category_performance(current);
        top_categories.truncate(top_n);

        BusinessReport {
            analysis_period: period.to_string(),
            comparison_period: previous
                .and(period.previous_year())
                .map(|p| p.to_string()),
            summary,
            comparison,
            monthly_trends: self.monthly_trends(current),
            top_categories,
            states: self.geographic_performance(current),
            satisfaction: self.satisfaction(current),
            delivery: self.delivery_performance(current),
        }
    }
}
