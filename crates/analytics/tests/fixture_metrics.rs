use analytics::{MetricsEngine, TrendGranularity, UNCATEGORIZED};
use core_types::{OrderStatus, SalesFilter};
use loader::{DataLoader, Dataset};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;

fn dataset() -> Dataset {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample");
    DataLoader::new(dir).load().unwrap()
}

fn filter(year: Option<i32>, month: Option<u32>, status: Option<OrderStatus>) -> SalesFilter {
    SalesFilter::new(year, month, status).unwrap()
}

#[test]
fn may_2017_headline_numbers() {
    let rows = dataset().sales(&filter(Some(2017), Some(5), None));
    let summary = MetricsEngine::new().summarize(&rows);

    assert_eq!(summary.total_revenue, dec!(4842.16));
    assert_eq!(summary.total_orders, 12);
    assert_eq!(summary.total_items_sold, 20);
    assert_eq!(summary.average_order_value.unwrap().round_dp(2), dec!(403.51));
}

#[test]
fn may_2017_category_and_state_ranking() {
    let engine = MetricsEngine::new();
    let rows = dataset().sales(&filter(Some(2017), Some(5), None));

    let categories = engine.category_performance(&rows);
    let ranking: Vec<(&str, Decimal)> = categories
        .iter()
        .map(|c| (c.category.as_str(), c.revenue))
        .collect();
    assert_eq!(
        ranking,
        [
            ("sports_leisure", dec!(936.05)),
            ("bed_bath_table", dec!(867.69)),
            ("health_beauty", dec!(685.58)),
            ("furniture_decor", dec!(676.36)),
            ("telephony", dec!(569.43)),
            ("housewares", dec!(349.01)),
            ("watches_gifts", dec!(316.75)),
            ("computers_accessories", dec!(281.52)),
            ("garden_tools", dec!(159.77)),
        ]
    );
    assert!(categories.iter().all(|c| c.category != UNCATEGORIZED));
    let sum: Decimal = categories.iter().map(|c| c.revenue).sum();
    assert_eq!(sum, dec!(4842.16));

    let states = engine.geographic_performance(&rows);
    assert_eq!(states[0].state, "RJ");
    assert_eq!(states[0].revenue, dec!(1478.55));
    assert_eq!(states.len(), 6);
}

#[test]
fn delivered_2017_against_2016() {
    let engine = MetricsEngine::new();
    let dataset = dataset();
    let current = filter(Some(2017), None, Some(OrderStatus::Delivered));
    let previous = current.previous_year().unwrap();

    let comparison =
        engine.compare_slices(&dataset.sales(&current), &dataset.sales(&previous));
    assert_eq!(comparison.current.total_revenue, dec!(10932.28));
    assert_eq!(comparison.previous.total_revenue, dec!(2970.28));
    assert_eq!(comparison.change.revenue_change_pct.unwrap().round_dp(2), dec!(268.06));
    assert_eq!(comparison.change.orders_change_pct, Some(dec!(420)));
}

#[test]
fn year_with_no_prior_data_has_no_defined_change() {
    let engine = MetricsEngine::new();
    let dataset = dataset();
    let current = filter(Some(2016), None, Some(OrderStatus::Delivered));
    let previous = dataset.sales(&current.previous_year().unwrap());
    assert!(previous.is_empty());

    let change = engine.compare_slices(&dataset.sales(&current), &previous).change;
    assert_eq!(change.revenue_change_pct, None);
    assert_eq!(change.orders_change_pct, None);
    assert_eq!(change.average_order_value_change_pct, None);
}

#[test]
fn trend_granularity_per_slice() {
    let engine = MetricsEngine::new();
    let dataset = dataset();

    let month = dataset.sales(&filter(Some(2017), Some(5), None));
    assert_eq!(engine.trend_granularity(&month), TrendGranularity::Day);

    let year = dataset.sales(&filter(Some(2017), None, None));
    assert_eq!(engine.trend_granularity(&year), TrendGranularity::Month);
    assert_eq!(engine.revenue_trend(&year, TrendGranularity::Month).len(), 12);

    let all = dataset.sales(&SalesFilter::all());
    assert_eq!(engine.trend_granularity(&all), TrendGranularity::YearMonth);
    let points = engine.revenue_trend(&all, TrendGranularity::YearMonth);
    assert_eq!(points.first().map(|p| p.label.as_str()), Some("2016-10"));
    let total: Decimal = points.iter().map(|p| p.revenue).sum();
    assert_eq!(total, dec!(23422.44));
}

#[test]
fn report_for_a_filtered_period() {
    let engine = MetricsEngine::new();
    let dataset = dataset();
    let period = filter(Some(2018), None, Some(OrderStatus::Delivered));
    let previous = dataset.sales(&period.previous_year().unwrap());

    let report = engine.report(&period, &dataset.sales(&period), Some(&previous), 3);
    assert_eq!(report.analysis_period, "2018 (delivered)");
    assert_eq!(report.comparison_period.as_deref(), Some("2017 (delivered)"));
    assert_eq!(report.top_categories.len(), 3);
    assert_eq!(report.top_categories[0].category, "furniture_decor");
    assert_eq!(
        report.comparison.unwrap().revenue_change_pct.unwrap().round_dp(2),
        dec!(-52.50)
    );
    assert_eq!(report.satisfaction.total_reviews, 17);
    assert_eq!(report.delivery.by_speed.iter().map(|s| s.rows).sum::<usize>(), 19);
}
