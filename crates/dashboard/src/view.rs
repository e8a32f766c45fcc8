use analytics::{BusinessReport, KpiComparison, MetricsEngine, TrendGranularity};
use configuration::DashboardSettings;
use core_types::{CoreError, OrderStatus, SalesFilter};
use loader::{DataLoader, Dataset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::charts::{self, BarChart, LineChart};
use crate::error::AppError;
use crate::format::{
    Trend, format_count, format_currency, format_currency_compact, month_label, star_rating,
};

/// What the user has picked in the three selectors. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub status: Option<OrderStatus>,
}

/// One user interaction with the filter surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Year(Option<i32>),
    Month(Option<u32>),
    Status(Option<OrderStatus>),
}

impl Selection {
    /// The selection shown on first load: the configured year when the data has
    /// it, otherwise the latest year, and the configured status.
    pub fn defaults(dataset: &Dataset, settings: &DashboardSettings) -> Self {
        let years = dataset.available_years();
        let year = settings
            .default_year
            .filter(|year| years.contains(year))
            .or_else(|| years.last().copied());
        Self {
            year,
            month: None,
            status: settings.default_status,
        }
    }

    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Year(year) => self.year = year,
            FilterChange::Month(month) => self.month = month,
            FilterChange::Status(status) => self.status = status,
        }
    }

    /// Drops a month in which the selected year has no orders.
    pub fn normalize(mut self, dataset: &Dataset) -> Self {
        if let Some(month) = self.month {
            if !dataset.available_months(self.year).contains(&month) {
                self.month = None;
            }
        }
        self
    }

    pub fn filter(&self) -> Result<SalesFilter, CoreError> {
        SalesFilter::new(self.year, self.month, self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    pub value: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    /// Months with orders in the selected year, or in any year when none is selected.
    pub months: Vec<MonthOption>,
    pub statuses: Vec<OrderStatus>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset, year: Option<i32>) -> Self {
        Self {
            years: dataset.available_years(),
            months: dataset
                .available_months(year)
                .into_iter()
                .map(|value| MonthOption {
                    value,
                    label: month_label(value),
                })
                .collect(),
            statuses: OrderStatus::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    /// `None` when there is no comparison period at all.
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCard {
    pub title: &'static str,
    pub value: String,
    pub stars: String,
    pub subtitle: String,
}

/// Everything one render of the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub selection: Selection,
    pub options: FilterOptions,
    pub period: String,
    pub comparison_period: Option<String>,
    pub row_count: usize,
    /// Total Revenue, Total Orders, Average Order Value, Average Review Score.
    pub kpis: Vec<KpiCard>,
    pub revenue_trend: LineChart,
    pub categories: BarChart,
    pub states: BarChart,
    pub satisfaction: BarChart,
    pub delivery: KpiCard,
    pub review: ReviewCard,
    /// Set when the selection matches no rows.
    pub empty_message: Option<String>,
    pub report: BusinessReport,
}

fn not_available() -> String {
    "N/A".to_string()
}

/// Computes the view for `selection` over an already loaded dataset.
pub fn build_view(
    dataset: &Dataset,
    selection: Selection,
    settings: &DashboardSettings,
) -> Result<DashboardView, AppError> {
    let filter = selection.filter()?;

    let engine = MetricsEngine::new();
    let current = dataset.sales(&filter);
    let previous_filter = filter.previous_year();
    let previous = previous_filter.map(|f| dataset.sales(&f));
    tracing::debug!(
        %filter,
        rows = current.len(),
        previous_rows = previous.as_ref().map(Vec::len),
        "Computed sales slices."
    );

    let mut report = engine.report(
        &filter,
        &current,
        previous.as_deref(),
        settings.top_categories,
    );
    report.states.truncate(settings.top_states);

    // Both periods share one granularity so their keys line up.
    let granularity = match (filter.year(), filter.month()) {
        (Some(_), Some(_)) => TrendGranularity::Day,
        (Some(_), None) => TrendGranularity::Month,
        _ => engine.trend_granularity(&current),
    };
    let current_points = engine.revenue_trend(&current, granularity);
    let previous_points = previous
        .as_deref()
        .map(|rows| engine.revenue_trend(rows, granularity));
    let revenue_trend = charts::revenue_trend_chart(
        &report.analysis_period,
        &current_points,
        report
            .comparison_period
            .as_deref()
            .zip(previous_points.as_deref()),
    );

    let change = report.comparison.as_ref();
    let trend = |pct: fn(&KpiComparison) -> Option<Decimal>, lower_is_better: bool| {
        change.map(|c| Trend::from_change(pct(c), lower_is_better))
    };
    let summary = &report.summary;

    let kpis = vec![
        KpiCard {
            title: "Total Revenue",
            value: format_currency_compact(summary.total_revenue),
            trend: trend(|c| c.revenue_change_pct, false),
        },
        KpiCard {
            title: "Total Orders",
            value: format_count(summary.total_orders),
            trend: trend(|c| c.orders_change_pct, false),
        },
        KpiCard {
            title: "Average Order Value",
            value: summary
                .average_order_value
                .map(format_currency)
                .unwrap_or_else(not_available),
            trend: trend(|c| c.average_order_value_change_pct, false),
        },
        KpiCard {
            title: "Average Review Score",
            value: summary
                .average_review_score
                .map(|s| format!("{:.2}", s.round_dp(2)))
                .unwrap_or_else(not_available),
            trend: trend(|c| c.review_score_change_pct, false),
        },
    ];

    let delivery = KpiCard {
        title: "Average Delivery Time",
        value: report
            .delivery
            .average_days
            .map(|d| format!("{:.1} days", d.round_dp(1)))
            .unwrap_or_else(not_available),
        trend: trend(|c| c.delivery_days_change_pct, true),
    };

    let review = ReviewCard {
        title: "Review Score",
        value: report
            .satisfaction
            .average_score
            .map(|s| format!("{:.1}", s.round_dp(1)))
            .unwrap_or_else(not_available),
        stars: star_rating(report.satisfaction.average_score),
        subtitle: format!(
            "Average Review Score ({} reviews)",
            format_count(report.satisfaction.total_reviews)
        ),
    };

    let empty_message = current.is_empty().then(|| {
        format!("No orders match {filter}. Try another year, month or status.")
    });

    Ok(DashboardView {
        title: settings.title.clone(),
        selection,
        options: FilterOptions::from_dataset(dataset, selection.year),
        period: report.analysis_period.clone(),
        comparison_period: report.comparison_period.clone(),
        row_count: current.len(),
        kpis,
        revenue_trend,
        categories: charts::category_chart(&report.top_categories),
        states: charts::state_chart(&report.states),
        satisfaction: charts::satisfaction_chart(&report.satisfaction),
        delivery,
        review,
        empty_message,
        report,
    })
}

/// A single user's dashboard: the current selection plus a redraw callback.
///
/// Every filter change reloads the files, recomputes both slices and hands the
/// fresh view to the callback before returning. Nothing runs in the background.
pub struct DashboardSession<F> {
    loader: DataLoader,
    settings: DashboardSettings,
    selection: Selection,
    redraw: F,
}

impl<F, R> DashboardSession<F>
where
    F: FnMut(&DashboardView) -> R,
{
    /// Opens a session on the default selection for the data in `loader`.
    pub fn open(
        loader: DataLoader,
        settings: DashboardSettings,
        redraw: F,
    ) -> Result<Self, AppError> {
        let dataset = loader.load()?;
        let selection = Selection::defaults(&dataset, &settings);
        Ok(Self {
            loader,
            settings,
            selection,
            redraw,
        })
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Redraws the current selection.
    pub fn refresh(&mut self) -> Result<R, AppError> {
        let dataset = self.loader.load()?;
        let view = build_view(&dataset, self.selection, &self.settings)?;
        Ok((self.redraw)(&view))
    }

    /// Applies one filter change and redraws.
    ///
    /// Changing the year drops a month the new year has no orders in. A
    /// rejected change leaves the selection untouched.
    pub fn apply(&mut self, change: FilterChange) -> Result<R, AppError> {
        let dataset = self.loader.load()?;
        let mut next = self.selection;
        next.apply(change);
        if let FilterChange::Year(_) = change {
            next = next.normalize(&dataset);
        }

        let view = build_view(&dataset, next, &self.settings)?;
        self.selection = next;
        Ok((self.redraw)(&view))
    }
}
