use crate::html;
use crate::view::{DashboardView, FilterOptions, Selection, build_view};
use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use core_types::OrderStatus;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// The selectors as submitted by the page. An absent field takes its default;
/// an empty field or `all` clears the filter.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltersQuery {
    pub year: Option<String>,
}

fn is_all(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("all")
}

fn parse_number<T: FromStr>(raw: &str, field: &str) -> Result<Option<T>, AppError> {
    let raw = raw.trim();
    if is_all(raw) {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| {
        AppError::InvalidQuery(format!("{field} must be a number or \"all\", got \"{raw}\""))
    })
}

fn parse_status(raw: &str) -> Result<Option<OrderStatus>, AppError> {
    let raw = raw.trim();
    if is_all(raw) {
        return Ok(None);
    }
    Ok(Some(raw.parse()?))
}

impl DashboardQuery {
    pub fn selection(&self, defaults: Selection) -> Result<Selection, AppError> {
        Ok(Selection {
            year: match &self.year {
                Some(raw) => parse_number(raw, "year")?,
                None => defaults.year,
            },
            month: match &self.month {
                Some(raw) => parse_number(raw, "month")?,
                None => defaults.month,
            },
            status: match &self.status {
                Some(raw) => parse_status(raw)?,
                None => defaults.status,
            },
        })
    }
}

/// Loads the files and computes the view. Runs on every request.
fn dashboard_view(state: &AppState, query: &DashboardQuery) -> Result<DashboardView, AppError> {
    let dataset = state.loader.load()?;
    let selection = query.selection(Selection::defaults(&dataset, &state.dashboard))?;
    build_view(&dataset, selection, &state.dashboard)
}

/// # GET /
pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    match dashboard_view(&state, &query) {
        Ok(view) => Html(html::render_page(&view)).into_response(),
        Err(err) => {
            err.log();
            let page = html::render_error_page(&state.dashboard.title, &err);
            (err.status(), Html(page)).into_response()
        }
    }
}

/// # GET /api/dashboard
/// The same view as the page, as JSON.
pub async fn dashboard_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, AppError> {
    Ok(Json(dashboard_view(&state, &query)?))
}

/// # GET /api/filters
/// The values the selectors offer. Months are restricted to `year` when given.
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FiltersQuery>,
) -> Result<Json<FilterOptions>, AppError> {
    let year = match &query.year {
        Some(raw) => parse_number(raw, "year")?,
        None => None,
    };
    let dataset = state.loader.load()?;
    Ok(Json(FilterOptions::from_dataset(&dataset, year)))
}

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}
