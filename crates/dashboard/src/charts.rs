use analytics::{CategoryPerformance, SatisfactionSummary, StatePerformance, TrendPoint};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::format::{format_count, format_currency_compact};
use crate::html::escape;

const WIDTH: f64 = 560.0;
const HEIGHT: f64 = 320.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 40.0;
const MARGIN_LEFT: f64 = 64.0;
/// Horizontal bar charts need room for category names.
const LABEL_GUTTER: f64 = 160.0;

const CURRENT_COLOR: &str = "#1f77b4";
const PREVIOUS_COLOR: &str = "#ff7f0e";
const BAR_COLOR: &str = "#1f77b4";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    /// One value per chart label; `None` where the series has no bucket.
    pub values: Vec<Option<Decimal>>,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: Decimal,
    /// The value as printed next to the bar.
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub orientation: Orientation,
    pub bars: Vec<Bar>,
}

/// Revenue over time for the current period, with the comparison period dashed.
///
/// Points of both periods are aligned on their bucket key, so the previous year's
/// March sits under this year's March even when one of them has gaps.
pub fn revenue_trend_chart(
    current_name: &str,
    current: &[TrendPoint],
    previous: Option<(&str, &[TrendPoint])>,
) -> LineChart {
    let mut labels: BTreeMap<u32, &str> = BTreeMap::new();
    for point in current {
        labels.insert(point.key, &point.label);
    }
    if let Some((_, points)) = previous {
        for point in points {
            labels.entry(point.key).or_insert(&point.label);
        }
    }

    let align = |points: &[TrendPoint]| -> Vec<Option<Decimal>> {
        let by_key: BTreeMap<u32, Decimal> = points.iter().map(|p| (p.key, p.revenue)).collect();
        labels.keys().map(|key| by_key.get(key).copied()).collect()
    };

    let mut series = vec![LineSeries {
        name: current_name.to_string(),
        values: align(current),
        dashed: false,
    }];
    if let Some((name, points)) = previous {
        series.push(LineSeries {
            name: name.to_string(),
            values: align(points),
            dashed: true,
        });
    }

    LineChart {
        title: "Revenue Trend".to_string(),
        labels: labels.values().map(|l| l.to_string()).collect(),
        series,
    }
}

/// Category revenue as horizontal bars, highest on top.
pub fn category_chart(categories: &[CategoryPerformance]) -> BarChart {
    BarChart {
        title: "Top Product Categories".to_string(),
        orientation: Orientation::Horizontal,
        bars: categories
            .iter()
            .map(|c| Bar {
                label: c.category.clone(),
                value: c.revenue,
                display: format_currency_compact(c.revenue),
            })
            .collect(),
    }
}

pub fn state_chart(states: &[StatePerformance]) -> BarChart {
    BarChart {
        title: "Revenue by State".to_string(),
        orientation: Orientation::Vertical,
        bars: states
            .iter()
            .map(|s| Bar {
                label: s.state.clone(),
                value: s.revenue,
                display: format_currency_compact(s.revenue),
            })
            .collect(),
    }
}

pub fn satisfaction_chart(satisfaction: &SatisfactionSummary) -> BarChart {
    BarChart {
        title: "Review Score Distribution".to_string(),
        orientation: Orientation::Vertical,
        bars: satisfaction
            .distribution
            .iter()
            .map(|s| Bar {
                label: format!("{} ★", s.score),
                value: Decimal::from(s.count),
                display: format_count(s.count),
            })
            .collect(),
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn open_svg(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{}">"#,
        escape(title)
    )
}

fn empty_svg(title: &str) -> String {
    let mut svg = open_svg(title);
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" class="chart-empty">No data for this selection</text></svg>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0
    ));
    svg
}

impl LineChart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.values.iter().all(Option::is_none))
    }

    pub fn to_svg(&self) -> String {
        let max = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .copied()
            .max()
            .unwrap_or(Decimal::ZERO);
        if self.is_empty() || max <= Decimal::ZERO {
            return empty_svg(&self.title);
        }

        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let count = self.labels.len();
        let x_at = |i: usize| {
            if count <= 1 {
                MARGIN_LEFT + plot_w / 2.0
            } else {
                MARGIN_LEFT + plot_w * i as f64 / (count - 1) as f64
            }
        };
        let y_at = |v: Decimal| MARGIN_TOP + plot_h - plot_h * to_f64(v) / to_f64(max);

        let mut svg = open_svg(&self.title);
        svg.push_str(&axes(plot_h));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" class="axis-label">{}</text>"#,
            MARGIN_LEFT - 6.0,
            MARGIN_TOP + 4.0,
            format_currency_compact(max)
        ));

        // Thin out x labels so they never overlap.
        let step = count.div_ceil(12).max(1);
        for (i, label) in self.labels.iter().enumerate().step_by(step) {
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{}" text-anchor="middle" class="axis-label">{}</text>"#,
                x_at(i),
                HEIGHT - MARGIN_BOTTOM + 16.0,
                escape(label)
            ));
        }

        for (index, series) in self.series.iter().enumerate() {
            let color = if index == 0 { CURRENT_COLOR } else { PREVIOUS_COLOR };
            let dash = if series.dashed { r#" stroke-dasharray="6 4""# } else { "" };

            // A missing bucket breaks the line.
            let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
            for (i, value) in series.values.iter().enumerate() {
                match value {
                    Some(v) => {
                        if let Some(segment) = segments.last_mut() {
                            segment.push((x_at(i), y_at(*v)));
                        }
                    }
                    None => segments.push(Vec::new()),
                }
            }
            for segment in segments.iter().filter(|s| !s.is_empty()) {
                let points: Vec<String> =
                    segment.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
                svg.push_str(&format!(
                    r#"<polyline fill="none" stroke="{color}" stroke-width="2"{dash} points="{}"/>"#,
                    points.join(" ")
                ));
                for (x, y) in segment {
                    svg.push_str(&format!(
                        r#"<circle cx="{x:.1}" cy="{y:.1}" r="3" fill="{color}"/>"#
                    ));
                }
            }

            svg.push_str(&format!(
                r#"<line x1="{x:.1}" y1="{y}" x2="{x2:.1}" y2="{y}" stroke="{color}" stroke-width="2"{dash}/><text x="{tx:.1}" y="{ty}" class="legend">{}</text>"#,
                escape(&series.name),
                x = MARGIN_LEFT + 140.0 * index as f64,
                x2 = MARGIN_LEFT + 140.0 * index as f64 + 24.0,
                y = HEIGHT - 10.0,
                tx = MARGIN_LEFT + 140.0 * index as f64 + 30.0,
                ty = HEIGHT - 6.0,
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}

impl BarChart {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn to_svg(&self) -> String {
        let max = self
            .bars
            .iter()
            .map(|b| b.value)
            .max()
            .unwrap_or(Decimal::ZERO);
        if self.bars.is_empty() || max <= Decimal::ZERO {
            return empty_svg(&self.title);
        }

        let mut svg = open_svg(&self.title);
        match self.orientation {
            Orientation::Horizontal => self.horizontal_bars(&mut svg, max),
            Orientation::Vertical => self.vertical_bars(&mut svg, max),
        }
        svg.push_str("</svg>");
        svg
    }

    fn horizontal_bars(&self, svg: &mut String, max: Decimal) {
        let left = LABEL_GUTTER;
        let plot_w = WIDTH - left - MARGIN_RIGHT - 48.0;
        let plot_h = HEIGHT - MARGIN_TOP - 8.0;
        let slot = plot_h / self.bars.len() as f64;
        let thickness = (slot * 0.7).min(28.0);

        for (i, bar) in self.bars.iter().enumerate() {
            let y = MARGIN_TOP + slot * i as f64 + (slot - thickness) / 2.0;
            let width = plot_w * to_f64(bar.value) / to_f64(max);
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" class="axis-label">{}</text><rect x="{left:.1}" y="{y:.1}" width="{width:.1}" height="{thickness:.1}" fill="{BAR_COLOR}"/><text x="{:.1}" y="{:.1}" class="bar-value">{}</text>"#,
                left - 6.0,
                y + thickness * 0.7,
                escape(&bar.label),
                left + width + 4.0,
                y + thickness * 0.7,
                escape(&bar.display),
            ));
        }
    }

    fn vertical_bars(&self, svg: &mut String, max: Decimal) {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let slot = plot_w / self.bars.len() as f64;
        let thickness = (slot * 0.7).min(56.0);
        let baseline = MARGIN_TOP + plot_h;

        svg.push_str(&axes(plot_h));
        for (i, bar) in self.bars.iter().enumerate() {
            let x = MARGIN_LEFT + slot * i as f64 + (slot - thickness) / 2.0;
            let height = plot_h * to_f64(bar.value) / to_f64(max);
            let center = x + thickness / 2.0;
            svg.push_str(&format!(
                r#"<rect x="{x:.1}" y="{:.1}" width="{thickness:.1}" height="{height:.1}" fill="{BAR_COLOR}"/><text x="{center:.1}" y="{:.1}" text-anchor="middle" class="bar-value">{}</text><text x="{center:.1}" y="{:.1}" text-anchor="middle" class="axis-label">{}</text>"#,
                baseline - height,
                baseline - height - 4.0,
                escape(&bar.display),
                baseline + 16.0,
                escape(&bar.label),
            ));
        }
    }
}

fn axes(plot_h: f64) -> String {
    let baseline = MARGIN_TOP + plot_h;
    format!(
        r##"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{baseline}" stroke="#999"/><line x1="{MARGIN_LEFT}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="#999"/>"##,
        WIDTH - MARGIN_RIGHT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn point(key: u32, label: &str, revenue: Decimal) -> TrendPoint {
        TrendPoint {
            key,
            label: label.into(),
            revenue,
            orders: 1,
        }
    }

    #[test]
    fn trend_series_align_on_keys() {
        let current = [point(1, "Jan", dec!(100)), point(3, "Mar", dec!(300))];
        let previous = [point(2, "Feb", dec!(50)), point(3, "Mar", dec!(90))];
        let chart = revenue_trend_chart("2023", &current, Some(("2022", &previous)));

        assert_eq!(chart.labels, ["Jan", "Feb", "Mar"]);
        assert_eq!(chart.series[0].values, [Some(dec!(100)), None, Some(dec!(300))]);
        assert!(!chart.series[0].dashed);
        assert_eq!(chart.series[1].values, [None, Some(dec!(50)), Some(dec!(90))]);
        assert!(chart.series[1].dashed);

        let svg = chart.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("stroke-dasharray"));
        assert_eq!(svg.matches("<polyline").count(), 3);
    }

    #[test]
    fn empty_charts_render_a_placeholder() {
        let chart = revenue_trend_chart("2023", &[], None);
        assert!(chart.is_empty());
        assert!(chart.to_svg().contains("No data for this selection"));

        let bars = category_chart(&[]);
        assert!(bars.to_svg().contains("No data for this selection"));
    }

    #[test]
    fn bar_labels_are_escaped() {
        let chart = BarChart {
            title: "t".into(),
            orientation: Orientation::Horizontal,
            bars: vec![Bar {
                label: "<toys & games>".into(),
                value: dec!(10),
                display: "$10".into(),
            }],
        };
        let svg = chart.to_svg();
        assert!(svg.contains("&lt;toys &amp; games&gt;"));
        assert!(!svg.contains("<toys"));
    }
}
