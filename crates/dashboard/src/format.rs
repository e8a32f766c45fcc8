use analytics::month_abbreviation;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// Currency rounded to whole units with a K/M suffix, e.g. `$2M`, `$300K`, `$500`.
///
/// Midpoints round to even, so `1_500` is `$2K` and `2_500` is `$2K` too.
pub fn format_currency_compact(value: Decimal) -> String {
    let million = Decimal::from(1_000_000);
    if value >= million {
        format!("${}M", (value / million).round_dp(0))
    } else if value >= Decimal::ONE_THOUSAND {
        format!("${}K", (value / Decimal::ONE_THOUSAND).round_dp(0))
    } else {
        format!("${}", value.round_dp(0))
    }
}

/// Currency with cents and thousands separators, e.g. `$1,234.56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("${sign}{}.{cents}", group_thousands(whole))
}

/// A count with thousands separators.
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

pub fn format_percentage(value: Decimal, decimals: u32) -> String {
    format!("{:.*}%", decimals as usize, value.round_dp(decimals))
}

/// `01 - Jan` style label for the month selector.
pub fn month_label(month: u32) -> String {
    format!("{month:02} - {}", month_abbreviation(month))
}

/// Five stars, filled up to the rounded score.
pub fn star_rating(score: Option<Decimal>) -> String {
    let filled = score
        .and_then(|s| s.round().to_usize())
        .unwrap_or(0)
        .min(5);
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// A period-over-period change indicator for a KPI card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    /// `↗ 20.00%`, `↘ 5.00%` or `N/A`.
    pub text: String,
    /// CSS class: `trend-positive`, `trend-negative` or `trend-neutral`.
    pub class: &'static str,
}

impl Trend {
    pub fn undefined() -> Self {
        Self {
            text: "N/A".to_string(),
            class: "trend-neutral",
        }
    }

    /// Builds the indicator from a percentage change. The arrow follows the
    /// direction of the change; the class says whether that direction is good.
    pub fn from_change(change: Option<Decimal>, lower_is_better: bool) -> Self {
        let Some(pct) = change else {
            return Self::undefined();
        };
        let arrow = if pct >= Decimal::ZERO { "↗" } else { "↘" };
        let good = if lower_is_better {
            pct <= Decimal::ZERO
        } else {
            pct >= Decimal::ZERO
        };
        Self {
            text: format!("{arrow} {}", format_percentage(pct.abs(), 2)),
            class: if good { "trend-positive" } else { "trend-negative" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::percent_change;
    use rust_decimal_macros::dec;

    fn trend(current: Decimal, previous: Decimal, lower_is_better: bool) -> Trend {
        Trend::from_change(percent_change(current, previous), lower_is_better)
    }

    #[test]
    fn compact_currency() {
        assert_eq!(format_currency_compact(dec!(1500000)), "$2M");
        assert_eq!(format_currency_compact(dec!(2000000)), "$2M");
        assert_eq!(format_currency_compact(dec!(1500)), "$2K");
        assert_eq!(format_currency_compact(dec!(2500)), "$2K");
        assert_eq!(format_currency_compact(dec!(300000)), "$300K");
        assert_eq!(format_currency_compact(dec!(500)), "$500");
        assert_eq!(format_currency_compact(dec!(0)), "$0");
    }

    #[test]
    fn full_currency() {
        assert_eq!(format_currency(dec!(1234.56)), "$1,234.56");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(999)), "$999.00");
        assert_eq!(format_currency(dec!(-500.75)), "$-500.75");
    }

    #[test]
    fn counts_and_percentages() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(123456), "123,456");
        assert_eq!(format_percentage(dec!(25), 1), "25.0%");
        assert_eq!(format_percentage(dec!(33.3333), 2), "33.33%");
    }

    #[test]
    fn trends() {
        let up = trend(dec!(120), dec!(100), false);
        assert_eq!(up.text, "↗ 20.00%");
        assert_eq!(up.class, "trend-positive");

        let down = trend(dec!(80), dec!(100), false);
        assert_eq!(down.text, "↘ 20.00%");
        assert_eq!(down.class, "trend-negative");

        let undefined = trend(dec!(100), dec!(0), false);
        assert_eq!(undefined.text, "N/A");
        assert_eq!(undefined, Trend::undefined());
        assert_eq!(Trend::from_change(Some(Decimal::ZERO), false).text, "↗ 0.00%");
    }

    #[test]
    fn faster_delivery_is_a_positive_trend() {
        let faster = trend(dec!(8), dec!(10), true);
        assert_eq!(faster.text, "↘ 20.00%");
        assert_eq!(faster.class, "trend-positive");

        let slower = trend(dec!(12), dec!(10), true);
        assert_eq!(slower.class, "trend-negative");
    }

    #[test]
    fn month_labels_and_stars() {
        assert_eq!(month_label(1), "01 - Jan");
        assert_eq!(month_label(12), "12 - Dec");
        assert_eq!(star_rating(Some(dec!(4.4))), "★★★★☆");
        assert_eq!(star_rating(None), "☆☆☆☆☆");
    }
}
