use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::basket::AssetSpec;

/// Changes within this many percentage points of zero are shown as neutral.
pub const NEUTRAL_BAND_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Direction of a quote's 24h change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    /// Derives the trend from the signed change value.
    pub fn from_change(change_percent: Decimal) -> Self {
        if change_percent > NEUTRAL_BAND_PERCENT {
            Trend::Up
        } else if change_percent < -NEUTRAL_BAND_PERCENT {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }

    /// Icon name used by the view layer for this trend.
    pub fn icon(&self) -> &'static str {
        match self {
            Trend::Up => "arrow-up",
            Trend::Down => "arrow-down",
            Trend::Neutral => "arrows-alt-h",
        }
    }
}

/// One asset's displayed price and trend data point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    /// Basket identifier (e.g. "bitcoin")
    pub asset_id: String,

    /// Human readable asset name
    pub asset_name: String,

    /// Last price in USD
    pub price: Decimal,

    /// Price formatted for display, e.g. "$42,150.00"
    pub price_display: String,

    /// Signed 24h change in percent
    pub change_percent: Decimal,

    /// Direction derived from `change_percent`
    pub trend: Trend,

    /// Asset icon name
    pub icon: String,

    /// When this value was observed
    pub observed_at: DateTime<Utc>,
}

impl MarketQuote {
    /// Build a quote for a basket asset, deriving display fields from the numbers.
    pub fn new(
        asset: &AssetSpec,
        price: Decimal,
        change_percent: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            asset_id: asset.id.to_string(),
            asset_name: asset.name.to_string(),
            price,
            price_display: format_usd(price),
            change_percent,
            trend: Trend::from_change(change_percent),
            icon: asset.icon.to_string(),
            observed_at,
        }
    }

    /// Signed change for display, e.g. "+5.2%" or "-1.8%".
    pub fn change_display(&self) -> String {
        format_change(self.change_percent)
    }
}

/// Formats a USD amount with thousands separators and two decimals.
pub fn format_usd(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", sign, grouped, fraction)
}

/// Formats a signed percentage change with one decimal.
///
/// The prefix comes from the sign of the value, never from the rendered text.
pub fn format_change(change_percent: Decimal) -> String {
    let prefix = if change_percent > Decimal::ZERO {
        "+"
    } else if change_percent < Decimal::ZERO {
        "-"
    } else {
        ""
    };
    let magnitude = change_percent
        .abs()
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.1}%", prefix, magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::basket::find_asset;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trend_from_change() {
        assert_eq!(Trend::from_change(dec!(5.2)), Trend::Up);
        assert_eq!(Trend::from_change(dec!(-1.8)), Trend::Down);
        assert_eq!(Trend::from_change(dec!(0.5)), Trend::Neutral);
        assert_eq!(Trend::from_change(dec!(-0.5)), Trend::Neutral);
        assert_eq!(Trend::from_change(dec!(0)), Trend::Neutral);
        assert_eq!(Trend::from_change(dec!(0.51)), Trend::Up);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(42150)), "$42,150.00");
        assert_eq!(format_usd(dec!(2.45)), "$2.45");
        assert_eq!(format_usd(dec!(3250.75)), "$3,250.75");
        assert_eq!(format_usd(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(dec!(999.999)), "$1,000.00");
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd(dec!(-12.5)), "-$12.50");
    }

    #[test]
    fn test_format_change_uses_sign_of_value() {
        assert_eq!(format_change(dec!(5.2)), "+5.2%");
        assert_eq!(format_change(dec!(-1.8)), "-1.8%");
        assert_eq!(format_change(dec!(0)), "0.0%");
        assert_eq!(format_change(dec!(2.349)), "+2.3%");
        // A tiny positive change still shows as positive.
        assert_eq!(format_change(dec!(0.01)), "+0.0%");
    }

    #[test]
    fn test_quote_new_derives_display_fields() {
        let asset = find_asset("bitcoin").unwrap();
        let quote = MarketQuote::new(asset, dec!(42150), dec!(-1.8), Utc::now());
        assert_eq!(quote.asset_name, "Bitcoin");
        assert_eq!(quote.price_display, "$42,150.00");
        assert_eq!(quote.trend, Trend::Down);
        assert_eq!(quote.change_display(), "-1.8%");
        assert_eq!(quote.icon, "fa-bitcoin-sign");
    }
}
