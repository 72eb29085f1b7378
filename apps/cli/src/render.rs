//! Plain-text rendering of core state for the terminal.

use std::fmt::Write;

use ownsphere_core::market_data::{MarketFeed, Trend};
use ownsphere_core::session::Session;
use ownsphere_core::settings::DisplayPreferences;

pub fn feed(feed: &MarketFeed) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Market ({}, {})",
        feed.source,
        feed.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(banner) = &feed.banner {
        let _ = writeln!(out, "! {} ({}); showing cached prices", banner.message, banner.provider);
    }
    for quote in &feed.quotes {
        let arrow = match quote.trend {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Neutral => "•",
        };
        let _ = writeln!(
            out,
            "  {:<20} {:>14} {} {}",
            quote.asset_name,
            quote.price_display,
            arrow,
            quote.change_display()
        );
    }
    out
}

pub fn session(session: &Session) -> String {
    let mut out = format!(
        "{} <{}> ({})\n  tokens: {}\n  member since: {}",
        session.name,
        session.email,
        session.id,
        session.token_balance,
        session.created_at.format("%Y-%m-%d")
    );
    if let Some(last_login) = session.last_login {
        let _ = write!(out, "\n  last login: {}", last_login.format("%Y-%m-%d %H:%M"));
    }
    out
}

pub fn preferences(prefs: &DisplayPreferences) -> String {
    format!(
        "dark mode: {}\nnotifications: {}\nlanguage: {}",
        on_off(prefs.dark_mode),
        on_off(prefs.notifications_enabled),
        prefs.language
    )
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ownsphere_core::market_data::{fallback_quotes, MarketSource, DEFAULT_BASKET};

    #[test]
    fn test_feed_lists_every_quote() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let feed = MarketFeed {
            quotes: fallback_quotes(DEFAULT_BASKET, now),
            source: MarketSource::Simulated,
            fetched_at: now,
            banner: None,
        };

        let text = super::feed(&feed);

        assert!(text.starts_with("Market (simulated, 2024-05-01 12:00:00 UTC)"));
        assert!(text.contains("Bitcoin"));
        assert!(text.contains("$42,150.00"));
        assert!(text.contains("▼ -1.8%"));
        assert!(!text.contains('!'));
    }

    #[test]
    fn test_session_without_last_login() {
        let session = Session {
            id: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            token_balance: 7,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            last_login: None,
        };

        let text = super::session(&session);

        assert!(text.contains("tokens: 7"));
        assert!(!text.contains("last login"));
    }

    #[test]
    fn test_preferences() {
        let text = preferences(&DisplayPreferences::default());
        assert_eq!(text, "dark mode: off\nnotifications: off\nlanguage: id");
    }
}
