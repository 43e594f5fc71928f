//! Click log aggregation
//!
//! Groups a link's click events into per-day counts and device / browser
//! breakdowns. Each grouping keeps keys in the order they were first seen
//! in the input, so the output order follows the click log order rather
//! than being sorted.

use chrono::DateTime;
use std::collections::HashMap;

use crate::analytics::models::{AnalyticsReport, BrowserCount, DateClicks, DeviceCount};
use crate::models::{ClickEvent, Link};

/// Counter that remembers the first-seen order of its keys
#[derive(Debug, Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    fn into_counts(self) -> Vec<(String, u64)> {
        self.counts
    }
}

/// Calendar date (UTC) of a Unix timestamp in milliseconds, as `YYYY-MM-DD`
pub fn utc_date(timestamp: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(ts) => ts.date_naive().format("%Y-%m-%d").to_string(),
        // Outside chrono's representable range
        None => "1970-01-01".to_string(),
    }
}

/// Build the analytics report for `link` from its click events.
pub fn build_report(link: Link, clicks: &[ClickEvent]) -> AnalyticsReport {
    let mut by_date = OrderedCounter::default();
    let mut by_device = OrderedCounter::default();
    let mut by_browser = OrderedCounter::default();

    for click in clicks {
        by_date.add(&utc_date(click.timestamp));
        by_device.add(&click.device);
        by_browser.add(&click.browser);
    }

    let total_clicks = link.click_count;

    AnalyticsReport {
        url: link,
        clicks_over_time: by_date
            .into_counts()
            .into_iter()
            .map(|(date, clicks)| DateClicks { date, clicks })
            .collect(),
        device_breakdown: by_device
            .into_counts()
            .into_iter()
            .map(|(device, count)| DeviceCount { device, count })
            .collect(),
        browser_breakdown: by_browser
            .into_counts()
            .into_iter()
            .map(|(browser, count)| BrowserCount { browser, count })
            .collect(),
        total_clicks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-10T12:00:00Z
    const MARCH_10_NOON: i64 = 1_710_072_000_000;
    const HOUR: i64 = 3_600_000;
    const DAY: i64 = 24 * HOUR;

    fn link(click_count: i64) -> Link {
        Link {
            id: 7,
            owner_id: "owner".into(),
            original_url: "https://example.com".into(),
            short_code: "abc123".into(),
            created_at: MARCH_10_NOON - DAY,
            expires_at: None,
            click_count,
        }
    }

    fn click(id: i64, timestamp: i64, device: &str, browser: &str) -> ClickEvent {
        ClickEvent {
            id,
            link_id: 7,
            timestamp,
            ip_address: Some("127.0.0.1".into()),
            browser: browser.into(),
            os: "Unknown".into(),
            device: device.into(),
            country: "Unknown".into(),
            referrer: "Direct".into(),
        }
    }

    #[test]
    fn utc_date_truncates_to_day() {
        assert_eq!(utc_date(MARCH_10_NOON), "2024-03-10");
        // 23:59:59.999 the same day
        assert_eq!(utc_date(MARCH_10_NOON + 12 * HOUR - 1), "2024-03-10");
        assert_eq!(utc_date(MARCH_10_NOON + 12 * HOUR), "2024-03-11");
        assert_eq!(utc_date(0), "1970-01-01");
    }

    #[test]
    fn three_clicks_one_day_one_click_another() {
        let clicks = vec![
            click(1, MARCH_10_NOON, "Desktop", "Chrome"),
            click(2, MARCH_10_NOON + 60_000, "mobile", "Safari"),
            click(3, MARCH_10_NOON + HOUR, "Desktop", "Chrome"),
            click(4, MARCH_10_NOON + DAY, "Desktop", "Firefox"),
        ];

        let report = build_report(link(4), &clicks);

        assert_eq!(
            report.clicks_over_time,
            vec![
                DateClicks {
                    date: "2024-03-10".into(),
                    clicks: 3
                },
                DateClicks {
                    date: "2024-03-11".into(),
                    clicks: 1
                },
            ]
        );
        let total: u64 = report.clicks_over_time.iter().map(|d| d.clicks).sum();
        assert_eq!(total, 4);

        let device_total: u64 = report.device_breakdown.iter().map(|d| d.count).sum();
        let browser_total: u64 = report.browser_breakdown.iter().map(|b| b.count).sum();
        assert_eq!(device_total, 4);
        assert_eq!(browser_total, 4);

        assert_eq!(
            report.device_breakdown,
            vec![
                DeviceCount {
                    device: "Desktop".into(),
                    count: 3
                },
                DeviceCount {
                    device: "mobile".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(report.browser_breakdown[0].browser, "Chrome");
        assert_eq!(report.browser_breakdown[0].count, 2);
    }

    #[test]
    fn dates_keep_first_seen_order() {
        let clicks = vec![
            click(1, MARCH_10_NOON + DAY, "Desktop", "Chrome"),
            click(2, MARCH_10_NOON, "Desktop", "Chrome"),
            click(3, MARCH_10_NOON + DAY, "Desktop", "Chrome"),
        ];

        let report = build_report(link(3), &clicks);
        let dates: Vec<&str> = report
            .clicks_over_time
            .iter()
            .map(|d| d.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-03-11", "2024-03-10"]);
    }

    #[test]
    fn total_clicks_comes_from_link_counter() {
        let clicks = vec![click(1, MARCH_10_NOON, "Desktop", "Chrome")];
        let report = build_report(link(5), &clicks);
        assert_eq!(report.total_clicks, 5);
    }

    #[test]
    fn empty_log_gives_empty_breakdowns() {
        let report = build_report(link(0), &[]);
        assert!(report.clicks_over_time.is_empty());
        assert!(report.device_breakdown.is_empty());
        assert!(report.browser_breakdown.is_empty());
        assert_eq!(report.total_clicks, 0);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let report = build_report(link(1), &[click(1, MARCH_10_NOON, "Desktop", "Chrome")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalClicks"], 1);
        assert_eq!(json["clicksOverTime"][0]["date"], "2024-03-10");
        assert_eq!(json["deviceBreakdown"][0]["device"], "Desktop");
        assert_eq!(json["browserBreakdown"][0]["browser"], "Chrome");
        assert_eq!(json["url"]["shortCode"], "abc123");
    }
}
