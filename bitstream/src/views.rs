// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Filtering, counting and formatting used by the dashboard pages.

use crate::types::{Oracle, Stream, STATUS_ACTIVE, STATUS_ERROR, STATUS_MAINTENANCE, STATUS_PAUSED};
use std::{fmt, str::FromStr};

const MINUTE_MILLIS: i64 = 60_000;
const HOUR_MINUTES: i64 = 60;
const DAY_MINUTES: i64 = 24 * 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Maintenance,
    Error,
}

impl StatusFilter {
    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == STATUS_ACTIVE,
            StatusFilter::Maintenance => status == STATUS_MAINTENANCE,
            StatusFilter::Error => status == STATUS_ERROR,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Maintenance => "Maintenance",
            StatusFilter::Error => "Error",
        };
        write!(f, "{name}")
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "maintenance" => Ok(StatusFilter::Maintenance),
            "error" => Ok(StatusFilter::Error),
            other => Err(format!(
                "Unknown status filter {other:?}, expected all, active, maintenance or error"
            )),
        }
    }
}

/// Status and category selection on the oracle list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OracleFilter {
    pub status: StatusFilter,
    /// Exact category match. `None` or empty matches everything.
    pub category: Option<String>,
}

impl OracleFilter {
    pub fn matches(&self, oracle: &Oracle) -> bool {
        let category_match = match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => oracle.category == category,
        };
        self.status.matches(&oracle.status) && category_match
    }

    pub fn apply<'a>(&self, oracles: &'a [Oracle]) -> Vec<&'a Oracle> {
        oracles
            .iter()
            .filter(|oracle| self.matches(oracle))
            .collect()
    }
}

/// Headline numbers for the oracle page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleSummary {
    pub active: usize,
    pub total_feeds: u64,
    /// Mean uptime to one decimal with a trailing `%`, or `0%` without oracles.
    pub average_uptime: String,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
}

impl OracleSummary {
    pub fn from_oracles(oracles: &[Oracle]) -> Self {
        let active = oracles
            .iter()
            .filter(|oracle| oracle.status == STATUS_ACTIVE)
            .count();
        let total_feeds = oracles.iter().map(|oracle| oracle.feeds).sum();

        let average_uptime = if oracles.is_empty() {
            "0%".to_string()
        } else {
            let total: f64 = oracles
                .iter()
                .map(|oracle| parse_uptime(&oracle.uptime))
                .sum();
            format!("{:.1}%", total / oracles.len() as f64)
        };

        let mut categories: Vec<String> = Vec::new();
        for oracle in oracles {
            if !categories.contains(&oracle.category) {
                categories.push(oracle.category.clone());
            }
        }

        Self {
            active,
            total_feeds,
            average_uptime,
            categories,
        }
    }
}

/// `"99.8%"` -> `99.8`. Unparsable values count as zero.
fn parse_uptime(uptime: &str) -> f64 {
    uptime.trim().trim_end_matches('%').parse().unwrap_or(0.0)
}

/// Human-readable age of a nanosecond timestamp relative to `now_nanos`.
pub fn format_time_ago(timestamp_nanos: i64, now_nanos: u64) -> String {
    let now_millis = i64::try_from(now_nanos / 1_000_000).unwrap_or(i64::MAX);
    let diff_millis = now_millis.saturating_sub(timestamp_nanos / 1_000_000);
    let minutes = diff_millis.div_euclid(MINUTE_MILLIS);

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < HOUR_MINUTES {
        format!("{minutes} min ago")
    } else if minutes < DAY_MINUTES {
        plural_ago(minutes / HOUR_MINUTES, "hour")
    } else {
        plural_ago(minutes / DAY_MINUTES, "day")
    }
}

fn plural_ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

pub fn active_stream_count(streams: &[Stream]) -> usize {
    streams.iter().filter(|stream| stream.is_active()).count()
}

/// Active streams get paused; every other status gets activated.
pub fn toggled_status(current: &str) -> &'static str {
    if current == STATUS_ACTIVE {
        STATUS_PAUSED
    } else {
        STATUS_ACTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    const MINUTE_NANOS: u64 = 60_000_000_000;

    #[test]
    fn status_filter_matches_exact_statuses() {
        let oracles = mock::oracles();

        let maintenance = OracleFilter {
            status: StatusFilter::Maintenance,
            category: None,
        };
        let names: Vec<_> = maintenance
            .apply(&oracles)
            .into_iter()
            .map(|oracle| oracle.name.as_str())
            .collect();
        assert_eq!(names, vec!["Sports Data"]);

        assert_eq!(OracleFilter::default().apply(&oracles).len(), 6);
        let errors = OracleFilter {
            status: StatusFilter::Error,
            category: None,
        };
        assert!(errors.apply(&oracles).is_empty());
    }

    #[test]
    fn category_filter_combines_with_status() {
        let oracles = mock::oracles();
        let filter = OracleFilter {
            status: StatusFilter::Active,
            category: Some("Weather".to_string()),
        };
        assert_eq!(filter.apply(&oracles).len(), 1);

        let empty_category = OracleFilter {
            status: StatusFilter::Active,
            category: Some(String::new()),
        };
        assert_eq!(empty_category.apply(&oracles).len(), 5);
    }

    #[test]
    fn summary_of_the_offline_oracles() {
        let summary = OracleSummary::from_oracles(&mock::oracles());

        assert_eq!(summary.active, 5);
        assert_eq!(summary.total_feeds, 24);
        // (99.8 + 99.9 + 99.2 + 98.5 + 95.1 + 97.8) / 6 = 98.383..
        assert_eq!(summary.average_uptime, "98.4%");
        assert_eq!(
            summary.categories,
            vec![
                "Market Data",
                "Development",
                "Weather",
                "Travel",
                "Sports",
                "News"
            ]
        );
    }

    #[test]
    fn summary_without_oracles() {
        let summary = OracleSummary::from_oracles(&[]);
        assert_eq!(summary.average_uptime, "0%");
        assert_eq!(summary.active, 0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn time_ago_buckets() {
        let now = 1_000 * 24 * 60 * MINUTE_NANOS;
        let ago = |minutes: u64| format_time_ago((now - minutes * MINUTE_NANOS) as i64, now);

        assert_eq!(ago(0), "Just now");
        assert_eq!(ago(1), "1 min ago");
        assert_eq!(ago(59), "59 min ago");
        assert_eq!(ago(60), "1 hour ago");
        assert_eq!(ago(150), "2 hours ago");
        assert_eq!(ago(24 * 60), "1 day ago");
        assert_eq!(ago(3 * 24 * 60), "3 days ago");
        // Timestamps from the future read as fresh.
        assert_eq!(format_time_ago((now + MINUTE_NANOS) as i64, now), "Just now");
    }

    #[test]
    fn toggle_pauses_only_active_streams() {
        assert_eq!(toggled_status("active"), "paused");
        assert_eq!(toggled_status("paused"), "active");
        assert_eq!(toggled_status("pending"), "active");
        assert_eq!(active_stream_count(&mock::streams()), 1);
    }

    #[test]
    fn status_filter_parses_case_insensitively() {
        assert_eq!("Maintenance".parse::<StatusFilter>(), Ok(StatusFilter::Maintenance));
        assert!("broken".parse::<StatusFilter>().is_err());
    }
}
