//! Query time window for incremental fetches

use chrono::{DateTime, SecondsFormat, Utc};

/// `_lastUpdated` range applied to every first-page search
///
/// The upper bound is inclusive and always set to the export's transaction
/// time. The lower bound is exclusive and only present for incremental
/// exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    lower_exclusive: Option<DateTime<Utc>>,
    upper_inclusive: DateTime<Utc>,
}

impl TimeWindow {
    /// Derives the window from an optional `since` and the transaction time
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use meridian::core::fetch::TimeWindow;
    ///
    /// let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    /// let window = TimeWindow::new(Some(since), now);
    ///
    /// assert!(!window.contains(since));
    /// assert!(window.contains(now));
    /// ```
    pub fn new(since: Option<DateTime<Utc>>, transaction_time: DateTime<Utc>) -> Self {
        Self {
            lower_exclusive: since,
            upper_inclusive: transaction_time,
        }
    }

    pub fn lower_exclusive(&self) -> Option<DateTime<Utc>> {
        self.lower_exclusive
    }

    pub fn upper_inclusive(&self) -> DateTime<Utc> {
        self.upper_inclusive
    }

    /// Whether a `lastUpdated` instant falls inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let above_lower = self.lower_exclusive.map_or(true, |lower| instant > lower);
        above_lower && instant <= self.upper_inclusive
    }

    /// FHIR search parameters expressing the window
    ///
    /// `_lastUpdated=gt<since>` (when set) followed by `_lastUpdated=le<transaction time>`.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(lower) = self.lower_exclusive {
            params.push(("_lastUpdated", format!("gt{}", format_instant(lower))));
        }
        params.push((
            "_lastUpdated",
            format!("le{}", format_instant(self.upper_inclusive)),
        ));
        params
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
