//! Cruise tracks and the time window used to filter them.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::geometry::{BoundingBox, Point};
use crate::api::{CruiseId, TrackId};

/// Earliest year the archive holds cruise data for.
pub const DEFAULT_MIN_YEAR: i32 = 1967;

/// Current calendar year (UTC).
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Inclusive year range, applied as the half-open date interval
/// `[min_year-01-01, (max_year + 1)-01-01)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            max_year: current_year(),
        }
    }
}

impl TimeWindow {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    /// First day inside the window.
    pub fn start(&self) -> NaiveDate {
        year_start(self.min_year)
    }

    /// First day after the window.
    pub fn end(&self) -> NaiveDate {
        year_start(self.max_year.saturating_add(1))
    }

    /// An inverted range (`min_year > max_year`) admits nothing.
    pub fn is_empty(&self) -> bool {
        self.end() <= self.start()
    }

    /// Does a cruise running from `begin` to `end` overlap this window?
    ///
    /// A missing bound falls back to the other one; a cruise with no dates
    /// at all never matches a time-filtered query.
    pub fn overlaps(&self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        let (begin, end) = match (begin, end) {
            (Some(b), Some(e)) => (b.min(e), b.max(e)),
            (Some(b), None) => (b, b),
            (None, Some(e)) => (e, e),
            (None, None) => return false,
        };
        !self.is_empty() && begin < self.end() && end >= self.start()
    }
}

fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// The recorded positions of a single cruise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub cruise_id: CruiseId,
    /// Positions in the order they were recorded along the cruise.
    pub points: Vec<Point>,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Track {
    pub fn new(id: TrackId, cruise_id: impl Into<CruiseId>, points: Vec<Point>) -> Self {
        Self {
            id,
            cruise_id: cruise_id.into(),
            points,
            begin_date: None,
            end_date: None,
        }
    }

    pub fn with_dates(mut self, begin: NaiveDate, end: NaiveDate) -> Self {
        self.begin_date = Some(begin);
        self.end_date = Some(end);
        self
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    pub fn within(&self, window: &TimeWindow) -> bool {
        window.overlaps(self.begin_date, self.end_date)
    }
}

/// A coarse match from the store, pending exact refinement.
pub type TrackCandidate = Track;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        let window = TimeWindow::new(1990, 1995);
        assert_eq!(window.start(), date(1990, 1, 1));
        assert_eq!(window.end(), date(1996, 1, 1));
        assert!(!window.is_empty());
    }

    #[test]
    fn test_default_window() {
        let window = TimeWindow::default();
        assert_eq!(window.min_year, 1967);
        assert_eq!(window.max_year, current_year());
    }

    #[test]
    fn test_overlap_last_day_of_max_year() {
        let window = TimeWindow::new(1990, 1995);
        assert!(window.overlaps(Some(date(1995, 12, 31)), Some(date(1996, 2, 1))));
        assert!(!window.overlaps(Some(date(1996, 1, 1)), Some(date(1996, 2, 1))));
    }

    #[test]
    fn test_overlap_cruise_spanning_window_start() {
        let window = TimeWindow::new(1990, 1995);
        assert!(window.overlaps(Some(date(1989, 12, 1)), Some(date(1990, 1, 1))));
        assert!(!window.overlaps(Some(date(1989, 12, 1)), Some(date(1989, 12, 31))));
    }

    #[test]
    fn test_overlap_missing_dates() {
        let window = TimeWindow::new(1990, 1995);
        assert!(window.overlaps(Some(date(1992, 5, 1)), None));
        assert!(window.overlaps(None, Some(date(1992, 5, 1))));
        assert!(!window.overlaps(None, None));
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let window = TimeWindow::new(2000, 1990);
        assert!(window.is_empty());
        assert!(!window.overlaps(Some(date(1995, 1, 1)), Some(date(1995, 2, 1))));
    }
}
