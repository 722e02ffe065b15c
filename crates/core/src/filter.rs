//! Retention filters applied while the catalog is ingested.
//!
//! Entries are dropped for one of three reasons: no broadcast date
//! (live/placeholder streams), older than the retention window, or shorter
//! than the configured minimum. The guards are independent and combined
//! with short-circuiting AND in exactly that order.

use chrono::NaiveDate;

use crate::film::FilmEntry;

/// A predicate deciding whether a parsed entry enters the store.
pub trait FilmFilter: Send + Sync {
    fn is_permitted(&self, film: &FilmEntry) -> bool;
}

/// Rejects entries without a broadcast date.
pub struct HasDate;

impl FilmFilter for HasDate {
    fn is_permitted(&self, film: &FilmEntry) -> bool {
        film.date.is_some()
    }
}

/// Rejects entries older than `max_age_days` relative to `today`.
///
/// Entries with a negative age (published ahead of broadcast) are
/// permitted; there is no lower bound.
pub struct MaxAge {
    pub today: NaiveDate,
    pub max_age_days: i64,
}

impl FilmFilter for MaxAge {
    fn is_permitted(&self, film: &FilmEntry) -> bool {
        match film.date {
            // Missing information cannot reject an entry here; HasDate
            // handles the no-date case.
            None => true,
            Some(date) => (self.today - date).num_days() <= self.max_age_days,
        }
    }
}

/// Rejects entries shorter than `minutes`.
///
/// An entry with unknown duration passes - it must never be dropped as
/// "too short" on missing data.
pub struct MinDuration {
    pub minutes: u32,
}

impl FilmFilter for MinDuration {
    fn is_permitted(&self, film: &FilmEntry) -> bool {
        match film.duration_minutes() {
            None => true,
            Some(minutes) => minutes >= self.minutes,
        }
    }
}

/// AND-combination of filters, short-circuiting in order.
pub struct CompositeFilter {
    filters: Vec<Box<dyn FilmFilter>>,
}

impl CompositeFilter {
    pub fn new(filters: Vec<Box<dyn FilmFilter>>) -> Self {
        Self { filters }
    }

    /// The standard ingest chain: has-date, then age, then duration.
    pub fn retention(today: NaiveDate, max_age_days: i64, min_duration_minutes: u32) -> Self {
        Self::new(vec![
            Box::new(HasDate),
            Box::new(MaxAge {
                today,
                max_age_days,
            }),
            Box::new(MinDuration {
                minutes: min_duration_minutes,
            }),
        ])
    }
}

impl FilmFilter for CompositeFilter {
    fn is_permitted(&self, film: &FilmEntry) -> bool {
        self.filters.iter().all(|f| f.is_permitted(film))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{film_entry, film_entry_on};
    use chrono::NaiveTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_entry_without_date_is_rejected() {
        let filter = CompositeFilter::retention(today(), 30, 0);
        let mut entry = film_entry("ARD", "News", "Live");
        entry.date = None;
        assert!(!filter.is_permitted(&entry));
    }

    #[test]
    fn test_retention_boundary_is_inclusive() {
        let filter = CompositeFilter::retention(today(), 30, 0);

        // 30 days old: kept
        let kept = film_entry_on(
            "ARD",
            "News",
            "A",
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        assert!(filter.is_permitted(&kept));

        // 31 days old: dropped
        let dropped = film_entry_on(
            "ARD",
            "News",
            "B",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(!filter.is_permitted(&dropped));
    }

    #[test]
    fn test_future_broadcast_is_permitted() {
        let filter = CompositeFilter::retention(today(), 30, 0);
        let entry = film_entry_on(
            "ARD",
            "News",
            "Preview",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert!(filter.is_permitted(&entry));
    }

    #[test]
    fn test_short_entry_is_rejected() {
        let filter = CompositeFilter::retention(today(), 30, 10);
        let mut entry = film_entry("ARD", "News", "Clip");
        entry.duration = NaiveTime::from_hms_opt(0, 5, 0);
        assert!(!filter.is_permitted(&entry));
    }

    #[test]
    fn test_unknown_duration_passes_duration_guard() {
        let filter = CompositeFilter::retention(today(), 30, 10);
        let mut entry = film_entry("ARD", "News", "Unknown");
        entry.duration = None;
        assert!(filter.is_permitted(&entry));
    }
}
