//! Fixed-width table rendering for terminal listings.

use mediathek_core::{DownloadListRow, FilmEntry};

/// Truncates to `width` characters, padding with spaces.
fn column(value: &str, width: usize) -> String {
    let truncated: String = value.chars().take(width).collect();
    format!("{truncated:<width$}")
}

pub fn search_header() -> String {
    format!(
        "{}|{}|{}|{}|{}",
        column("Station", 7),
        column("Topic", 15),
        column("Date", 10),
        column("Duration", 8),
        column("Title", 52),
    )
}

pub fn search_row(entry: &FilmEntry) -> String {
    let date = entry
        .date
        .map(|d| d.format("%d.%m.%y").to_string())
        .unwrap_or_default();
    let duration = entry.duration.map(|d| d.to_string()).unwrap_or_default();
    format!(
        "{}|{}|{}|{}|{}",
        column(&entry.station, 7),
        column(&entry.topic, 15),
        column(&date, 10),
        column(&duration, 8),
        column(&entry.title, 52),
    )
}

pub fn download_header() -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        column("St", 2),
        column("Changed", 10),
        column("Station", 7),
        column("Topic", 12),
        column("Date", 10),
        column("Title", 45),
    )
}

pub fn download_row(row: &DownloadListRow) -> String {
    let changed = row
        .status_date
        .map(|d| d.format("%d.%m.%y").to_string())
        .unwrap_or_default();
    let date = row
        .date
        .map(|d| d.format("%d.%m.%y").to_string())
        .unwrap_or_default();
    format!(
        "{}|{}|{}|{}|{}|{}",
        column(row.status.code(), 2),
        column(&changed, 10),
        column(&row.station, 7),
        column(&row.topic, 12),
        column(&date, 10),
        column(&row.title, 45),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediathek_core::testing::fixtures;

    #[test]
    fn test_columns_are_fixed_width() {
        let entry = fixtures::film_entry("ARD", "A very long running topic name", "Title");
        let row = search_row(&entry);
        let fields: Vec<&str> = row.split('|').collect();
        assert_eq!(fields[0].len(), 7);
        assert_eq!(fields[1].chars().count(), 15);
        assert_eq!(fields[1], "A very long run");
    }

    #[test]
    fn test_missing_date_renders_empty() {
        let mut entry = fixtures::film_entry("ARD", "News", "Live");
        entry.date = None;
        let row = search_row(&entry);
        assert!(row.split('|').nth(2).unwrap().trim().is_empty());
    }
}
