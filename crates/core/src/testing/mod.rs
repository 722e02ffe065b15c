//! Testing utilities and fixtures.
//!
//! Mock implementations of the transfer seam plus entry/catalog fixtures,
//! exposed publicly so downstream crates (server, cli) can seed stores in
//! their own tests without hand-rolling entries.

mod mock_transfer;

pub use mock_transfer::MockTransfer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{NaiveDate, NaiveTime};

    use crate::film::FilmEntry;

    /// Create a fully populated entry with reasonable defaults.
    pub fn film_entry(station: &str, topic: &str, title: &str) -> FilmEntry {
        FilmEntry {
            station: station.to_string(),
            topic: topic.to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
            time: NaiveTime::from_hms_opt(20, 15, 0),
            duration: NaiveTime::from_hms_opt(0, 45, 0),
            size_mb: 512,
            description: format!("{title} - {topic}"),
            url: format!(
                "https://media.example/{}/{}.mp4",
                station.to_lowercase(),
                title.to_lowercase().replace(' ', "_")
            ),
            website: format!("https://example/{}", station.to_lowercase()),
            url_subtitles: String::new(),
            url_rtmp: String::new(),
            url_small: String::new(),
            url_rtmp_small: String::new(),
            url_hd: String::new(),
            url_rtmp_hd: String::new(),
            date_l: Some(1706645700),
            url_history: String::new(),
            geo: String::new(),
            new: false,
        }
    }

    /// Same as [`film_entry`] but with an explicit broadcast date.
    pub fn film_entry_on(
        station: &str,
        topic: &str,
        title: &str,
        date: NaiveDate,
    ) -> FilmEntry {
        let mut entry = film_entry(station, topic, title);
        entry.date = Some(date);
        entry
    }

    /// A raw 20-field segment with the given identifying fields, everything
    /// else defaulted.
    pub fn raw_segment(station: &str, topic: &str, title: &str, date: &str) -> Vec<String> {
        vec![
            station.to_string(),
            topic.to_string(),
            title.to_string(),
            date.to_string(),
            "20:15:00".to_string(),
            "00:45:00".to_string(),
            "512".to_string(),
            format!("{title} - {topic}"),
            format!(
                "https://media.example/{}.mp4",
                title.to_lowercase().replace(' ', "_")
            ),
            "https://example/page".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "false".to_string(),
        ]
    }

    /// Render raw segments into the catalog wire format: a header segment
    /// followed by `"X"`-keyed entry segments.
    pub fn filmlist_text(segments: &[Vec<String>]) -> String {
        let mut out = String::from(
            r#"{"Filmliste":["01.02.2024, 09:00","3"],"Filmliste":["Sender","Thema","Titel"]"#,
        );
        for segment in segments {
            let fields: Vec<String> = segment
                .iter()
                .map(|f| serde_json::to_string(f).expect("string serializes"))
                .collect();
            out.push_str(",\"X\":[");
            out.push_str(&fields.join(","));
            out.push(']');
        }
        out.push('}');
        out
    }
}
