use serde::{Deserialize, Serialize};

/// Everything we know about one title after a successful extraction.
/// Field order here is the JSON field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Canonical detail-page URL.
    pub link: String,
    pub title: String,
    pub jav_series: Option<String>,
    /// Commercial identifier, e.g. "SONE-763".
    pub dvd_id: String,
    /// CDN-facing identifier, e.g. "sone00763".
    pub content_id: String,
    pub release_date: String,
    /// Free-form, e.g. "160 min.".
    pub runtime: Option<String>,
    pub studio: String,
    pub director: Option<String>,
    pub genres: Vec<String>,
    pub actresses: Vec<String>,
    /// Absolute URLs, in on-page display order.
    pub preview_images: Vec<String>,
}

/// One card from the search-results listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub dvd_code: Option<String>,
    pub title: Option<String>,
    pub link: String,
    pub release_date: Option<String>,
    pub studio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MovieRecord {
        MovieRecord {
            link: "https://www.javdatabase.com/movies/sone00763/".to_string(),
            title: "Sample Title".to_string(),
            jav_series: None,
            dvd_id: "SONE-763".to_string(),
            content_id: "sone00763".to_string(),
            release_date: "2025-06-10".to_string(),
            runtime: Some("160 min.".to_string()),
            studio: "S1 NO.1 STYLE".to_string(),
            director: None,
            genres: vec!["Drama".to_string(), "Drama".to_string()],
            actresses: vec!["Some Name".to_string()],
            preview_images: vec![
                "https://pics.dmm.co.jp/digital/video/sone00763/sone00763jp-1.jpg".to_string(),
            ],
        }
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let record = sample();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: MovieRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn absent_optionals_serialize_as_null() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["jav_series"].is_null());
        assert!(json["director"].is_null());
        assert_eq!(json["runtime"], "160 min.");
        // duplicates survive serialization untouched
        assert_eq!(json["genres"].as_array().unwrap().len(), 2);
    }
}
