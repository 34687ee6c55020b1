use crate::trakt::normalize::{normalize_records, NormalizeOptions};
use serde_json::{json, Value};
use trakt_feed_models::NormalizedItem;

/// Raw Trakt-shaped rows backing the demo list: one movie, one show
pub fn demo_records() -> Vec<Value> {
    vec![
        json!({
            "movie": {
                "title": "Interstellar",
                "year": 2014,
                "ids": {"trakt": 102156, "slug": "interstellar-2014", "imdb": "tt0816692", "tmdb": 157336}
            }
        }),
        json!({
            "show": {
                "title": "Breaking Bad",
                "year": 2008,
                "aired_episodes": 62,
                "ids": {"trakt": 1388, "slug": "breaking-bad", "imdb": "tt0903747", "tmdb": 1396}
            }
        }),
    ]
}

/// Fixed list served when configuration is missing or Trakt returns nothing
pub fn demo_items(options: &NormalizeOptions) -> Vec<NormalizedItem> {
    normalize_records(&Value::Array(demo_records()), options)
}
