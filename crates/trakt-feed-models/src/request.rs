use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content categories a caller can ask the router for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    #[default]
    Trending,
    Watchlist,
    Progress,
    Recommendations,
    HistoryMovies,
    HistoryShows,
    CustomList,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 7] = [
        ContentCategory::Trending,
        ContentCategory::Watchlist,
        ContentCategory::Progress,
        ContentCategory::Recommendations,
        ContentCategory::HistoryMovies,
        ContentCategory::HistoryShows,
        ContentCategory::CustomList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Trending => "trending",
            ContentCategory::Watchlist => "watchlist",
            ContentCategory::Progress => "progress",
            ContentCategory::Recommendations => "recommendations",
            ContentCategory::HistoryMovies => "history_movies",
            ContentCategory::HistoryShows => "history_shows",
            ContentCategory::CustomList => "custom_list",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ContentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown content category: {}", s))
    }
}

/// One page of one category, as asked for by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentRequest {
    pub category: ContentCategory,
    pub page: u32,
    pub user_name: Option<String>,
    pub list_name: Option<String>,
}

impl ContentRequest {
    pub fn new(category: ContentCategory) -> Self {
        Self {
            category,
            page: 1,
            user_name: None,
            list_name: None,
        }
    }

    /// Pages are 1-based; zero is treated as the first page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_user(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = non_blank(user_name.into());
        self
    }

    pub fn with_list(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = non_blank(list_name.into());
        self
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn list_name(&self) -> Option<&str> {
        self.list_name.as_deref().filter(|s| !s.trim().is_empty())
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
