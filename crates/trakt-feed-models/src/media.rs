use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External identifier scheme an item is keyed by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Imdb,
    Tmdb,
}

impl IdScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdScheme::Imdb => "imdb",
            IdScheme::Tmdb => "tmdb",
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imdb" => Ok(IdScheme::Imdb),
            "tmdb" => Ok(IdScheme::Tmdb),
            other => Err(format!("Unknown id scheme: {}. Use 'imdb' or 'tmdb'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
