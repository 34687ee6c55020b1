use crate::media::{IdScheme, MediaKind};
use serde::{Deserialize, Serialize};

/// A media entry reduced to the identifier a downstream browser needs.
///
/// Serializes to the host-facing shape `{"id", "type", "mediaType", "title"}`,
/// omitting the optional fields when they were not requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedItem {
    #[serde(rename = "id")]
    pub external_id: String,
    #[serde(rename = "type")]
    pub id_scheme: IdScheme,
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl NormalizedItem {
    pub fn new(external_id: impl Into<String>, id_scheme: IdScheme) -> Self {
        Self {
            external_id: external_id.into(),
            id_scheme,
            media_kind: None,
            title: None,
        }
    }

    pub fn with_media_kind(mut self, kind: MediaKind) -> Self {
        self.media_kind = Some(kind);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
