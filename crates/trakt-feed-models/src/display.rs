use serde::{Deserialize, Serialize};

/// Text card returned by tool-style operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayRecord {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DisplayRecord {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: None,
        }
    }

    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            body: url.clone(),
            url: Some(url),
        }
    }
}
