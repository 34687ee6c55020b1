//! Host-facing manifest describing the callable modules and their parameter
//! forms, plus dispatch of a module invocation to the router or token tool.

use crate::error::SchemaError;
use crate::trakt::{ContentRouter, TraktAuth};
use serde::Serialize;
use std::collections::HashMap;
use trakt_feed_models::{ContentCategory, ContentRequest, Credentials, DisplayRecord, NormalizedItem};
use tracing::debug;

pub const LOAD_ITEMS: &str = "load_items";
pub const GENERATE_TOKEN: &str = "generate_token";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub title: String,
    pub version: String,
    pub description: String,
    pub site: String,
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    pub title: String,
    pub function_name: String,
    pub requires_web_view: bool,
    /// Hint for the host; nothing here caches
    pub cache_duration: u64,
    pub params: Vec<ParamSpec>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: ParamKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Enumeration {
        #[serde(rename = "enumOptions")]
        options: Vec<EnumOption>,
    },
    Input,
    Page,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnumOption {
    pub title: String,
    pub value: String,
}

impl ParamSpec {
    fn input(name: &str, title: &str, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind: ParamKind::Input,
            default_value: None,
            description: description.map(str::to_string),
        }
    }
}

fn category_title(category: ContentCategory) -> &'static str {
    match category {
        ContentCategory::Trending => "Trending (no token needed)",
        ContentCategory::Watchlist => "Watchlist",
        ContentCategory::Progress => "In progress (token)",
        ContentCategory::Recommendations => "Recommendations (token)",
        ContentCategory::HistoryMovies => "Watched movies",
        ContentCategory::HistoryShows => "Watched shows",
        ContentCategory::CustomList => "Custom list",
    }
}

impl Manifest {
    /// The Trakt manifest: an item feed and a token helper
    pub fn trakt() -> Self {
        let category_options = ContentCategory::ALL
            .into_iter()
            .map(|category| EnumOption {
                title: category_title(category).to_string(),
                value: category.as_str().to_string(),
            })
            .collect();

        let load_items = ModuleSpec {
            title: "Trakt lists".to_string(),
            function_name: LOAD_ITEMS.to_string(),
            requires_web_view: false,
            cache_duration: 3600,
            params: vec![
                ParamSpec {
                    name: "status".to_string(),
                    title: "Content type".to_string(),
                    kind: ParamKind::Enumeration { options: category_options },
                    default_value: Some(ContentCategory::Trending.as_str().to_string()),
                    description: None,
                },
                ParamSpec::input("client_id", "Client ID", Some("Trakt API application client id")),
                ParamSpec::input("user_name", "User name", Some("Required to read someone's public watchlist, history or lists")),
                ParamSpec::input("list_name", "List name", Some("List slug, for custom lists")),
                ParamSpec::input("oauth_token", "OAuth Token", Some("Required for recommendations, progress and private data")),
                ParamSpec {
                    name: "page".to_string(),
                    title: "Page".to_string(),
                    kind: ParamKind::Page,
                    default_value: Some("1".to_string()),
                    description: None,
                },
            ],
        };

        let generate_token = ModuleSpec {
            title: "Tool: get a token".to_string(),
            function_name: GENERATE_TOKEN.to_string(),
            requires_web_view: false,
            cache_duration: 0,
            params: vec![
                ParamSpec::input("client_id", "Client ID", None),
                ParamSpec::input("client_secret", "Client Secret", Some("Required")),
                ParamSpec::input("auth_code", "Authorization code", Some("Run once without it to get the authorization link")),
            ],
        };

        Self {
            id: "trakt-feed".to_string(),
            title: "Trakt".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Trakt lists as IMDb/TMDB identifiers".to_string(),
            site: "https://trakt.tv".to_string(),
            modules: vec![load_items, generate_token],
        }
    }

    pub fn module(&self, function_name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|m| m.function_name == function_name)
    }
}

/// Parameter values after defaults and validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamValues(HashMap<String, String>);

impl ParamValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn content_request(&self) -> ContentRequest {
        // Both values were checked by `ModuleSpec::resolve`
        let category = self
            .get("status")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let page = self.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

        let mut request = ContentRequest::new(category).with_page(page);
        if let Some(user) = self.get("user_name") {
            request = request.with_user(user);
        }
        if let Some(list) = self.get("list_name") {
            request = request.with_list(list);
        }
        request
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.get("client_id").unwrap_or_default().to_string(),
            client_secret: self.get("client_secret").map(str::to_string),
            bearer_token: self.get("oauth_token").map(str::to_string),
        }
    }
}

impl ModuleSpec {
    /// Apply defaults and check enumerations and pages. Blank values count as
    /// absent and parameters the module does not declare are ignored.
    pub fn resolve(&self, raw: &HashMap<String, String>) -> Result<ParamValues, SchemaError> {
        let mut values = HashMap::new();

        for param in &self.params {
            let supplied = raw
                .get(&param.name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            let value = match supplied.or_else(|| param.default_value.clone()) {
                Some(value) => value,
                None => continue,
            };

            let invalid = || SchemaError::InvalidValue {
                param: param.name.clone(),
                value: value.clone(),
            };
            match &param.kind {
                ParamKind::Enumeration { options } => {
                    if !options.iter().any(|o| o.value == value) {
                        return Err(invalid());
                    }
                }
                ParamKind::Page => match value.parse::<u32>() {
                    Ok(page) if page >= 1 => {}
                    _ => return Err(invalid()),
                },
                ParamKind::Input => {}
            }

            values.insert(param.name.clone(), value);
        }

        Ok(ParamValues(values))
    }
}

/// Result of invoking a module
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InvokeOutput {
    Items(Vec<NormalizedItem>),
    Records(Vec<DisplayRecord>),
}

/// Dispatches manifest functions to the services implementing them
pub struct WidgetHost<'a> {
    manifest: &'a Manifest,
    router: &'a ContentRouter,
    auth: &'a TraktAuth,
}

impl<'a> WidgetHost<'a> {
    pub fn new(manifest: &'a Manifest, router: &'a ContentRouter, auth: &'a TraktAuth) -> Self {
        Self { manifest, router, auth }
    }

    pub async fn invoke(&self, function_name: &str, raw: &HashMap<String, String>) -> Result<InvokeOutput, SchemaError> {
        let module = self
            .manifest
            .module(function_name)
            .ok_or_else(|| SchemaError::UnknownFunction(function_name.to_string()))?;
        let params = module.resolve(raw)?;
        debug!(function = function_name, "Invoking module");

        match function_name {
            LOAD_ITEMS => {
                let items = self
                    .router
                    .fetch_content(&params.content_request(), &params.credentials())
                    .await;
                Ok(InvokeOutput::Items(items))
            }
            GENERATE_TOKEN => {
                let records = self
                    .auth
                    .token_tool(params.get("client_id"), params.get("client_secret"), params.get("auth_code"))
                    .await;
                Ok(InvokeOutput::Records(records))
            }
            other => Err(SchemaError::UnknownFunction(other.to_string())),
        }
    }
}
