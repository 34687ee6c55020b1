use super::{build_router, configured, load_config, load_credentials, normalize_options};
use crate::output::Output;
use color_eyre::Result;
use trakt_feed_config::{Config, PathManager};
use trakt_feed_models::{ContentCategory, ContentRequest, Credentials, IdScheme};
use tracing::{debug, info};

pub struct FetchArgs {
    pub category: Option<ContentCategory>,
    pub page: u32,
    pub user: Option<String>,
    pub list: Option<String>,
    pub client_id: Option<String>,
    pub token: Option<String>,
    pub id_scheme: Option<IdScheme>,
    pub titles: bool,
}

pub async fn run_fetch(args: FetchArgs, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;

    let stored_token = if args.token.is_none() {
        load_credentials(&path_manager)?.valid_trakt_access_token().cloned()
    } else {
        None
    };

    let request = build_request(&args, &config);
    let credentials = build_credentials(&args, &config, stored_token);

    if credentials.client_id().is_none() {
        output.warn("No Trakt client id configured; showing demo items");
        output.info("Run 'traktfeed config set --client-id <ID>' to fetch real lists.");
    }

    let mut options = normalize_options(&config);
    if let Some(scheme) = args.id_scheme {
        options.id_scheme = scheme;
    }
    if args.titles {
        options.title = true;
    }

    debug!(
        category = request.category.as_str(),
        page = request.page,
        authenticated = credentials.usable_token().is_some(),
        "Fetching content"
    );

    let router = build_router(&config, options);
    let items = router.fetch_content(&request, &credentials).await;
    info!(count = items.len(), category = request.category.as_str(), "Fetched items");

    output.items(&items);
    Ok(())
}

/// Flags win over config; the config supplies the default category and user
fn build_request(args: &FetchArgs, config: &Config) -> ContentRequest {
    let category = args.category.unwrap_or(config.feed.default_category);
    let mut request = ContentRequest::new(category).with_page(args.page);

    if let Some(user) = args.user.clone().or_else(|| config.trakt.user_name.clone()) {
        request = request.with_user(user);
    }
    if let Some(list) = args.list.clone() {
        request = request.with_list(list);
    }
    request
}

fn build_credentials(args: &FetchArgs, config: &Config, stored_token: Option<String>) -> Credentials {
    let client_id = args
        .client_id
        .clone()
        .or_else(|| configured(&config.trakt.client_id))
        .unwrap_or_default();

    let mut credentials = Credentials::new(client_id);
    if let Some(token) = args.token.clone().or(stored_token) {
        credentials = credentials.with_token(token);
    }
    credentials
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FetchArgs {
        FetchArgs {
            category: None,
            page: 1,
            user: None,
            list: None,
            client_id: None,
            token: None,
            id_scheme: None,
            titles: false,
        }
    }

    #[test]
    fn test_request_defaults_come_from_config() {
        let mut config = Config::default();
        config.feed.default_category = ContentCategory::Watchlist;
        config.trakt.user_name = Some("sean".to_string());

        let request = build_request(&args(), &config);
        assert_eq!(request.category, ContentCategory::Watchlist);
        assert_eq!(request.user_name(), Some("sean"));
        assert_eq!(request.page, 1);
    }

    #[test]
    fn test_request_flags_override_config() {
        let mut config = Config::default();
        config.trakt.user_name = Some("sean".to_string());

        let request = build_request(
            &FetchArgs {
                category: Some(ContentCategory::CustomList),
                page: 0,
                user: Some("giladg".to_string()),
                list: Some("latest-releases".to_string()),
                ..args()
            },
            &config,
        );
        assert_eq!(request.category, ContentCategory::CustomList);
        assert_eq!(request.user_name(), Some("giladg"));
        assert_eq!(request.list_name(), Some("latest-releases"));
        assert_eq!(request.page, 1);
    }

    #[test]
    fn test_credentials_prefer_flag_token_over_stored() {
        let mut config = Config::default();
        config.trakt.client_id = "configured-id".to_string();

        let creds = build_credentials(&args(), &config, Some("stored-token".to_string()));
        assert_eq!(creds.client_id(), Some("configured-id"));
        assert_eq!(creds.usable_token(), Some("stored-token"));

        let creds = build_credentials(
            &FetchArgs {
                client_id: Some("flag-id".to_string()),
                token: Some("flag-token".to_string()),
                ..args()
            },
            &config,
            Some("stored-token".to_string()),
        );
        assert_eq!(creds.client_id(), Some("flag-id"));
        assert_eq!(creds.usable_token(), Some("flag-token"));
    }

    #[test]
    fn test_placeholder_client_id_counts_as_missing() {
        let mut config = Config::default();
        config.trakt.client_id = "YOUR_CLIENT_ID".to_string();

        let creds = build_credentials(&args(), &config, None);
        assert!(creds.client_id().is_none());
        assert!(creds.usable_token().is_none());
    }
}
