use crate::error::FetchError;
use crate::trakt::api::{self, path_segment, Route};
use crate::trakt::demo::demo_items;
use crate::trakt::normalize::{normalize_records, NormalizeOptions};
use crate::transport::HttpTransport;
use std::sync::Arc;
use trakt_feed_models::{ContentCategory, ContentRequest, Credentials, NormalizedItem};
use tracing::{debug, info, warn};

/// Where a request ends up once its prerequisites are checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Fetch(Route),
    /// Requirements unmet; serve the demo list without calling Trakt
    Demo,
    /// Requirements unmet; serve nothing
    Empty,
}

/// Map a category and the available credentials onto one Trakt endpoint.
///
/// Personal categories prefer the authenticated `/sync` endpoints and fall
/// back to a user's public profile when only a user name is known.
pub fn resolve_route(request: &ContentRequest, credentials: &Credentials) -> RouteDecision {
    let token = credentials.usable_token();
    let user = request.user_name();
    let page = request.page;

    match request.category {
        ContentCategory::Trending => RouteDecision::Fetch(trending(page)),
        ContentCategory::Watchlist => match (token, user) {
            (Some(_), _) => RouteDecision::Fetch(Route::paged("/sync/watchlist", page).param("sort", "rank,asc")),
            (None, Some(user)) => {
                RouteDecision::Fetch(Route::paged(format!("/users/{}/watchlist", path_segment(user)), page))
            }
            (None, None) => RouteDecision::Demo,
        },
        ContentCategory::Progress => match token {
            Some(_) => RouteDecision::Fetch(Route::paged("/sync/playback/episodes", page)),
            None => RouteDecision::Demo,
        },
        ContentCategory::Recommendations => match token {
            Some(_) => RouteDecision::Fetch(
                Route::paged("/recommendations/movies", page).param("ignore_collected", "true"),
            ),
            None => RouteDecision::Fetch(trending(page)),
        },
        ContentCategory::HistoryMovies | ContentCategory::HistoryShows => {
            let kind = if request.category == ContentCategory::HistoryShows {
                "shows"
            } else {
                "movies"
            };
            match (token, user) {
                (Some(_), _) => RouteDecision::Fetch(Route::paged(format!("/sync/history/{}", kind), page)),
                (None, Some(user)) => RouteDecision::Fetch(Route::paged(
                    format!("/users/{}/history/{}", path_segment(user), kind),
                    page,
                )),
                (None, None) => RouteDecision::Demo,
            }
        }
        ContentCategory::CustomList => match (user, request.list_name()) {
            (Some(user), Some(list)) => RouteDecision::Fetch(Route::paged(
                format!("/users/{}/lists/{}/items", path_segment(user), path_segment(list)),
                page,
            )),
            _ => RouteDecision::Empty,
        },
    }
}

fn trending(page: u32) -> Route {
    Route::paged("/movies/trending", page)
}

/// Serves normalized item lists for content categories.
///
/// The public entry point never fails: upstream errors become an empty
/// result, and an empty result becomes the demo list.
#[derive(Clone)]
pub struct ContentRouter {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    options: NormalizeOptions,
}

impl ContentRouter {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            options: NormalizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    pub async fn fetch_content(&self, request: &ContentRequest, credentials: &Credentials) -> Vec<NormalizedItem> {
        if credentials.client_id().is_none() {
            info!("No Trakt client_id configured, serving demo items");
            return demo_items(&self.options);
        }

        let route = match resolve_route(request, credentials) {
            RouteDecision::Fetch(route) => route,
            RouteDecision::Demo => {
                info!(category = %request.category, "Missing token or user name, serving demo items");
                return demo_items(&self.options);
            }
            RouteDecision::Empty => {
                info!(category = %request.category, "Missing user or list name, nothing to fetch");
                return Vec::new();
            }
        };

        let items = match self.try_fetch(&route, credentials).await {
            Ok(items) => items,
            Err(e) => {
                warn!(category = %request.category, error = %e, "Trakt fetch failed");
                Vec::new()
            }
        };

        if items.is_empty() {
            debug!(endpoint = %route.endpoint, "No items from Trakt, serving demo items");
            return demo_items(&self.options);
        }

        items
    }

    /// Fetch and normalize one resolved route, keeping the failure cause
    pub async fn try_fetch(&self, route: &Route, credentials: &Credentials) -> Result<Vec<NormalizedItem>, FetchError> {
        let payload = api::get_json(self.transport.as_ref(), &self.base_url, route, credentials).await?;
        let items = normalize_records(&payload, &self.options);
        debug!(endpoint = %route.endpoint, count = items.len(), "Normalized Trakt items");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, TEST_BASE_URL};
    use serde_json::json;
    use trakt_feed_models::{IdScheme, MediaKind};

    const TOKEN: &str = "0123456789abcdef";

    fn router(transport: &Arc<ScriptedTransport>) -> ContentRouter {
        ContentRouter::new(transport.clone(), TEST_BASE_URL)
    }

    fn creds() -> Credentials {
        Credentials::new("client-123")
    }

    fn fetched(decision: RouteDecision) -> Route {
        match decision {
            RouteDecision::Fetch(route) => route,
            other => panic!("expected a fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_routing_table() {
        let with_token = creds().with_token(TOKEN);
        let anonymous = creds();

        let route = fetched(resolve_route(&ContentRequest::new(ContentCategory::Trending).with_page(3), &anonymous));
        assert_eq!(route.endpoint, "/movies/trending");
        assert_eq!(route.query_value("page"), Some("3"));
        assert_eq!(route.query_value("limit"), Some("20"));
        assert_eq!(route.query_value("extended"), Some("full"));

        let route = fetched(resolve_route(&ContentRequest::new(ContentCategory::Watchlist), &with_token));
        assert_eq!(route.endpoint, "/sync/watchlist");
        assert_eq!(route.query_value("sort"), Some("rank,asc"));

        let request = ContentRequest::new(ContentCategory::Watchlist).with_user("sean");
        let route = fetched(resolve_route(&request, &anonymous));
        assert_eq!(route.endpoint, "/users/sean/watchlist");
        assert_eq!(route.query_value("sort"), None);

        let route = fetched(resolve_route(&ContentRequest::new(ContentCategory::Progress), &with_token));
        assert_eq!(route.endpoint, "/sync/playback/episodes");

        let route = fetched(resolve_route(&ContentRequest::new(ContentCategory::Recommendations), &with_token));
        assert_eq!(route.endpoint, "/recommendations/movies");
        assert_eq!(route.query_value("ignore_collected"), Some("true"));

        let route = fetched(resolve_route(&ContentRequest::new(ContentCategory::HistoryShows), &with_token));
        assert_eq!(route.endpoint, "/sync/history/shows");

        let request = ContentRequest::new(ContentCategory::HistoryMovies).with_user("sean");
        let route = fetched(resolve_route(&request, &anonymous));
        assert_eq!(route.endpoint, "/users/sean/history/movies");

        let request = ContentRequest::new(ContentCategory::CustomList).with_user("sean").with_list("best of 2024");
        let route = fetched(resolve_route(&request, &anonymous));
        assert_eq!(route.endpoint, "/users/sean/lists/best%20of%202024/items");
    }

    #[test]
    fn test_unmet_requirements_never_build_requests() {
        let anonymous = creds();
        let short_token = creds().with_token("abc");

        for credentials in [&anonymous, &short_token] {
            assert_eq!(resolve_route(&ContentRequest::new(ContentCategory::Watchlist), credentials), RouteDecision::Demo);
            assert_eq!(resolve_route(&ContentRequest::new(ContentCategory::Progress), credentials), RouteDecision::Demo);
            assert_eq!(resolve_route(&ContentRequest::new(ContentCategory::HistoryMovies), credentials), RouteDecision::Demo);
            assert_eq!(resolve_route(&ContentRequest::new(ContentCategory::HistoryShows), credentials), RouteDecision::Demo);
            assert_eq!(
                resolve_route(&ContentRequest::new(ContentCategory::CustomList).with_user("sean"), credentials),
                RouteDecision::Empty
            );
        }

        // Progress is token-only, a user name does not unlock it
        let request = ContentRequest::new(ContentCategory::Progress).with_user("sean");
        assert_eq!(resolve_route(&request, &anonymous), RouteDecision::Demo);

        let route = fetched(resolve_route(&ContentRequest::new(ContentCategory::Recommendations), &anonymous));
        assert_eq!(route.endpoint, "/movies/trending");
        assert_eq!(route.query_value("ignore_collected"), None);
    }

    #[tokio::test]
    async fn test_missing_client_id_serves_demo_without_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let router = router(&transport);

        for category in ContentCategory::ALL {
            let request = ContentRequest::new(category).with_user("sean").with_list("favs");
            let items = router.fetch_content(&request, &Credentials::new("  ").with_token(TOKEN)).await;
            assert_eq!(items, demo_items(router.options()));
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_watchlist_with_token_sends_authenticated_request() {
        let transport = Arc::new(ScriptedTransport::new().respond_json(
            200,
            json!([
                {"rank": 1, "type": "movie", "movie": {"title": "Dune", "ids": {"imdb": "tt1160419", "tmdb": 438631}}},
                {"rank": 2, "type": "show", "show": {"title": "Severance", "ids": {"imdb": "tt11280740", "tmdb": 95396}}},
                {"rank": 3, "type": "show", "show": {"title": "Unknown", "ids": {"tmdb": 1}}}
            ]),
        ));
        let router = router(&transport);

        let request = ContentRequest::new(ContentCategory::Watchlist).with_page(2);
        let items = router.fetch_content(&request, &creds().with_token(TOKEN)).await;

        assert_eq!(
            items,
            vec![
                NormalizedItem::new("tt1160419", IdScheme::Imdb).with_media_kind(MediaKind::Movie),
                NormalizedItem::new("tt11280740", IdScheme::Imdb).with_media_kind(MediaKind::Tv),
            ]
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.method, "GET");
        assert_eq!(sent.path(), "/sync/watchlist");
        assert!(sent.url.starts_with("https://api.trakt.tv/sync/watchlist?page=2&limit=20&extended=full"));
        assert_eq!(sent.header("trakt-api-version"), Some("2"));
        assert_eq!(sent.header("trakt-api-key"), Some("client-123"));
        assert_eq!(sent.header("Authorization"), Some("Bearer 0123456789abcdef"));
    }

    #[tokio::test]
    async fn test_public_trending_has_no_authorization_header() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_json(200, json!([{"watchers": 10, "movie": {"ids": {"imdb": "tt15239678"}}}])),
        );
        let router = ContentRouter::new(transport.clone(), "http://localhost:9000/");

        let items = router.fetch_content(&ContentRequest::new(ContentCategory::Trending), &creds()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].external_id, "tt15239678");

        let sent = &transport.requests()[0];
        assert!(sent.url.starts_with("http://localhost:9000/movies/trending?"));
        assert_eq!(sent.header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_upstream_failures_fall_back_to_demo() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(401, "{\"error\":\"unauthorized\"}")
                .fail("connection reset")
                .respond(200, "<html>not json</html>")
                .respond_json(200, json!([]))
                .respond_json(200, json!({"not": "a list"})),
        );
        let router = router(&transport);
        let request = ContentRequest::new(ContentCategory::Trending);

        for _ in 0..5 {
            let items = router.fetch_content(&request, &creds()).await;
            assert_eq!(items, demo_items(router.options()));
        }
        assert_eq!(transport.request_count(), 5);
    }

    #[tokio::test]
    async fn test_try_fetch_distinguishes_failures() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(500, "")
                .fail("dns failure")
                .respond(200, "not json"),
        );
        let router = router(&transport);
        let route = Route::paged("/movies/trending", 1);

        assert_eq!(
            router.try_fetch(&route, &creds()).await,
            Err(FetchError::Status { status: 500, endpoint: "/movies/trending".to_string() })
        );
        assert!(matches!(router.try_fetch(&route, &creds()).await, Err(FetchError::Transport(_))));
        assert!(matches!(router.try_fetch(&route, &creds()).await, Err(FetchError::Decode { .. })));
        assert_eq!(router.try_fetch(&route, &Credentials::default()).await, Err(FetchError::MissingClientId));
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_custom_list_without_names_is_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        let router = router(&transport);

        let request = ContentRequest::new(ContentCategory::CustomList).with_list("favs");
        assert!(router.fetch_content(&request, &creds().with_token(TOKEN)).await.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_feed_uses_tmdb_policy() {
        let transport = Arc::new(ScriptedTransport::new().respond_json(
            200,
            json!([{
                "progress": 12.5,
                "episode": {"ids": {"tmdb": 349232}},
                "show": {"title": "Breaking Bad", "ids": {"tmdb": 1396}}
            }]),
        ));
        let options = NormalizeOptions { title: true, ..NormalizeOptions::new(IdScheme::Tmdb) };
        let router = router(&transport).with_options(options);

        let items = router
            .fetch_content(&ContentRequest::new(ContentCategory::Progress), &creds().with_token(TOKEN))
            .await;
        assert_eq!(
            items,
            vec![NormalizedItem::new("1396", IdScheme::Tmdb)
                .with_media_kind(MediaKind::Tv)
                .with_title("Breaking Bad")]
        );
    }
}
