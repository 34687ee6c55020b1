pub mod api;
pub mod auth;
pub mod demo;
pub mod normalize;
pub mod router;

pub use auth::{authorization_url, PollPolicy, TraktAuth};
pub use demo::demo_items;
pub use normalize::{normalize_records, NormalizeOptions, RecordShape};
pub use router::{resolve_route, ContentRouter, RouteDecision};
