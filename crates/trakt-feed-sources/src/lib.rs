pub mod error;
pub mod trakt;
pub mod transport;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AuthError, FetchError, SchemaError, TransportError};
pub use trakt::{ContentRouter, NormalizeOptions, PollPolicy, TraktAuth};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use widget::{InvokeOutput, Manifest, WidgetHost};
