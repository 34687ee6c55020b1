pub mod credentials;
pub mod device;
pub mod display;
pub mod item;
pub mod media;
pub mod request;

pub use credentials::Credentials;
pub use device::{DeviceAuthSession, TokenGrant};
pub use display::DisplayRecord;
pub use item::NormalizedItem;
pub use media::{IdScheme, MediaKind};
pub use request::{ContentCategory, ContentRequest};
