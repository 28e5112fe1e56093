//! Canonical event pipeline shared by every form integration: the event
//! model, the request-scoped tracking sink, browser pixel rendering and the
//! Conversions API payload.

pub mod config;
pub mod conversions;
pub mod error;
pub mod factory;
pub mod pixel;
pub mod request;
pub mod sink;
pub mod types;

pub use config::AppConfig;
pub use error::{PixelError, PixelResult};
pub use factory::ServerEventFactory;
pub use pixel::PixelRenderer;
pub use request::RequestContext;
pub use sink::{RequestSink, TrackingSink};
pub use types::{ServerEvent, UserData};
