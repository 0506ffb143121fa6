//! Proxy module
//!
//! Handles the calls to the DuckDuckGo chat backend.

pub mod duckduckgo;
pub mod headers;
pub mod logging;
pub mod provider;

pub use duckduckgo::DuckDuckGoClient;
pub use logging::RequestContext;
pub use provider::{ByteStream, ChatProvider};
