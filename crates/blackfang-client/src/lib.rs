//! Typed client for the dashboard REST API.

mod client;
mod error;
mod session;
mod source;

pub use client::BlackfangClient;
pub use error::ClientError;
pub use session::{FileSessionHook, MemorySessionHook, SessionHook, StoredSession};
pub use source::RemoteSource;
