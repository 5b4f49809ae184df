//! Package registry access

mod client;
mod pypi;

pub use client::HttpClient;
pub use pypi::{PyPiAdapter, REGISTRY_NAME};
