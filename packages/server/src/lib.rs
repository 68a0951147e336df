//! Navtree Server
//!
//! axum HTTP API over [`navtree_core`] plus the matching HTTP client.
//!
//! # Modules
//!
//! - [`api`] - Router, bearer-session extractors, endpoints, error envelope
//! - [`client`] - [`client::HttpNavigationClient`] implementing `NavigationApi`
//! - [`config`] - Environment-driven [`config::ServerConfig`]

pub mod api;
pub mod client;
pub mod config;

pub use api::{create_router, start_server, AppState};
pub use client::HttpNavigationClient;
pub use config::ServerConfig;
