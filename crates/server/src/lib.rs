pub mod config;
pub mod error;
pub mod routes;

use services::services::{crunchy_api::CrunchyApiClient, notion_api::NotionApiClient};

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub crunchy: CrunchyApiClient,
    pub notion: NotionApiClient,
    /// Fallback export target when the request does not name a database.
    pub default_notion_database: Option<String>,
}
