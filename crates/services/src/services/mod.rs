pub mod crawl;
pub mod crunchy_api;
pub mod notion_api;
pub mod notion_export;
