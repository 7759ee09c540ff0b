pub mod catalog_service;
pub mod relink_service;
pub mod thumbnail_service;
