pub mod catalog_handler;
pub mod project_handler;
pub mod request_handler;
