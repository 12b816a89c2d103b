pub mod catalog_router;
pub mod project_router;
pub mod request_router;
