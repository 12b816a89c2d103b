pub mod catalog_service;
pub mod conversion_service;
pub mod pricing_service;
pub mod project_service;
pub mod request_service;
