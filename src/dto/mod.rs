pub mod catalog_dto;
pub mod pricing_dto;
pub mod project_dto;
pub mod request_dto;
