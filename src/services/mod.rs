pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod member_service;
pub use member_service::MemberService;
pub mod order_service;
pub use order_service::OrderService;
pub mod report_service;
pub use report_service::ReportService;
