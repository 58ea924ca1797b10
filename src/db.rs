pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
