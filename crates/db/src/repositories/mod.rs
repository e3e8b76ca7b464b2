//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row writes run in a
//! single transaction.

pub mod brand_repo;
pub mod category_repo;
pub mod product_repo;
pub mod product_template_repo;
pub mod template_repo;

pub use brand_repo::BrandRepo;
pub use category_repo::CategoryRepo;
pub use product_repo::ProductRepo;
pub use product_template_repo::ProductTemplateRepo;
pub use template_repo::TemplateRepo;
