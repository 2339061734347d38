//! `stockroom-catalog`: categories and products.
//!
//! Records, input validation, list queries, and the two resource services.
//! Storage is reached only through the repository traits.

pub mod category;
pub mod category_service;
pub mod ownership;
pub mod product;
pub mod product_service;
pub mod query;
pub mod repository;

pub use category::{
    Category, CategoryChange, CategorySummary, CreateCategory, UpdateCategory, ValidCreateCategory,
};
pub use category_service::CategoryService;
pub use ownership::resolve_category_for_product;
pub use product::{
    CreateProduct, Product, ProductChange, ProductView, UpdateProduct, ValidCreateProduct,
    coerce_number,
};
pub use product_service::ProductService;
pub use query::{
    CategoryListParams, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, PageRequest, Pagination,
    PriceRange, ProductFilter, ProductListParams, ProductListQuery, TextSearch,
};
pub use repository::{CategoryRepository, ProductRepository};
