//! `stockroom-core`: shared domain building blocks.
//!
//! Identifiers, the error taxonomy, and field validation. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult, FieldError, StoreError};
pub use id::{CategoryId, ProductId, UserId};
pub use validation::Validator;
