use tracing::debug;

use stockroom_auth::Principal;
use stockroom_core::{CategoryId, DomainError, DomainResult, UserId};

use crate::category::Category;
use crate::repository::CategoryRepository;

/// Look up the category a product wants to link to.
///
/// The category must belong to `product_owner`, which is not necessarily the
/// acting principal: an admin writing a product for user A may only attach
/// A's categories. Anything else reads as "Category not found".
pub fn resolve_category_for_product(
    categories: &dyn CategoryRepository,
    principal: &Principal,
    product_owner: UserId,
    category_id: CategoryId,
) -> DomainResult<Category> {
    match categories.get(category_id)? {
        Some(category) if category.owner_id == product_owner => Ok(category),
        Some(category) => {
            debug!(
                subject = %principal.subject_id,
                category = %category_id,
                category_owner = %category.owner_id,
                product_owner = %product_owner,
                "category belongs to another owner"
            );
            Err(DomainError::not_found("Category not found"))
        }
        None => Err(DomainError::not_found("Category not found")),
    }
}
