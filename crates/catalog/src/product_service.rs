use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use stockroom_auth::{Principal, authorize_access, scope_for_list};
use stockroom_core::{CategoryId, DomainError, DomainResult, ProductId};

use crate::category::CategorySummary;
use crate::ownership::resolve_category_for_product;
use crate::product::{CreateProduct, Product, ProductChange, ProductView, UpdateProduct};
use crate::query::{Page, ProductListParams};
use crate::repository::{CategoryRepository, ProductRepository};

/// Product use cases: ownership checks, category linking, and listing.
#[derive(Clone)]
pub struct ProductService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(categories: Arc<dyn CategoryRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { categories, products }
    }

    /// Create a product owned by the caller, optionally linked to one of the
    /// caller's categories.
    #[instrument(skip_all, fields(subject = %principal.subject_id))]
    pub fn create(&self, principal: &Principal, input: CreateProduct) -> DomainResult<ProductView> {
        let input = input.validate()?;
        let owner = principal.subject_id;

        let category = match input.category_id {
            Some(id) => Some(resolve_category_for_product(
                self.categories.as_ref(),
                principal,
                owner,
                id,
            )?),
            None => None,
        };

        let product = self.products.insert(Product::new(owner, input, Utc::now()))?;
        info!(product = %product.id, "product created");
        Ok(ProductView {
            product,
            category: category.map(|c| c.summary()),
        })
    }

    /// Filtered, paginated listing, newest first.
    pub fn list(
        &self,
        principal: &Principal,
        params: ProductListParams,
    ) -> DomainResult<Page<ProductView>> {
        let query = params.validate()?;
        let scope = scope_for_list(principal, query.requested_owner, "products")?;
        let (filter, request) = query.into_filter(scope);

        let total = self.products.count(&filter)?;
        let items = self.products.find(&filter, request.skip(), request.limit)?;

        let mut summaries: HashMap<CategoryId, Option<CategorySummary>> = HashMap::new();
        let mut views = Vec::with_capacity(items.len());
        for product in items {
            let category = match product.category_id {
                Some(id) => match summaries.get(&id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let summary = self.categories.get(id)?.map(|c| c.summary());
                        summaries.insert(id, summary.clone());
                        summary
                    }
                },
                None => None,
            };
            views.push(ProductView { product, category });
        }

        Ok(Page::new(views, total, request))
    }

    pub fn get(&self, principal: &Principal, id: ProductId) -> DomainResult<ProductView> {
        let product = self.fetch(id)?;
        authorize_access(principal, &product)?;
        self.view(product)
    }

    /// Partial update of the whitelisted fields.
    ///
    /// A new category link is resolved against the product's existing owner,
    /// not the acting principal.
    #[instrument(skip_all, fields(subject = %principal.subject_id, product = %id))]
    pub fn update(
        &self,
        principal: &Principal,
        id: ProductId,
        patch: UpdateProduct,
    ) -> DomainResult<ProductView> {
        let mut product = self.fetch(id)?;
        authorize_access(principal, &product)?;

        let changes = patch.into_changes()?;
        for change in &changes {
            if let ProductChange::Category(Some(category_id)) = change {
                resolve_category_for_product(
                    self.categories.as_ref(),
                    principal,
                    product.owner_id,
                    *category_id,
                )?;
            }
        }

        let now = Utc::now();
        for change in changes {
            product.apply(change, now);
        }
        let product = self
            .products
            .update(product)?
            .ok_or_else(|| DomainError::not_found("Product not found"))?;
        info!("product updated");
        self.view(product)
    }

    #[instrument(skip_all, fields(subject = %principal.subject_id, product = %id))]
    pub fn delete(&self, principal: &Principal, id: ProductId) -> DomainResult<()> {
        let product = self.fetch(id)?;
        authorize_access(principal, &product)?;

        if !self.products.delete(product.id)? {
            return Err(DomainError::not_found("Product not found"));
        }
        info!("product deleted");
        Ok(())
    }

    fn fetch(&self, id: ProductId) -> DomainResult<Product> {
        self.products
            .get(id)?
            .ok_or_else(|| DomainError::not_found("Product not found"))
    }

    fn view(&self, product: Product) -> DomainResult<ProductView> {
        let category = match product.category_id {
            Some(id) => self.categories.get(id)?.map(|c| c.summary()),
            None => None,
        };
        Ok(ProductView { product, category })
    }
}
