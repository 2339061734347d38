//! List queries: the product filter specification, pagination, and parsing of
//! raw query-string parameters.

use serde::{Deserialize, Serialize};

use stockroom_auth::OwnerScope;
use stockroom_core::{CategoryId, DomainError, UserId, Validator};

use crate::product::Product;

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Filter specification
// ─────────────────────────────────────────────────────────────────────────────

/// Case-insensitive literal substring match on name OR description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    needle: String,
}

impl TextSearch {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.to_lowercase(),
        }
    }

    pub fn term(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, name: &str, description: &str) -> bool {
        name.to_lowercase().contains(&self.needle)
            || description.to_lowercase().contains(&self.needle)
    }
}

/// Inclusive price bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// `scope AND category AND search AND price`, built once per list request
/// and handed to the store as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub scope: OwnerScope,
    pub category: Option<CategoryId>,
    pub search: Option<TextSearch>,
    pub price: PriceRange,
}

impl ProductFilter {
    /// Filter with only the owner scope applied.
    pub fn scoped(scope: OwnerScope) -> Self {
        Self {
            scope,
            category: None,
            search: None,
            price: PriceRange::default(),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.scope.admits(product.owner_id)
            && self
                .category
                .is_none_or(|category| product.category_id == Some(category))
            && self
                .search
                .as_ref()
                .is_none_or(|search| search.matches(&product.name, &product.description))
            && self.price.contains(product.price)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

/// One page of results plus the totals for the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            pagination: Pagination {
                total,
                page: request.page,
                pages: total.div_ceil(request.limit),
                limit: request.limit,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw query parameters
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /products` query string, as received. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub owner_id: Option<String>,
}

/// Validated product list request, before the owner scope is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListQuery {
    pub requested_owner: Option<UserId>,
    pub category: Option<CategoryId>,
    pub search: Option<TextSearch>,
    pub price: PriceRange,
    pub page: PageRequest,
}

impl ProductListQuery {
    pub fn into_filter(self, scope: OwnerScope) -> (ProductFilter, PageRequest) {
        let filter = ProductFilter {
            scope,
            category: self.category,
            search: self.search,
            price: self.price,
        };
        (filter, self.page)
    }
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ProductListParams {
    pub fn validate(self) -> Result<ProductListQuery, DomainError> {
        let mut v = Validator::new();

        let page = match non_empty(&self.page) {
            None => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    v.reject("page", "Page must be 1 or greater");
                    1
                }
            },
        };
        let limit = match non_empty(&self.limit) {
            None => DEFAULT_PAGE_LIMIT,
            Some(raw) => match raw.parse::<u64>() {
                Ok(limit) if (1..=MAX_PAGE_LIMIT).contains(&limit) => limit,
                _ => {
                    v.reject("limit", "Limit must be between 1 and 100");
                    DEFAULT_PAGE_LIMIT
                }
            },
        };
        let search = non_empty(&self.search).map(TextSearch::new);
        let category = non_empty(&self.category)
            .and_then(|raw| v.parse_id("category", raw, "Category filter must be a valid ID"));
        let min = non_empty(&self.min_price)
            .and_then(|raw| parse_price(&mut v, "minPrice", raw, "minPrice must be positive"));
        let max = non_empty(&self.max_price)
            .and_then(|raw| parse_price(&mut v, "maxPrice", raw, "maxPrice must be positive"));
        let requested_owner = non_empty(&self.owner_id)
            .and_then(|raw| v.parse_id("ownerId", raw, "ownerId must be a valid ID"));

        v.finish()?;

        Ok(ProductListQuery {
            requested_owner,
            category,
            search,
            price: PriceRange { min, max },
            page: PageRequest { page, limit },
        })
    }
}

fn parse_price(v: &mut Validator, field: &str, raw: &str, message: &str) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
        _ => {
            v.reject(field, message);
            None
        }
    }
}

/// `GET /categories` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListParams {
    pub owner_id: Option<String>,
}

impl CategoryListParams {
    pub fn validate(self) -> Result<Option<UserId>, DomainError> {
        let mut v = Validator::new();
        let owner = non_empty(&self.owner_id)
            .and_then(|raw| v.parse_id("ownerId", raw, "ownerId must be a valid ID"));
        v.finish()?;
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::*;
    use crate::product::ValidCreateProduct;

    fn product(owner: UserId, name: &str, description: &str, price: f64) -> Product {
        Product::new(
            owner,
            ValidCreateProduct {
                name: name.into(),
                description: description.into(),
                price,
                quantity: 1,
                category_id: None,
            },
            Utc::now(),
        )
    }

    fn params(pairs: &[(&str, &str)]) -> ProductListParams {
        let mut p = ProductListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => p.page = value,
                "limit" => p.limit = value,
                "search" => p.search = value,
                "category" => p.category = value,
                "minPrice" => p.min_price = value,
                "maxPrice" => p.max_price = value,
                "ownerId" => p.owner_id = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn search_is_literal_and_case_insensitive() {
        let search = TextSearch::new("DRILL.*");
        assert!(!search.matches("Drill bit", ""));
        assert!(search.matches("Power drill.* (literal)", ""));

        let search = TextSearch::new("CoRdLeSs");
        assert!(search.matches("Drill", "A cordless drill"));
        assert!(!search.matches("Drill", "Corded"));
    }

    #[test]
    fn filter_combines_every_clause() {
        let alice = UserId::new();
        let bob = UserId::new();
        let category = CategoryId::new();

        let mut saw = product(alice, "Saw", "Hand saw", 20.0);
        saw.category_id = Some(category);
        let hammer = product(alice, "Hammer", "Claw", 15.0);
        let bobs_saw = product(bob, "Saw", "Hand saw", 20.0);

        let filter = ProductFilter {
            scope: OwnerScope::Owner(alice),
            category: Some(category),
            search: Some(TextSearch::new("saw")),
            price: PriceRange {
                min: Some(10.0),
                max: Some(20.0),
            },
        };
        assert!(filter.matches(&saw));
        assert!(!filter.matches(&hammer));
        assert!(!filter.matches(&bobs_saw));

        let cheap = ProductFilter {
            price: PriceRange {
                min: None,
                max: Some(19.99),
            },
            ..filter
        };
        assert!(!cheap.matches(&saw));
    }

    #[test]
    fn params_default_when_absent_or_empty() {
        let query = params(&[("page", ""), ("limit", " "), ("search", ""), ("ownerId", "")])
            .validate()
            .unwrap();
        assert_eq!(query.page, PageRequest::default());
        assert_eq!(query.search, None);
        assert_eq!(query.requested_owner, None);
    }

    #[test]
    fn params_report_every_invalid_field() {
        let err = params(&[
            ("page", "0"),
            ("limit", "101"),
            ("category", "abc"),
            ("minPrice", "-1"),
            ("maxPrice", "x"),
            ("ownerId", "42"),
        ])
        .validate()
        .unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["page", "limit", "category", "minPrice", "maxPrice", "ownerId"]
        );
    }

    #[test]
    fn params_parse_valid_values() {
        let owner = UserId::new();
        let query = params(&[
            ("page", "3"),
            ("limit", "25"),
            ("minPrice", "1.5"),
            ("ownerId", &owner.to_string()),
        ])
        .validate()
        .unwrap();
        assert_eq!(query.page, PageRequest { page: 3, limit: 25 });
        assert_eq!(query.page.skip(), 50);
        assert_eq!(query.price.min, Some(1.5));
        assert_eq!(query.requested_owner, Some(owner));
    }

    #[test]
    fn twenty_five_items_make_three_pages() {
        let request = PageRequest { page: 4, limit: 10 };
        let page: Page<u8> = Page::new(Vec::new(), 25, request);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.pagination.page, 4);
        assert!(page.items.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn pages_cover_total_exactly(total in 0u64..10_000, limit in 1u64..=MAX_PAGE_LIMIT) {
            let page: Page<()> = Page::new(Vec::new(), total, PageRequest { page: 1, limit });
            let pages = page.pagination.pages;
            prop_assert!(pages * limit >= total);
            if pages > 0 {
                prop_assert!((pages - 1) * limit < total);
            } else {
                prop_assert_eq!(total, 0);
            }
        }

        #[test]
        fn page_windows_partition_the_set(total in 0usize..300, limit in 1u64..=MAX_PAGE_LIMIT) {
            let items: Vec<usize> = (0..total).collect();
            let mut seen = Vec::new();
            let pages = (total as u64).div_ceil(limit);
            for page in 1..=pages + 1 {
                let request = PageRequest { page, limit };
                let window: Vec<usize> = items
                    .iter()
                    .copied()
                    .skip(request.skip() as usize)
                    .take(limit as usize)
                    .collect();
                if page > pages {
                    prop_assert!(window.is_empty());
                }
                seen.extend(window);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
