use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use stockroom_core::{CategoryId, DomainError, Entity, Owned, ProductId, UserId, Validator};

use crate::category::{CategorySummary, MAX_DESCRIPTION_CHARS};

/// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A stocked item, owned by one user.
///
/// If `category_id` is set it names a category of the same owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u64,
    pub category_id: Option<CategoryId>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(owner_id: UserId, input: ValidCreateProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::new(),
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, change: ProductChange, now: DateTime<Utc>) {
        match change {
            ProductChange::Name(name) => self.name = name,
            ProductChange::Description(description) => self.description = description,
            ProductChange::Price(price) => self.price = price,
            ProductChange::Quantity(quantity) => self.quantity = quantity,
            ProductChange::Category(category_id) => self.category_id = category_id,
        }
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Owned for Product {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// A product as returned to clients, with its category populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<CategorySummary>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command: CreateProduct (as received).
///
/// `price` and `quantity` accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProduct {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub price: Option<Value>,
    pub quantity: Option<Value>,
    pub category: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidCreateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u64,
    pub category_id: Option<CategoryId>,
}

impl CreateProduct {
    pub fn validate(self) -> Result<ValidCreateProduct, DomainError> {
        let mut v = Validator::new();
        let name = v.text("name", self.name.as_ref());
        let description = v.text("description", self.description.as_ref());
        let category = v.text("category", self.category.as_ref());

        let name = v.required_text("name", name.as_deref(), "Product name is required");
        let description = description.as_deref().map(str::trim).unwrap_or_default();
        v.max_chars(
            "description",
            description,
            MAX_DESCRIPTION_CHARS,
            "Description cannot exceed 500 characters",
        );
        let price = check_price(&mut v, self.price.as_ref());
        let quantity = check_quantity(&mut v, self.quantity.as_ref());
        let category_id = match category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => v.parse_id("category", raw, "Category must be a valid ID"),
        };

        v.finish()?;

        Ok(ValidCreateProduct {
            name: name.unwrap_or_default(),
            description: description.to_string(),
            price: price.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            category_id,
        })
    }
}

/// Command: UpdateProduct (partial).
///
/// Only the whitelisted fields below are read; anything else in the body is
/// ignored. `category: null` or `category: ""` clears the link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub price: Option<Value>,
    pub quantity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<Value>>,
}

/// The closed set of product fields a patch may touch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductChange {
    Name(String),
    Description(String),
    Price(f64),
    Quantity(u64),
    /// `None` clears the link.
    Category(Option<CategoryId>),
}

impl UpdateProduct {
    pub fn into_changes(self) -> Result<Vec<ProductChange>, DomainError> {
        let mut v = Validator::new();
        let mut changes = Vec::new();

        if let Some(raw) = v.text("name", self.name.as_ref()) {
            if let Some(name) = v.required_text("name", Some(&raw), "Product name is required") {
                changes.push(ProductChange::Name(name));
            }
        }
        if let Some(raw) = v.text("description", self.description.as_ref()) {
            let description = raw.trim();
            v.max_chars(
                "description",
                description,
                MAX_DESCRIPTION_CHARS,
                "Description cannot exceed 500 characters",
            );
            changes.push(ProductChange::Description(description.to_string()));
        }
        if let Some(raw) = self.price.as_ref() {
            if let Some(price) = check_price(&mut v, Some(raw)) {
                changes.push(ProductChange::Price(price));
            }
        }
        if let Some(raw) = self.quantity.as_ref() {
            if let Some(quantity) = check_quantity(&mut v, Some(raw)) {
                changes.push(ProductChange::Quantity(quantity));
            }
        }
        match self.category {
            None => {}
            Some(None) => changes.push(ProductChange::Category(None)),
            Some(Some(raw)) => match v.text("category", Some(&raw)) {
                None => {}
                Some(raw) if raw.trim().is_empty() => changes.push(ProductChange::Category(None)),
                Some(raw) => {
                    if let Some(id) = v.parse_id("category", &raw, "Category must be a valid ID") {
                        changes.push(ProductChange::Category(Some(id)));
                    }
                }
            },
        }

        v.finish()?;
        Ok(changes)
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Numeric coercion: JSON numbers and numeric strings are accepted.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn check_price(v: &mut Validator, raw: Option<&Value>) -> Option<f64> {
    match raw.and_then(coerce_number) {
        Some(price) if price >= 0.0 => Some(price),
        _ => {
            v.reject("price", "Price must be a positive number");
            None
        }
    }
}

fn check_quantity(v: &mut Validator, raw: Option<&Value>) -> Option<u64> {
    match raw.and_then(coerce_number) {
        Some(q) if q >= 0.0 && q.fract() == 0.0 && q <= MAX_SAFE_INTEGER => Some(q as u64),
        _ => {
            v.reject("quantity", "Quantity must be a non-negative integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn create(body: Value) -> Result<ValidCreateProduct, DomainError> {
        serde_json::from_value::<CreateProduct>(body).unwrap().validate()
    }

    fn update(body: Value) -> Result<Vec<ProductChange>, DomainError> {
        serde_json::from_value::<UpdateProduct>(body).unwrap().into_changes()
    }

    #[test]
    fn create_coerces_numeric_strings() {
        let valid = create(json!({
            "name": " Hammer ",
            "price": "12.50",
            "quantity": "3",
        }))
        .unwrap();
        assert_eq!(valid.name, "Hammer");
        assert_eq!(valid.price, 12.5);
        assert_eq!(valid.quantity, 3);
        assert_eq!(valid.category_id, None);
    }

    #[test]
    fn create_treats_empty_category_as_none() {
        let valid = create(json!({"name": "Saw", "price": 1, "quantity": 0, "category": ""})).unwrap();
        assert_eq!(valid.category_id, None);

        let id = CategoryId::new();
        let valid =
            create(json!({"name": "Saw", "price": 1, "quantity": 0, "category": id.to_string()}))
                .unwrap();
        assert_eq!(valid.category_id, Some(id));
    }

    #[test]
    fn create_reports_every_field() {
        let err = create(json!({
            "name": "",
            "description": "d".repeat(501),
            "price": -1,
            "quantity": 1.5,
            "category": "nope",
        }))
        .unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description", "price", "quantity", "category"]);
    }

    #[test]
    fn create_reports_wrong_types_alongside_other_failures() {
        let err = create(json!({"name": 123, "price": -1})).unwrap_err();
        let details: Vec<_> = err
            .details()
            .iter()
            .map(|d| (d.field.as_str(), d.message.as_str()))
            .collect();
        assert_eq!(
            details,
            vec![
                ("name", "name must be a string"),
                ("price", "Price must be a positive number"),
                ("quantity", "Quantity must be a non-negative integer"),
            ]
        );

        let err = create(json!({"name": "Saw", "description": {}, "price": 1, "quantity": 1, "category": 7}))
            .unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["description", "category"]);
    }

    #[test]
    fn create_requires_price_and_quantity() {
        let err = create(json!({"name": "Saw"})).unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["price", "quantity"]);
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(create(json!({"name": "Saw", "price": true, "quantity": 1})).is_err());
        assert!(create(json!({"name": "Saw", "price": "abc", "quantity": 1})).is_err());
        assert!(create(json!({"name": "Saw", "price": 1, "quantity": "NaN"})).is_err());
    }

    #[test]
    fn update_distinguishes_absent_null_and_empty_category() {
        assert_eq!(update(json!({})).unwrap(), vec![]);
        assert_eq!(
            update(json!({"category": null})).unwrap(),
            vec![ProductChange::Category(None)]
        );
        assert_eq!(
            update(json!({"category": ""})).unwrap(),
            vec![ProductChange::Category(None)]
        );
        let id = CategoryId::new();
        assert_eq!(
            update(json!({"category": id.to_string()})).unwrap(),
            vec![ProductChange::Category(Some(id))]
        );
    }

    #[test]
    fn update_ignores_fields_outside_whitelist() {
        let changes = update(json!({
            "ownerId": UserId::new().to_string(),
            "id": ProductId::new().to_string(),
            "price": "2",
        }))
        .unwrap();
        assert_eq!(changes, vec![ProductChange::Price(2.0)]);
    }

    #[test]
    fn update_validates_present_fields() {
        let err = update(json!({"name": "  ", "quantity": -2})).unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "quantity"]);

        let err = update(json!({"name": ["Saw"], "category": false, "price": "abc"})).unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "price", "category"]);
    }

    #[test]
    fn view_populates_category() {
        let owner = UserId::new();
        let now = Utc::now();
        let product = Product::new(
            owner,
            ValidCreateProduct {
                name: "Saw".into(),
                description: String::new(),
                price: 9.99,
                quantity: 2,
                category_id: None,
            },
            now,
        );
        let view = ProductView {
            product,
            category: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Saw");
        assert_eq!(json["ownerId"], owner.to_string());
        assert!(json["category"].is_null());
        assert!(json["categoryId"].is_null());
    }
}
