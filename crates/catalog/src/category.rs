use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_core::{CategoryId, DomainError, Entity, Owned, UserId, Validator};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// A named grouping of products, owned by one user.
///
/// `(name, owner_id)` is unique; different owners may reuse a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(owner_id: UserId, name: String, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id: CategoryId::new(),
            name,
            description,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, change: CategoryChange, now: DateTime<Utc>) {
        match change {
            CategoryChange::Name(name) => self.name = name,
            CategoryChange::Description(description) => self.description = description,
        }
        self.updated_at = now;
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Owned for Category {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// The part of a category embedded in product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

/// Command: CreateCategory (as received).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategory {
    pub name: Option<Value>,
    pub description: Option<Value>,
}

/// CreateCategory after validation; text is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCreateCategory {
    pub name: String,
    pub description: String,
}

impl CreateCategory {
    pub fn validate(self) -> Result<ValidCreateCategory, DomainError> {
        let mut v = Validator::new();
        let name = v.text("name", self.name.as_ref());
        let description = v.text("description", self.description.as_ref());

        let name = v.required_text("name", name.as_deref(), "Category name is required");
        if let Some(name) = &name {
            v.max_chars(
                "name",
                name,
                MAX_NAME_CHARS,
                "Category name must be 100 characters or fewer",
            );
        }
        let description = description.as_deref().map(str::trim).unwrap_or_default();
        v.max_chars(
            "description",
            description,
            MAX_DESCRIPTION_CHARS,
            "Description must be 500 characters or fewer",
        );
        v.finish()?;

        Ok(ValidCreateCategory {
            name: name.unwrap_or_default(),
            description: description.to_string(),
        })
    }
}

/// Command: UpdateCategory (partial; absent fields stay untouched).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<Value>,
    pub description: Option<Value>,
}

/// The closed set of category fields a patch may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChange {
    Name(String),
    Description(String),
}

impl UpdateCategory {
    /// Validate every present field and list the resulting changes.
    pub fn into_changes(self) -> Result<Vec<CategoryChange>, DomainError> {
        let mut v = Validator::new();
        let mut changes = Vec::new();

        if let Some(raw) = v.text("name", self.name.as_ref()) {
            let name = raw.trim();
            if name.is_empty() {
                v.reject("name", "Category name cannot be empty");
            } else {
                v.max_chars(
                    "name",
                    name,
                    MAX_NAME_CHARS,
                    "Category name must be 100 characters or fewer",
                );
                changes.push(CategoryChange::Name(name.to_string()));
            }
        }

        if let Some(raw) = v.text("description", self.description.as_ref()) {
            let description = raw.trim();
            v.max_chars(
                "description",
                description,
                MAX_DESCRIPTION_CHARS,
                "Description must be 500 characters or fewer",
            );
            changes.push(CategoryChange::Description(description.to_string()));
        }

        v.finish()?;
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_and_defaults_description() {
        let valid = CreateCategory {
            name: Some("  Tools  ".into()),
            description: None,
        }
        .validate()
        .unwrap();
        assert_eq!(valid.name, "Tools");
        assert_eq!(valid.description, "");
    }

    #[test]
    fn create_reports_all_fields() {
        let err = CreateCategory {
            name: Some("x".repeat(101).into()),
            description: Some("y".repeat(501).into()),
        }
        .validate()
        .unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description"]);

        let err = CreateCategory::default().validate().unwrap_err();
        assert_eq!(err.details()[0].message, "Category name is required");
    }

    #[test]
    fn wrong_types_are_reported_with_other_fields() {
        let err = CreateCategory {
            name: Some(Value::from(42)),
            description: Some("y".repeat(501).into()),
        }
        .validate()
        .unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description"]);
        assert_eq!(err.details()[0].message, "name must be a string");

        let err = UpdateCategory {
            name: Some(Value::Bool(true)),
            description: Some(" fine ".into()),
        }
        .into_changes()
        .unwrap_err();
        assert_eq!(err.details().len(), 1);
        assert_eq!(err.details()[0].field, "name");
    }

    #[test]
    fn update_only_lists_present_fields() {
        let changes = UpdateCategory {
            name: None,
            description: Some(" new ".into()),
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes, vec![CategoryChange::Description("new".into())]);
    }

    #[test]
    fn update_rejects_blank_name() {
        let err = UpdateCategory {
            name: Some("   ".into()),
            description: None,
        }
        .into_changes()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.details()[0].message, "Category name cannot be empty");
    }

    #[test]
    fn apply_touches_updated_at() {
        let created = Utc::now();
        let mut category = Category::new(UserId::new(), "Tools".into(), String::new(), created);
        let later = created + chrono::Duration::seconds(5);
        category.apply(CategoryChange::Name("Hardware".into()), later);

        assert_eq!(category.name, "Hardware");
        assert_eq!(category.created_at, created);
        assert_eq!(category.updated_at, later);
    }
}
