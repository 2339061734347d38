use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use stockroom_auth::OwnerScope;
use stockroom_catalog::{Category, CategoryRepository};
use stockroom_core::{CategoryId, StoreError, UserId};

use super::{Db, scope_owner};

/// `categories` table with a unique `(owner_id, name)` constraint.
#[derive(Debug, Clone)]
pub struct PostgresCategoryStore {
    db: Db,
}

impl PostgresCategoryStore {
    pub(super) fn new(db: Db) -> Self {
        Self { db }
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        owner_id: UserId::from_uuid(row.try_get("owner_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl CategoryRepository for PostgresCategoryStore {
    fn insert(&self, category: Category) -> Result<Category, StoreError> {
        self.db.run(async {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name, description, owner_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::from(category.id))
            .bind(&category.name)
            .bind(&category.description)
            .bind(Uuid::from(category.owner_id))
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&self.db.pool)
            .await?;
            Ok::<_, sqlx::Error>(())
        })?;
        Ok(category)
    }

    fn get(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        self.db.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, description, owner_id, created_at, updated_at
                FROM categories
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(id))
            .fetch_optional(&self.db.pool)
            .await?;
            row.as_ref().map(category_from_row).transpose()
        })
    }

    fn find_by_name(&self, owner: UserId, name: &str) -> Result<Option<Category>, StoreError> {
        self.db.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, description, owner_id, created_at, updated_at
                FROM categories
                WHERE owner_id = $1 AND name = $2
                "#,
            )
            .bind(Uuid::from(owner))
            .bind(name)
            .fetch_optional(&self.db.pool)
            .await?;
            row.as_ref().map(category_from_row).transpose()
        })
    }

    fn list(&self, scope: &OwnerScope) -> Result<Vec<Category>, StoreError> {
        self.db.run(async {
            let rows = sqlx::query(
                r#"
                SELECT id, name, description, owner_id, created_at, updated_at
                FROM categories
                WHERE ($1::uuid IS NULL OR owner_id = $1)
                ORDER BY seq DESC
                "#,
            )
            .bind(scope_owner(scope))
            .fetch_all(&self.db.pool)
            .await?;
            rows.iter().map(category_from_row).collect::<Result<Vec<_>, _>>()
        })
    }

    fn update(&self, category: Category) -> Result<Option<Category>, StoreError> {
        let updated = self.db.run(async {
            let result = sqlx::query(
                r#"
                UPDATE categories
                SET name = $2, description = $3, updated_at = $4
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(category.id))
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.updated_at)
            .execute(&self.db.pool)
            .await?;
            Ok::<_, sqlx::Error>(result.rows_affected() > 0)
        })?;
        Ok(updated.then_some(category))
    }

    fn delete(&self, id: CategoryId) -> Result<bool, StoreError> {
        self.db.run(async {
            let result = sqlx::query("DELETE FROM categories WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&self.db.pool)
                .await?;
            Ok::<_, sqlx::Error>(result.rows_affected() > 0)
        })
    }
}
