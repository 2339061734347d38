use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use stockroom_catalog::{Product, ProductFilter, ProductRepository};
use stockroom_core::{CategoryId, ProductId, StoreError, UserId};

use super::{Db, decode_error, scope_owner};

/// `scope AND category AND search AND price`, bound as `$1..$5` by [`bind_filter`].
/// The search term arrives lowercased and is matched literally.
const FILTER: &str = r#"
    ($1::uuid IS NULL OR owner_id = $1)
    AND ($2::uuid IS NULL OR category_id = $2)
    AND ($3::text IS NULL
         OR strpos(lower(name), $3) > 0
         OR strpos(lower(description), $3) > 0)
    AND ($4::float8 IS NULL OR price >= $4)
    AND ($5::float8 IS NULL OR price <= $5)
"#;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn bind_filter<'q>(query: PgQuery<'q>, filter: &ProductFilter) -> PgQuery<'q> {
    query
        .bind(scope_owner(&filter.scope))
        .bind(filter.category.map(Uuid::from))
        .bind(filter.search.as_ref().map(|search| search.term().to_string()))
        .bind(filter.price.min)
        .bind(filter.price.max)
}

/// `products` table.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    db: Db,
}

impl PostgresProductStore {
    pub(super) fn new(db: Db) -> Self {
        Self { db }
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    let quantity: i64 = row.try_get("quantity")?;
    let category_id: Option<Uuid> = row.try_get("category_id")?;
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        quantity: u64::try_from(quantity)
            .map_err(|_| decode_error(format!("negative quantity {quantity}")))?,
        category_id: category_id.map(CategoryId::from_uuid),
        owner_id: UserId::from_uuid(row.try_get("owner_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn quantity_column(quantity: u64) -> Result<i64, StoreError> {
    i64::try_from(quantity)
        .map_err(|_| StoreError::Unavailable(format!("quantity {quantity} does not fit the column")))
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl ProductRepository for PostgresProductStore {
    fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let quantity = quantity_column(product.quantity)?;
        self.db.run(async {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, name, description, price, quantity,
                    category_id, owner_id, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(Uuid::from(product.id))
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(quantity)
            .bind(product.category_id.map(Uuid::from))
            .bind(Uuid::from(product.owner_id))
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.db.pool)
            .await?;
            Ok::<_, sqlx::Error>(())
        })?;
        Ok(product)
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.db.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, description, price, quantity,
                       category_id, owner_id, created_at, updated_at
                FROM products
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(id))
            .fetch_optional(&self.db.pool)
            .await?;
            row.as_ref().map(product_from_row).transpose()
        })
    }

    fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
        let quantity = quantity_column(product.quantity)?;
        let updated = self.db.run(async {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET name = $2, description = $3, price = $4, quantity = $5,
                    category_id = $6, updated_at = $7
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(product.id))
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(quantity)
            .bind(product.category_id.map(Uuid::from))
            .bind(product.updated_at)
            .execute(&self.db.pool)
            .await?;
            Ok::<_, sqlx::Error>(result.rows_affected() > 0)
        })?;
        Ok(updated.then_some(product))
    }

    fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        self.db.run(async {
            let result = sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&self.db.pool)
                .await?;
            Ok::<_, sqlx::Error>(result.rows_affected() > 0)
        })
    }

    fn find(&self, filter: &ProductFilter, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            r#"
            SELECT id, name, description, price, quantity,
                   category_id, owner_id, created_at, updated_at
            FROM products
            WHERE {FILTER}
            ORDER BY seq DESC
            OFFSET $6 LIMIT $7
            "#
        );
        self.db.run(async {
            let rows = bind_filter(sqlx::query(&sql), filter)
                .bind(to_i64(skip))
                .bind(to_i64(limit))
                .fetch_all(&self.db.pool)
                .await?;
            rows.iter().map(product_from_row).collect::<Result<Vec<_>, _>>()
        })
    }

    fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM products WHERE {FILTER}");
        let total = self.db.run(async {
            let row = bind_filter(sqlx::query(&sql), filter)
                .fetch_one(&self.db.pool)
                .await?;
            row.try_get::<i64, _>(0)
        })?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    fn count_by_category(&self, category: CategoryId) -> Result<u64, StoreError> {
        let total = self.db.run(async {
            let row = sqlx::query("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(Uuid::from(category))
                .fetch_one(&self.db.pool)
                .await?;
            row.try_get::<i64, _>(0)
        })?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}
