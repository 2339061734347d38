use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::debug;
use uuid::Uuid;

use stockroom_auth::{CredentialStore, Role, User, UserDraft, resolve_role};
use stockroom_core::{StoreError, UserId};

use super::{Db, decode_error};

/// `users` table; the email column carries the unique index.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    db: Db,
}

impl PostgresUserStore {
    pub(super) fn new(db: Db) -> Self {
        Self { db }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse::<Role>().map_err(decode_error)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl CredentialStore for PostgresUserStore {
    fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError> {
        self.db.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, email, password_hash, role, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(normalized_email)
            .fetch_optional(&self.db.pool)
            .await?;
            row.as_ref().map(user_from_row).transpose()
        })
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.db.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, email, password_hash, role, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(id))
            .fetch_optional(&self.db.pool)
            .await?;
            row.as_ref().map(user_from_row).transpose()
        })
    }

    /// The table lock serializes registrations, so the "any admin yet?"
    /// read and the insert cannot interleave with another registration.
    fn insert(&self, draft: UserDraft) -> Result<User, StoreError> {
        self.db.run(async {
            let mut tx = self.db.pool.begin().await?;

            sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;
            let admin_exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin')")
                    .fetch_one(&mut *tx)
                    .await?;

            let role = resolve_role(draft.requested_role, admin_exists);
            let user = draft.into_user(role);

            sqlx::query(
                r#"
                INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::from(user.id))
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            debug!(user_id = %user.id, role = %role, "user inserted");
            Ok::<_, sqlx::Error>(user)
        })
    }
}
