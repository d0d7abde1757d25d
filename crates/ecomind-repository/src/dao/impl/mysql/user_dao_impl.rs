//! MySQL implementation of [`UserDao`].

use crate::{dao::UserDao, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecomind_core::{EcoMindError, EcoMindResult, User, UserId};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const SELECT_USER: &str = r#"
    SELECT id, login, email, phone_number, password_hash, provider,
           provider_user_id, co2, auth_token, created_at, updated_at
    FROM users
"#;

/// MySQL user DAO.
#[derive(Clone)]
pub struct MySqlUserDaoImpl {
    pool: Arc<DatabasePool>,
}

impl MySqlUserDaoImpl {
    /// Creates a new MySQL user DAO.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }

    async fn find_one(&self, condition: &str, binds: &[&str]) -> EcoMindResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE {condition} LIMIT 1");
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        let row = query.fetch_optional(self.pool.inner()).await?;
        row.map(User::try_from).transpose()
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: String, // CHAR(36)
    login: String,
    email: Option<String>,
    phone_number: Option<String>,
    password_hash: Option<String>,
    provider: Option<String>,
    provider_user_id: Option<String>,
    co2: Option<f64>,
    auth_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = EcoMindError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| EcoMindError::Internal(format!("Invalid UUID in database: {}", e)))?;

        Ok(User {
            id: UserId::from_uuid(id),
            login: row.login,
            email: row.email.unwrap_or_default(),
            phone_number: row.phone_number.unwrap_or_default(),
            password_hash: row.password_hash,
            provider: row.provider,
            provider_user_id: row.provider_user_id,
            co2: row.co2,
            auth_token: row.auth_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Empty strings are stored as NULL so unique indexes ignore them.
fn nullable(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[async_trait]
impl UserDao for MySqlUserDaoImpl {
    async fn find_by_id(&self, id: UserId) -> EcoMindResult<Option<User>> {
        debug!("Finding user by id: {}", id);
        self.find_one("id = ?", &[&id.to_string()]).await
    }

    async fn find_by_login(&self, login: &str) -> EcoMindResult<Option<User>> {
        debug!("Finding user by login: {}", login);
        self.find_one("login = ?", &[login]).await
    }

    async fn find_by_email(&self, email: &str) -> EcoMindResult<Option<User>> {
        debug!("Finding user by email: {}", email);
        self.find_one("email = ?", &[email]).await
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> EcoMindResult<Option<User>> {
        debug!("Finding user by phone number: {}", phone_number);
        self.find_one("phone_number = ?", &[phone_number]).await
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> EcoMindResult<Option<User>> {
        debug!("Finding user by provider: {}:{}", provider, provider_user_id);
        self.find_one("provider = ? AND provider_user_id = ?", &[provider, provider_user_id])
            .await
    }

    async fn exists_any(&self, login: &str, email: &str, phone_number: &str) -> EcoMindResult<bool> {
        // `col = NULL` is never true, so absent email/phone cannot match.
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE login = ? OR email = ? OR phone_number = ?",
        )
        .bind(login)
        .bind(nullable(email))
        .bind(nullable(phone_number))
        .fetch_one(self.pool.inner())
        .await?;

        Ok(count > 0)
    }

    async fn insert(&self, user: &User) -> EcoMindResult<()> {
        debug!("Inserting user: {}", user.login);

        sqlx::query(
            r#"
            INSERT INTO users (id, login, email, phone_number, password_hash, provider,
                               provider_user_id, co2, auth_token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.login)
        .bind(nullable(&user.email))
        .bind(nullable(&user.phone_number))
        .bind(&user.password_hash)
        .bind(&user.provider)
        .bind(&user.provider_user_id)
        .bind(user.co2)
        .bind(&user.auth_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn update(&self, user: &User) -> EcoMindResult<()> {
        debug!("Updating user: {}", user.id);

        sqlx::query(
            r#"
            UPDATE users
            SET email = ?, phone_number = ?, password_hash = ?, co2 = ?,
                auth_token = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(nullable(&user.email))
        .bind(nullable(&user.phone_number))
        .bind(&user.password_hash)
        .bind(user.co2)
        .bind(&user.auth_token)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()> {
        debug!("Updating auth token for user: {}", id);

        sqlx::query("UPDATE users SET auth_token = ?, updated_at = ? WHERE id = ?")
            .bind(token)
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> EcoMindResult<()> {
        self.pool.health_check().await
    }
}
