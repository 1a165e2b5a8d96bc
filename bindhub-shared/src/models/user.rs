/// User model and database operations
///
/// A user binds one external messaging-platform identity (`line_user_id`) to
/// exactly one owning account. The `(account_id, line_user_id)` pair is
/// unique, and every query here is scoped to the owning account: a lookup
/// with the wrong account simply misses, so cross-tenant rows are
/// indistinguishable from absent ones.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::account::BindType;

/// Binding state of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Bound,
    Unbound,
    Inactive,
}

/// User record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Owning account (FK, cascade on account deletion)
    pub account_id: i64,

    /// External messaging-platform user id
    pub line_user_id: String,

    pub user_code: Option<String>,
    pub user_name: Option<String>,

    pub bind_type: Option<BindType>,
    pub bind_word: Option<String>,

    pub status: UserStatus,
    pub bind_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
}

const USER_COLUMNS: &str = "id, account_id, line_user_id, user_code, user_name, \
     bind_type, bind_word, status, bind_date, \
     created_at, created_by, updated_at, modified_by";

/// Input for creating a new user binding
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub account_id: i64,
    pub line_user_id: String,
    pub user_code: Option<String>,
    pub user_name: Option<String>,
    pub bind_type: Option<BindType>,
    pub bind_word: Option<String>,
    pub created_by: Option<String>,
}

/// Partial update; only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub user_code: Option<String>,
    pub user_name: Option<String>,
    pub bind_type: Option<BindType>,
    pub bind_word: Option<String>,
    pub status: Option<UserStatus>,
    pub bind_date: Option<DateTime<Utc>>,
}

impl User {
    /// Inserts a new user binding
    ///
    /// The unique constraint on `(account_id, line_user_id)` is the
    /// authoritative duplicate guard; a violation surfaces as a database
    /// error for the caller to translate.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (account_id, line_user_id, user_code, user_name,
                 bind_type, bind_word, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.account_id)
        .bind(data.line_user_id)
        .bind(data.user_code)
        .bind(data.user_name)
        .bind(data.bind_type)
        .bind(data.bind_word)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Looks up a user by its unique binding pair
    pub async fn find_by_binding(
        pool: &PgPool,
        account_id: i64,
        line_user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = $1 AND line_user_id = $2"
        ))
        .bind(account_id)
        .bind(line_user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the users owned by one account, never anything cross-tenant
    pub async fn list_by_account(
        pool: &PgPool,
        account_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = $1 ORDER BY id"
        ))
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    /// Fetches a user only if it belongs to `account_id`
    ///
    /// A miss means "absent or not yours"; the two cases are deliberately
    /// not distinguished.
    pub async fn find_owned(
        pool: &PgPool,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND account_id = $2"
        ))
        .bind(id)
        .bind(account_id)
        .fetch_optional(pool)
        .await
    }

    /// Applies a partial update to an owned row, stamping `modified_by`
    pub async fn update_owned(
        pool: &PgPool,
        id: i64,
        account_id: i64,
        data: UpdateUser,
        modified_by: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW(), modified_by = $3");
        let mut bind_count = 3;

        if data.user_code.is_some() {
            bind_count += 1;
            query.push_str(&format!(", user_code = ${}", bind_count));
        }
        if data.user_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", user_name = ${}", bind_count));
        }
        if data.bind_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bind_type = ${}", bind_count));
        }
        if data.bind_word.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bind_word = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.bind_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bind_date = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND account_id = $2 RETURNING {USER_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(account_id)
            .bind(modified_by);

        if let Some(v) = data.user_code {
            q = q.bind(v);
        }
        if let Some(v) = data.user_name {
            q = q.bind(v);
        }
        if let Some(v) = data.bind_type {
            q = q.bind(v);
        }
        if let Some(v) = data.bind_word {
            q = q.bind(v);
        }
        if let Some(v) = data.status {
            q = q.bind(v);
        }
        if let Some(v) = data.bind_date {
            q = q.bind(v);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a user only if it belongs to `account_id`
    pub async fn delete_owned(
        pool: &PgPool,
        id: i64,
        account_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
