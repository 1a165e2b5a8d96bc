/// Account model and database operations
///
/// An account is the tenant: it holds the login credential, the role that
/// drives authorization, opaque messaging-channel credentials, and an
/// alternate bind credential used to associate external users.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(50) UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role account_role NOT NULL DEFAULT 'MEMBER',
///     ...
/// );
/// ```
///
/// The `password_hash` column only ever holds an Argon2id PHC string; it is
/// excluded from serialization so it can never leak into a response body.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

/// Account role. Exactly one per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[sqlx(rename = "ADMIN")]
    Admin,
    #[sqlx(rename = "MEMBER")]
    Member,
}

/// How a user proves membership of an account: a verified email address or a
/// shared secret phrase (the bind-word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bind_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BindType {
    Email,
    Secret,
}

/// Account record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,

    /// Login email, unique when present (case-sensitive exact match)
    pub email: Option<String>,

    /// Argon2id PHC string. Never plaintext, never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,

    pub manager_name: Option<String>,
    pub tel: Option<String>,
    pub ext: Option<String>,

    /// Messaging-channel credentials (opaque)
    pub channel_token: Option<String>,
    pub channel_secret: Option<String>,

    /// Alternate binding credential
    pub bind_type: Option<BindType>,
    pub bind_word: Option<String>,

    /// Active flag; inactive accounts cannot log in
    pub status: bool,

    pub created_at: DateTime<Utc>,
    /// Network address of the creating requester
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Network address of the last mutating requester
    pub modified_by: Option<String>,
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, role, manager_name, tel, ext, \
     channel_token, channel_secret, bind_type, bind_word, status, \
     created_at, created_by, updated_at, modified_by";

/// Input for creating a new account
///
/// `password_hash` must already be hashed; the role always defaults to
/// MEMBER and is not settable through creation.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub email: String,
    pub password_hash: String,
    pub manager_name: Option<String>,
    pub tel: Option<String>,
    pub ext: Option<String>,
    pub channel_token: Option<String>,
    pub channel_secret: Option<String>,
    pub bind_type: Option<BindType>,
    pub bind_word: Option<String>,
    pub status: bool,
    pub created_by: Option<String>,
}

/// Partial update. Only `Some` fields are applied; `role` and
/// `password_hash` are structurally absent so they can never be patched
/// through this path.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub manager_name: Option<String>,
    pub tel: Option<String>,
    pub ext: Option<String>,
    pub channel_token: Option<String>,
    pub channel_secret: Option<String>,
    pub bind_type: Option<BindType>,
    pub bind_word: Option<String>,
    pub status: Option<bool>,
}

impl Account {
    /// Inserts a new MEMBER account
    ///
    /// A unique-constraint violation on `email` surfaces as a database error;
    /// callers translate it to a duplicate failure. That constraint, not the
    /// pre-check, is the authoritative guard against concurrent creates.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts
                (email, password_hash, manager_name, tel, ext,
                 channel_token, channel_secret, bind_type, bind_word, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.manager_name)
        .bind(data.tel)
        .bind(data.ext)
        .bind(data.channel_token)
        .bind(data.channel_secret)
        .bind(data.bind_type)
        .bind(data.bind_word)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Looks up an account by email. Exact, case-sensitive match.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
        ))
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update and stamps `modified_by`/`updated_at`
    ///
    /// Returns `None` when the account does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateAccount,
        modified_by: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET clause from whichever fields are present
        let mut query = String::from("UPDATE accounts SET updated_at = NOW(), modified_by = $2");
        let mut bind_count = 2;

        if data.manager_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", manager_name = ${}", bind_count));
        }
        if data.tel.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tel = ${}", bind_count));
        }
        if data.ext.is_some() {
            bind_count += 1;
            query.push_str(&format!(", ext = ${}", bind_count));
        }
        if data.channel_token.is_some() {
            bind_count += 1;
            query.push_str(&format!(", channel_token = ${}", bind_count));
        }
        if data.channel_secret.is_some() {
            bind_count += 1;
            query.push_str(&format!(", channel_secret = ${}", bind_count));
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

        query.push_str(&format!(
            " WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Account>(&query).bind(id).bind(modified_by);

        if let Some(v) = data.manager_name {
            q = q.bind(v);
        }
        if let Some(v) = data.tel {
            q = q.bind(v);
        }
        if let Some(v) = data.ext {
            q = q.bind(v);
        }
        if let Some(v) = data.channel_token {
            q = q.bind(v);
        }
        if let Some(v) = data.channel_secret {
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

        q.fetch_optional(pool).await
    }

    /// Replaces the stored password hash and stamps `modified_by`
    ///
    /// Returns false when the account does not exist.
    pub async fn set_password(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
        modified_by: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW(), modified_by = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(modified_by)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an account. Owned users are removed by the `ON DELETE CASCADE`
    /// foreign key, not re-implemented here.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Idempotent admin bootstrap, run once at startup
    ///
    /// Inserts an ADMIN account with the given credentials if no ADMIN exists
    /// yet. Returns the created account, or `None` when one was already
    /// present.
    pub async fn ensure_admin_exists(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let admins: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = $1")
                .bind(Role::Admin)
                .fetch_one(pool)
                .await?;

        if admins > 0 {
            return Ok(None);
        }

        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts (email, password_hash, role, status, created_by)
            VALUES ($1, $2, $3, TRUE, 'startup')
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(Role::Admin)
        .fetch_one(pool)
        .await?;

        info!(account_id = account.id, "Bootstrapped initial admin account");
        Ok(Some(account))
    }
}
