/// Authorization policy
///
/// Pure decision functions: given the caller's verified identity (or its
/// absence), the requested operation, and the target resource's owning
/// account, decide allow or deny. No I/O, no side effects; every rule is
/// computable from the single request.
///
/// Rules for account operations, evaluated in order (first match wins):
///
/// 1. No verified identity on a protected operation → [`PolicyError::Unauthenticated`].
/// 2. Listing, creating, or deleting accounts is admin-only.
/// 3. Reading or updating an account other than the caller's own is admin-only.
/// 4. Changing a password: admins may target any account (the old-password
///    check is skipped downstream); members may only target themselves (the
///    old-password check is enforced downstream).
/// 5. An admin may not delete their own account → [`PolicyError::SelfDeleteForbidden`].
///
/// User-entity operations are gated purely by ownership: the target user's
/// owning account must be the caller's account. There is no admin override
/// here: tenant isolation is strict in both directions.
use serde::{Deserialize, Serialize};

use crate::auth::jwt::Claims;
use crate::models::account::Role;

/// Verified caller identity, built from decoded token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Caller's account id
    pub account_id: i64,

    /// Caller's email (token subject)
    pub email: String,

    /// Caller's role
    pub role: Role,
}

impl AuthContext {
    /// Builds a context from verified token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            account_id: claims.account_id,
            email: claims.sub.clone(),
            role: claims.role,
        }
    }
}

/// Account-entity operations subject to policy.
///
/// Targeted variants carry the id of the account being acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    /// List all accounts
    List,
    /// Create a new account
    Create,
    /// Read one account
    Read { target: i64 },
    /// Partially update one account
    Update { target: i64 },
    /// Change one account's password
    ChangePassword { target: i64 },
    /// Delete one account
    Delete { target: i64 },
}

/// Deny reasons produced by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// No verified identity was presented
    #[error("Not authenticated")]
    Unauthenticated,

    /// Valid identity, insufficient privilege
    #[error("Forbidden")]
    Forbidden,

    /// An admin attempted to delete their own account
    #[error("Admins may not delete their own account")]
    SelfDeleteForbidden,
}

/// Decides whether the caller may perform an account-entity operation
pub fn authorize_account(
    caller: Option<&AuthContext>,
    action: AccountAction,
) -> Result<(), PolicyError> {
    let caller = caller.ok_or(PolicyError::Unauthenticated)?;
    let is_admin = caller.role == Role::Admin;

    match action {
        AccountAction::List | AccountAction::Create => {
            if is_admin {
                Ok(())
            } else {
                Err(PolicyError::Forbidden)
            }
        }
        AccountAction::Delete { target } => {
            if !is_admin {
                return Err(PolicyError::Forbidden);
            }
            // Role alone would allow this; the self-delete guard is an
            // additional restriction, not a relaxation.
            if target == caller.account_id {
                return Err(PolicyError::SelfDeleteForbidden);
            }
            Ok(())
        }
        AccountAction::Read { target } | AccountAction::Update { target } => {
            if is_admin || target == caller.account_id {
                Ok(())
            } else {
                Err(PolicyError::Forbidden)
            }
        }
        AccountAction::ChangePassword { target } => {
            if is_admin || target == caller.account_id {
                Ok(())
            } else {
                Err(PolicyError::Forbidden)
            }
        }
    }
}

/// Decides whether the caller may act on a user owned by `owner_account_id`
///
/// Strict per-account ownership with no admin override.
pub fn authorize_user(
    caller: Option<&AuthContext>,
    owner_account_id: i64,
) -> Result<(), PolicyError> {
    let caller = caller.ok_or(PolicyError::Unauthenticated)?;

    if caller.account_id == owner_account_id {
        Ok(())
    } else {
        Err(PolicyError::Forbidden)
    }
}
