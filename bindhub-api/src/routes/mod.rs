/// API route handlers
///
/// - `health`: liveness endpoint
/// - `auth`: login (token issuance)
/// - `accounts`: account lifecycle
/// - `users`: user lifecycle (tenant-scoped)
pub mod accounts;
pub mod auth;
pub mod health;
pub mod users;
