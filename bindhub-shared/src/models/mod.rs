/// Database models
///
/// Each model owns its table's CRUD operations as associated functions taking
/// a `&PgPool`. Queries are runtime-checked (`query_as`), so no database is
/// needed at build time.
///
/// # Models
///
/// - `account`: tenant credential records (plus `Role` and `BindType`)
/// - `user`: external-identity bindings owned by one account
pub mod account;
pub mod user;
