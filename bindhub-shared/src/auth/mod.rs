/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`password`]: password strength policy plus Argon2id hashing/verification
/// - [`jwt`]: signed, time-limited bearer tokens (HS256)
/// - [`policy`]: pure role/ownership decision functions consulted by every
///   protected operation
///
/// The split mirrors the request path: a bearer token is decoded by [`jwt`]
/// into claims, the claims become an [`policy::AuthContext`], and the policy
/// decides whether the lifecycle operation may run at all. [`password`] is
/// only consulted where credentials are created or checked.
pub mod jwt;
pub mod password;
pub mod policy;
