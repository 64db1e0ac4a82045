//! Authentication and session gating.
//!
//! A user logs in with `login` and `password` and receives an opaque session token. A token
//! authorizes requests only while it is its owner's most recently issued token: each login
//! silently supersedes every earlier session of the same user. There is no logout and no
//! expiry.
//!
//! # Modules
//!
//! - [`password`]: Pluggable credential hashing (MD5 hex, SHA-256 hex, Argon2id)
//! - [`authenticator`]: Login, credentials to session token
//! - [`session`]: Token validation, session token to owner
//! - [`current_user`]: Bearer token extraction for handlers
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use assetgate::auth::current_user::AuthenticatedOwner;
//!
//! async fn protected_handler(AuthenticatedOwner(owner): AuthenticatedOwner) -> String {
//!     format!("Hello, user {owner}!")
//! }
//! ```

pub mod authenticator;
pub mod current_user;
pub mod password;
pub mod session;
