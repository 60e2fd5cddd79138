//! `stocklookup-auth`: authentication, sessions and the role policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: credential
//! checks go through the `UserDirectory` contract, and sessions are plain
//! values carried in signed tokens.

pub mod authenticate;
pub mod authorize;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod token;
pub mod user;

pub use authenticate::{AuthError, DirectoryError, UserDirectory, authenticate, change_password};
pub use authorize::{AuthzError, authorize};
pub use permissions::Permission;
pub use roles::Role;
pub use session::{Session, SessionError};
pub use token::{Hs256JwtCodec, JwtCodec};
pub use user::User;
