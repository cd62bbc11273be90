//! `catalog-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, IssuedToken, JwtError, JwtValidator};
pub use password::{MIN_PASSWORD_LEN, PasswordHash};
pub use permissions::{Permission, permissions_for_roles};
pub use principal::PrincipalId;
pub use roles::Role;
pub use user::{NewUser, User, UserId, UserPatch, normalize_email};
