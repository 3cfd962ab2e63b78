//! Authentication infrastructure module
//!
//! Stateless session tokens for signed-in users.

mod jwt;

pub use jwt::{IssuedToken, JwtClaims, JwtConfig, JwtGenerator, JwtService};
