//! Credential layer - password hashing and JWT issuance/verification.

#![allow(missing_docs)]

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService, TokenKind, TokenPair};
pub use password::PasswordService;
