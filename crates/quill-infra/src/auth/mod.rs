//! Authentication implementations.

mod jwt;
mod password;

pub use jwt::{DEFAULT_EXPIRATION_HOURS, JwtConfig, JwtTokenService, MAX_EXPIRATION_HOURS};
pub use password::Argon2PasswordService;
