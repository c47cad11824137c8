mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{UserClaims, generate_token, process_token};
mod token;
pub use token::generate_reset_token;
mod error;
pub use error::{CryptError, CryptResult};
