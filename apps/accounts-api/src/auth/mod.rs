//! Authentication: password hashing, session tokens, request extraction

pub mod extract;
pub mod password;
pub mod token;

pub use extract::CurrentAccount;
pub use password::{hash_password, validate_email, verify_password};
pub use token::{extract_bearer_token, generate_session_token, validate_session_token};
