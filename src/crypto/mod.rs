pub mod password;
pub mod token;

pub use password::{generate_salt, hash_password, password_signature, verify_password};
pub use token::{issue_token, verify_token, Claims};
