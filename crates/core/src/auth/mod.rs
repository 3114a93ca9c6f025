//! Password hashing for the account secret field.

mod password;

pub use password::{PasswordError, hash_password};
