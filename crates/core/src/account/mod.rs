//! Account records and the store service.
//!
//! The full [`Account`] record carries the secret field and never crosses an
//! external boundary; every store operation returns the [`AccountView`]
//! projection instead.

mod error;
mod store;
mod types;

pub use error::AccountError;
pub use store::{AccountRepository, AccountStore};
pub use types::{Account, AccountPatch, AccountView, CreateAccountInput, NewAccount};
