pub mod course;
pub mod credentials;
pub mod learning;
pub mod transaction;

pub use credentials::{CredentialStore, PgCredentialStore};
pub use transaction::*;
