//! Identity primitives: signed credentials, password hashes and the
//! allow/deny policy produced for each guarded request.

mod password;
mod policy;
mod token;

pub use password::{hash_password, verify_password};
pub use policy::{AccessPolicy, Effect, Identity, UNAUTHORIZED_PRINCIPAL};
pub use token::{Claims, DEFAULT_ROLE, TokenSigner};
