//! Remote code-review service and contact delivery integrations.

pub mod client;
pub mod contact;
pub mod errors;
