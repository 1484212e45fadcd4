//! Request extractors.

pub mod identity;
pub mod json;

pub use identity::{Identity, Role, USER_ID_HEADER, USER_ROLE_HEADER};
pub use json::ValidJson;
