//! Shop update handlers
//!
//! `schema` wires commands, plain messages and inline-button callbacks into
//! one dptree; every branch registers the sender before doing anything else.

mod callbacks;
mod commands;
mod schema;
mod types;

pub use schema::schema;
pub use types::{ensure_user_exists, HandlerDeps, HandlerError, UserInfo};
