//! Pure domain logic for the movie catalog.
//!
//! Nothing in this crate touches the database or HTTP; the `db` and `api`
//! crates build on these types.

pub mod error;
pub mod filters;
pub mod runtime;
pub mod search;
pub mod types;
pub mod validator;
