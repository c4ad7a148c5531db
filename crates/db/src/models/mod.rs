//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` input DTO for inserts
//! - A `Deserialize` patch DTO (all `Option` fields) for partial updates

pub mod genre;
pub mod movie;
