//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod genre_repo;
pub mod movie_repo;

pub use genre_repo::GenreRepo;
pub use movie_repo::MovieRepo;
