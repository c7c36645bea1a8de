//! Everything related to the [gitlab REST API](https://docs.gitlab.com/api/rest/)

pub mod branch;
pub mod connection;
pub mod pagination;
pub mod project;

pub use connection::Connection;
pub use pagination::{Interruption, Listing};
pub use project::Project;
