//! Neural-network building blocks assembled from graph operations.

pub mod dense;
pub mod init;

pub use dense::Dense;
pub use init::{initialize_, Initialization};
