//! Helpers shared by unit tests, integration tests and downstream crates.

pub mod testing;
