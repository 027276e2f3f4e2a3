//! Helpers shared by unit tests, integration tests and doctests.
pub mod support;
