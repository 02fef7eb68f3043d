//! Integration tests for critstore-lib through its public API.

mod accessor_tests;
mod persistence_tests;
