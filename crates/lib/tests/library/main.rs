//! Integration tests for the configuration engine library.

mod common;
mod install_tests;
mod session_tests;
