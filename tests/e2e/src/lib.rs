//! End-to-end test support for the grind engine
//!
//! - [`harness`]: isolated temporary databases per test
//! - [`mocks`]: fixtures seeding realistic practice histories


pub use harness::TestEnv;
