//! Config module tests
//!
//! Contains test suites for file-level configuration handling:
//! - Key/value store parsing, typed access and writing
//! - ConfigManager backups
//! - Transactions (commit / rollback)
//! - Settings projection into retroarch.cfg

mod store_tests;
