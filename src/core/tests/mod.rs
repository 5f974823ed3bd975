//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Line parser tests
//! - Multi-value and firmware status tests
//! - Core info parsing and naming rules
