//! Shared test utilities for pixmeta integration tests.
//!
//! This module provides:
//! - Builder patterns for settings and file records
//! - Scripted analyzer and notifier doubles for driving the queue

pub mod builders;
pub mod doubles;

pub use builders::*;
pub use doubles::*;
