//! Deterministic, pure logic shared by the batch driver.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod accountant;
pub mod exclusion;
pub mod manifest;
pub mod template;
pub mod types;
