//! Shared fixtures for the backup integration tests:
//! - a mock remote disk API
//! - fake service manager and dump tools driven by shell scripts

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;

#[cfg(unix)]
pub use fixtures::{FakeTools, TestEnv};
pub use fixtures::MockDisk;
