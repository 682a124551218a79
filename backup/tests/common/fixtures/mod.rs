#[cfg(unix)]
pub mod fake_tools;
pub mod mock_disk;

#[cfg(unix)]
pub use fake_tools::{FakeTools, TestEnv};
pub use mock_disk::MockDisk;
