//! Remote disk storage: quota lookup and capacity-checked uploads

pub mod client;
pub mod types;

pub use client::{remote_path_for, DiskClient};
pub use types::{DiskSpace, UploadLink, UploadReceipt};
