pub mod archive;
pub mod commands;
pub mod pg_dump;
pub mod systemctl;
