// ABOUTME: Library root for bbl - exposes the orchestration modules for the binary and tests.
// ABOUTME: The main binary is in main.rs.

pub mod bosh;
pub mod cloudconfig;
pub mod commands;
pub mod config;
pub mod envid;
pub mod error;
pub mod storage;
pub mod terraform;
pub mod types;
