//! Unit tests for the chefboot CLI library
//!
//! These tests use in-memory ports and run fast without external I/O.

mod boot_script_service;
mod config_store;
mod group_cache;
