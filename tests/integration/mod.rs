//! Integration test suite for git-variables
//!
//! End-to-end tests against real git repositories created in temporary
//! directories. They require a `git` executable on `PATH`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **provider**: every catalog query against real repositories
//! - **host_flow**: placeholder population and export through a host
//! - **cli**: the `gitvars` binary

mod cli;
mod host_flow;
mod provider;
