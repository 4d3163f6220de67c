//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - Repository discovery and atomic file writes
//! - [`platform`] - Platform-specific helpers such as the git executable name

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, find_repo_root};
pub use platform::{get_git_command, is_windows};
