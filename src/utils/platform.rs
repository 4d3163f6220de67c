//! Platform-specific helpers.

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the platform-appropriate Git command name.
///
/// - **Windows**: `git.exe`
/// - **Unix-like**: `git`, resolved through PATH
///
/// This returns the command name, not a full path; the executable must still be
/// on PATH for commands to succeed.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}
