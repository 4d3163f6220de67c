//! Lifecycle events and the commands that raise them.

use std::fmt;
use std::str::FromStr;

use crate::core::GitVarsError;

/// Named points in the host's pipeline at which plugins run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// `before:print:print`
    BeforePrint,
    /// `after:package:initialize`
    AfterPackageInitialize,
    /// `before:offline:start`
    BeforeOfflineStart,
    /// `before:offline:start:init`
    BeforeOfflineStartInit,
}

impl LifecycleEvent {
    pub const ALL: [Self; 4] = [
        Self::BeforePrint,
        Self::AfterPackageInitialize,
        Self::BeforeOfflineStart,
        Self::BeforeOfflineStartInit,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforePrint => "before:print:print",
            Self::AfterPackageInitialize => "after:package:initialize",
            Self::BeforeOfflineStart => "before:offline:start",
            Self::BeforeOfflineStartInit => "before:offline:start:init",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = GitVarsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|event| event.as_str() == s).ok_or_else(|| {
            GitVarsError::ConfigError {
                message: format!("Unknown lifecycle event '{s}'"),
            }
        })
    }
}

/// Host commands and the events each one raises after population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Print,
    Package,
    Offline,
}

impl HostCommand {
    /// Events raised, in order.
    pub const fn events(self) -> &'static [LifecycleEvent] {
        match self {
            Self::Print => &[LifecycleEvent::BeforePrint],
            Self::Package => &[LifecycleEvent::AfterPackageInitialize],
            Self::Offline => {
                &[LifecycleEvent::BeforeOfflineStartInit, LifecycleEvent::BeforeOfflineStart]
            }
        }
    }
}
