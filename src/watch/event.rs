// src/watch/event.rs

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use notify::event::{EventKind, ModifyKind};

/// Normalised kind of a filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    Create,
    Write,
    Remove,
    Rename,
    PermissionChange,
}

impl FileEventKind {
    /// Map a raw notify kind. Kinds with no counterpart (access, `Any`,
    /// `Other`) yield `None` and are dropped by the monitor.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(Self::PermissionChange),
            EventKind::Modify(_) => Some(Self::Write),
            EventKind::Remove(_) => Some(Self::Remove),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }

    /// Kinds that cause the watched command to re-run.
    pub fn is_trigger(self) -> bool {
        matches!(self, Self::Create | Self::Write | Self::Remove)
    }
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Write => "write",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::PermissionChange => "chmod",
        };
        f.write_str(s)
    }
}

/// One qualifying filesystem change, handed to every registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
    pub timestamp: SystemTime,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, kind: FileEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
            timestamp: SystemTime::now(),
        }
    }
}
