//! Setup-time configuration errors
//!
//! The running simulation has no failure modes; everything that can go wrong
//! is caught when settings are loaded or a game is constructed.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    /// Debug overlays are visual and need somewhere to draw
    DebugModeWithoutSurface,
    /// Arena dimensions must be positive and finite
    InvalidArena { width: f32, height: f32 },
    /// A tuning value is outside its legal range
    InvalidTuning {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
    /// Settings file could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Settings file is not valid settings JSON
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DebugModeWithoutSurface => write!(
                f,
                "debug mode requires a rendering surface; debug information is visual"
            ),
            Self::InvalidArena { width, height } => {
                write!(f, "invalid arena size {width}x{height}: both sides must be positive")
            }
            Self::InvalidTuning {
                name,
                value,
                reason,
            } => write!(f, "invalid tuning value {name} = {value}: {reason}"),
            Self::Io { path, source } => {
                write!(f, "failed to read settings from {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse settings in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
