use std::fmt;

use spacekiller_core::error::FormationError;

/// Errors surfaced by the simulation engine.
#[derive(Debug)]
pub enum SimError {
    /// A level script asked for an impossible squadron. Fatal.
    Formation(FormationError),
    /// A configuration document could not be parsed.
    Config(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Formation(err) => write!(f, "squadron formation failed: {err}"),
            SimError::Config(err) => write!(f, "invalid simulation config: {err}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Formation(err) => Some(err),
            SimError::Config(err) => Some(err),
        }
    }
}

impl From<FormationError> for SimError {
    fn from(err: FormationError) -> Self {
        SimError::Formation(err)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Config(err)
    }
}
