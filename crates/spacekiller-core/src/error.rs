//! Configuration errors raised while assembling squadron formations.
//!
//! These signal a content-authoring defect (a level script asking for an
//! impossible formation) and are not recoverable at runtime.

use std::fmt;

use crate::enums::MotionKind;

#[derive(Debug, Clone, PartialEq)]
pub enum FormationError {
    /// A fixed-shape formation was given the wrong number of members.
    MemberCount {
        motion: MotionKind,
        expected: usize,
        actual: usize,
    },
    /// A spline formation was given too few control points.
    ControlPoints {
        motion: MotionKind,
        minimum: usize,
        actual: usize,
    },
    /// Velocity must be strictly positive to derive leg durations.
    NonPositiveVelocity { velocity: f32 },
    /// A formation needs at least one member.
    Empty { motion: MotionKind },
}

impl fmt::Display for FormationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationError::MemberCount {
                motion,
                expected,
                actual,
            } => write!(
                f,
                "{motion:?} formation works only with {expected} member(s), got {actual}"
            ),
            FormationError::ControlPoints {
                motion,
                minimum,
                actual,
            } => write!(
                f,
                "{motion:?} formation needs at least {minimum} control points, got {actual}"
            ),
            FormationError::NonPositiveVelocity { velocity } => {
                write!(f, "formation velocity must be positive, got {velocity}")
            }
            FormationError::Empty { motion } => {
                write!(f, "{motion:?} formation has no members")
            }
        }
    }
}

impl std::error::Error for FormationError {}
