//! Motion path generation for SPACE KILLER squadrons.
//!
//! Samples parametric curves and lays out formation members, producing one
//! `MotionPath` per member. Pure functions over plain data; no ECS access.

pub mod curves;
pub mod formation;

pub use spacekiller_core as core;
