//! Core types and definitions for the SPACE KILLER simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, motion paths, commands, state snapshots, events, errors
//! and constants. It has no dependency on any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod path;
pub mod state;
pub mod types;
