//! CLI infrastructure for the foraging simulation
//!
//! This module provides the command-line interface for running populations,
//! inspecting scent fields, and managing learned value files.

pub mod commands;
pub mod output;
