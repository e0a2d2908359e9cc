//! Cell-migration trajectory analysis.
//!
//! Samples of tracked cell positions are cleaned ([`preprocess`]), turned into
//! per-track kinematics ([`kinematics`]) and summarised per condition by one of the
//! [`analysis`] routines. The [`statistics`] engine compares per-cell metrics across
//! conditions. [`pipeline::run`] dispatches a selection over a batch of samples.
pub mod aggregation;
pub mod analysis;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod display;
pub mod kinematics;
pub mod motility_errors;
pub mod pipeline;
pub mod preprocess;
#[cfg(feature = "progress")]
pub mod progress;
pub mod sample;
pub mod statistics;
pub mod track;
