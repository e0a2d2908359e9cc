//! # Constants and type definitions for motility
//!
//! Shared identifiers, input column names and the fixed parameters of the
//! statistical layer.
//!
//! ## Overview
//!
//! - Type aliases for track and slice identifiers
//! - Header names expected in raw trajectory tables
//! - Fixed constants used by [`crate::statistics`] (significance level, lag windows, rounding)

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Identifier of one tracked cell inside a sample.
pub type TrackId = i64;

/// Discrete frame index inside a track.
pub type SliceIndex = i64;

// -------------------------------------------------------------------------------------------------
// Raw table schema
// -------------------------------------------------------------------------------------------------

/// Header of the track identifier column.
pub const COL_TRACK: &str = "Track n";

/// Header of the slice (frame) index column.
pub const COL_SLICE: &str = "Slice n";

/// Header of the x coordinate column.
pub const COL_X: &str = "X";

/// Header of the y coordinate column.
pub const COL_Y: &str = "Y";

// -------------------------------------------------------------------------------------------------
// Statistics
// -------------------------------------------------------------------------------------------------

/// Threshold below which an omnibus or post-hoc p-value is significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Number of decimals kept in the pairwise p-value matrix.
pub const P_VALUE_DECIMALS: i32 = 4;

/// Largest lag used to build the per-track persistence curve before the exponential fit.
pub const PERSISTENCE_FIT_MAX_LAG: usize = 9;

/// Largest lag averaged into the per-track MSD scalar.
pub const CELL_MSD_MAX_LAG: usize = 2;

/// Initial guess of the decay rate for the persistence fit.
pub const PERSISTENCE_FIT_ALPHA0: f64 = 0.01;

/// Sample size at or below which the Mann–Whitney test uses the exact null distribution.
pub const MANN_WHITNEY_EXACT_MAX_N: usize = 8;

/// Numerical epsilon used for floating-point comparisons in tests and fits.
pub const EPS: f64 = 1e-9;
