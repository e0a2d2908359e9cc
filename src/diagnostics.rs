//! # Run diagnostics
//!
//! Non-fatal events raised while analysing samples: excluded tracks, track-count
//! mismatches, undefined error bars, failed fits.
//!
//! Components never log through a process-wide handle. Each entry point receives a
//! `&mut dyn Diagnostics` scoped to the current run, so callers decide where events go:
//!
//! * [`LogDiagnostics`] forwards every event to the [`log`] facade.
//! * [`CollectingDiagnostics`] keeps the events in memory (tests, UI surfaces).
//!
//! ```rust
//! use motility::diagnostics::{CollectingDiagnostics, Diagnostic, Diagnostics};
//!
//! let mut diag = CollectingDiagnostics::default();
//! diag.report(Diagnostic::AnovaFailed { reason: "a group has one member".into() });
//! assert_eq!(diag.events().len(), 1);
//! ```
use std::fmt;

use log::{error, info, warn};

use crate::constants::TrackId;

/// Severity attached to a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single event raised during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The raw sample does not hold the expected number of distinct tracks.
    TrackCountMismatch {
        sample: String,
        expected: usize,
        found: usize,
    },
    /// Tracks excluded because they have fewer than `required_slices` rows.
    MissingTracks {
        sample: String,
        required_slices: usize,
        track_ids: Vec<TrackId>,
    },
    /// A whole sample was skipped; the rest of the batch continues.
    SampleRejected { sample: String, reason: String },
    /// An aggregate was computed from a single value: its SEM is undefined.
    UndefinedSem { label: String, context: String },
    /// The exponential persistence fit failed for one track.
    PersistenceFitFailed {
        condition: String,
        track_id: TrackId,
        reason: String,
    },
    /// One-way ANOVA could not be computed.
    AnovaFailed { reason: String },
    /// Instantaneous speed computed with the legacy elapsed-time formula.
    SpeedFormulaLegacy { sample: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::TrackCountMismatch { .. }
            | Diagnostic::MissingTracks { .. }
            | Diagnostic::UndefinedSem { .. }
            | Diagnostic::PersistenceFitFailed { .. } => Severity::Warning,
            Diagnostic::SampleRejected { .. } | Diagnostic::AnovaFailed { .. } => Severity::Error,
            Diagnostic::SpeedFormulaLegacy { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TrackCountMismatch {
                sample,
                expected,
                found,
            } => write!(f, "{sample}: expected {expected} tracks, found {found}"),
            Diagnostic::MissingTracks {
                sample,
                required_slices,
                track_ids,
            } => write!(
                f,
                "{sample}: following tracks have less than {required_slices} slices: {track_ids:?}"
            ),
            Diagnostic::SampleRejected { sample, reason } => {
                write!(f, "{sample}: sample skipped ({reason})")
            }
            Diagnostic::UndefinedSem { label, context } => {
                write!(f, "{label}: SEM undefined for {context} (single value)")
            }
            Diagnostic::PersistenceFitFailed {
                condition,
                track_id,
                reason,
            } => write!(
                f,
                "{condition}: exponential fit failed for track {track_id} ({reason})"
            ),
            Diagnostic::AnovaFailed { reason } => write!(f, "ANOVA failed: {reason}"),
            Diagnostic::SpeedFormulaLegacy { sample } => write!(
                f,
                "{sample}: instantaneous speed divided by elapsed time since slice 0"
            ),
        }
    }
}

/// Sink for [`Diagnostic`] events.
pub trait Diagnostics {
    fn report(&mut self, event: Diagnostic);
}

/// Forward every event to the `log` facade, at a level matching its [`Severity`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, event: Diagnostic) {
        match event.severity() {
            Severity::Info => info!("{event}"),
            Severity::Warning => warn!("{event}"),
            Severity::Error => error!("{event}"),
        }
    }
}

/// Keep every event in memory, in reporting order.
#[derive(Debug, Default, Clone)]
pub struct CollectingDiagnostics {
    events: Vec<Diagnostic>,
}

impl CollectingDiagnostics {
    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Diagnostic> {
        self.events
    }

    /// Events at or above `severity`.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(move |e| e.severity() >= severity)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&mut self, event: Diagnostic) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_keeps_order_and_filters_by_severity() {
        let mut diag = CollectingDiagnostics::default();
        diag.report(Diagnostic::SpeedFormulaLegacy {
            sample: "ctrl".into(),
        });
        diag.report(Diagnostic::SampleRejected {
            sample: "drug".into(),
            reason: "bad types".into(),
        });

        assert_eq!(diag.events().len(), 2);
        let errors: Vec<_> = diag.at_least(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "drug: sample skipped (bad types)".to_string()
        );
    }

    #[test]
    fn missing_tracks_message_lists_ids() {
        let event = Diagnostic::MissingTracks {
            sample: "s1".into(),
            required_slices: 5,
            track_ids: vec![2, 7],
        };
        assert_eq!(event.severity(), Severity::Warning);
        assert_eq!(
            event.to_string(),
            "s1: following tracks have less than 5 slices: [2, 7]"
        );
    }
}
