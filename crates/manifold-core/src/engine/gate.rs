use super::config::GatePolicy;
use super::error::EngineError;
use crate::core::coverage::CoverageReport;
use crate::core::models::store::PdRecordStore;
use tracing::{info, warn};

/// Result of validating a store against the gate policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Too few anchors to run belief propagation at all.
    Blocked {
        anchor_count: usize,
        min_anchors: usize,
    },
    /// Enough anchors, but some clusters would be dropped from propagation.
    WarnConfirm(CoverageReport),
    /// Coverage satisfies the policy.
    Ready(CoverageReport),
}

/// Validates a store against a policy without touching either.
pub fn evaluate(store: &PdRecordStore, policy: &GatePolicy) -> Verdict {
    let report = store.coverage();
    if report.anchor_count < policy.min_anchors {
        return Verdict::Blocked {
            anchor_count: report.anchor_count,
            min_anchors: policy.min_anchors,
        };
    }
    if report.is_complete() || report.fraction() >= policy.required_coverage {
        Verdict::Ready(report)
    } else {
        Verdict::WarnConfirm(report)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Editing,
    Validating,
    Blocked {
        anchor_count: usize,
        min_anchors: usize,
    },
    WarnConfirm(CoverageReport),
    Ready {
        report: CoverageReport,
        /// Whether the user accepted incomplete coverage to get here.
        confirmed: bool,
    },
}

impl GateState {
    pub fn name(&self) -> &'static str {
        match self {
            GateState::Editing => "editing",
            GateState::Validating => "validating",
            GateState::Blocked { .. } => "blocked",
            GateState::WarnConfirm(_) => "awaiting confirmation",
            GateState::Ready { .. } => "ready",
        }
    }
}

/// The finalize gate: `Editing -> Validating -> {Blocked, WarnConfirm, Ready}`.
///
/// `Blocked` and a declined `WarnConfirm` return to `Editing` with no side effects.
/// `Ready` is the only state from which the store may be persisted and handed to
/// belief propagation.
#[derive(Debug, Clone)]
pub struct FinalizeGate {
    policy: GatePolicy,
    state: GateState,
}

impl FinalizeGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            state: GateState::Editing,
        }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Starts a finalize attempt for the given store.
    pub fn finalize(&mut self, store: &PdRecordStore) -> Result<&GateState, EngineError> {
        if self.state != GateState::Editing {
            return Err(self.invalid("finalize"));
        }

        self.state = GateState::Validating;
        self.state = match evaluate(store, &self.policy) {
            Verdict::Blocked {
                anchor_count,
                min_anchors,
            } => {
                warn!(
                    "Finalize blocked: {} anchor(s) selected, at least {} required.",
                    anchor_count, min_anchors
                );
                GateState::Blocked {
                    anchor_count,
                    min_anchors,
                }
            }
            Verdict::WarnConfirm(report) => {
                warn!(
                    "Only {} of {} connected components hold an anchor; {} would be ignored during belief propagation.",
                    report.covered_count(),
                    report.total_count(),
                    report.uncovered_count()
                );
                GateState::WarnConfirm(report)
            }
            Verdict::Ready(report) => {
                info!(
                    "All required connected components are anchored ({} of {}).",
                    report.covered_count(),
                    report.total_count()
                );
                GateState::Ready {
                    report,
                    confirmed: false,
                }
            }
        };
        Ok(&self.state)
    }

    /// Accepts incomplete coverage and moves to `Ready`.
    pub fn confirm(&mut self) -> Result<&GateState, EngineError> {
        let GateState::WarnConfirm(report) = &self.state else {
            return Err(self.invalid("confirm"));
        };
        let report = report.clone();
        info!("User accepted incomplete anchor coverage.");
        self.state = GateState::Ready {
            report,
            confirmed: true,
        };
        Ok(&self.state)
    }

    /// Rejects incomplete coverage and returns to editing.
    pub fn decline(&mut self) -> Result<(), EngineError> {
        if !matches!(self.state, GateState::WarnConfirm(_)) {
            return Err(self.invalid("decline"));
        }
        self.state = GateState::Editing;
        Ok(())
    }

    /// Dismisses a blocked attempt and returns to editing.
    pub fn acknowledge(&mut self) -> Result<(), EngineError> {
        if !matches!(self.state, GateState::Blocked { .. }) {
            return Err(self.invalid("acknowledge"));
        }
        self.state = GateState::Editing;
        Ok(())
    }

    /// Takes the coverage report of a `Ready` gate for persistence, returning to editing.
    pub fn take_ready(&mut self) -> Result<(CoverageReport, bool), EngineError> {
        match std::mem::replace(&mut self.state, GateState::Editing) {
            GateState::Ready { report, confirmed } => Ok((report, confirmed)),
            other => {
                self.state = other;
                Err(self.invalid("persist"))
            }
        }
    }

    fn invalid(&self, action: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}
