//! Presentation state for one capture/detection screen
//!
//! `Idle -> Captured -> Analyzing -> Done`, with `reset` back to `Idle`
//! from `Captured` and `Done`. A transport failure sends `Analyzing` back
//! to `Captured` so the same image can be resubmitted; every normalized
//! result (including `NoDetection` and `Failure`) lands in `Done`.
//!
//! The state carries an epoch that changes on reset and close. Responses
//! are applied through an [`AnalysisTicket`]; a ticket from an older epoch
//! is discarded.

use chrono::Utc;

use crate::domain::models::{AcceptedDetection, DetectionResult, ImageDescriptor};
use crate::shared::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Captured,
    Analyzing,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Captured => "captured",
            Phase::Analyzing => "analyzing",
            Phase::Done => "done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof that an analysis was started in a given epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    epoch: u64,
}

impl AnalysisTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// What happened to a response handed to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The screen was reset or closed after the request started
    Stale,
    /// The state was not analyzing
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct PresentationState {
    phase: Phase,
    image: Option<ImageDescriptor>,
    result: Option<DetectionResult>,
    epoch: u64,
}

impl PresentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image(&self) -> Option<&ImageDescriptor> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the trigger button should be enabled
    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Captured
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::Analyzing
    }

    fn transition(&mut self, to: Phase) {
        logging::log_phase_transition(self.phase.as_str(), to.as_str());
        self.phase = to;
    }

    /// Hold a freshly acquired image (`Idle`/`Captured` -> `Captured`)
    pub fn acquire(&mut self, image: ImageDescriptor) -> bool {
        match self.phase {
            Phase::Idle | Phase::Captured => {
                self.image = Some(image);
                self.result = None;
                self.transition(Phase::Captured);
                true
            }
            Phase::Analyzing | Phase::Done => {
                logging::log_invalid_transition(self.phase.as_str(), "acquire");
                false
            }
        }
    }

    /// Start an analysis (`Captured` -> `Analyzing`)
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if self.phase != Phase::Captured {
            logging::log_invalid_transition(self.phase.as_str(), "submit");
            return None;
        }
        self.result = None;
        self.transition(Phase::Analyzing);
        Some(AnalysisTicket { epoch: self.epoch })
    }

    fn check_ticket(&self, ticket: AnalysisTicket, action: &str) -> Applied {
        if ticket.epoch != self.epoch {
            logging::log_stale_result_discarded(ticket.epoch, self.epoch);
            return Applied::Stale;
        }
        if self.phase != Phase::Analyzing {
            logging::log_invalid_transition(self.phase.as_str(), action);
            return Applied::Rejected;
        }
        Applied::Applied
    }

    /// Store a normalized result (`Analyzing` -> `Done`)
    pub fn complete(&mut self, ticket: AnalysisTicket, result: DetectionResult) -> Applied {
        let applied = self.check_ticket(ticket, "complete");
        if applied == Applied::Applied {
            self.result = Some(result);
            self.transition(Phase::Done);
        }
        applied
    }

    /// Revert after a transport failure (`Analyzing` -> `Captured`)
    pub fn transport_failed(&mut self, ticket: AnalysisTicket) -> Applied {
        let applied = self.check_ticket(ticket, "transport_failed");
        if applied == Applied::Applied {
            self.transition(Phase::Captured);
        }
        applied
    }

    /// Explicit user reset (`Captured`/`Done` -> `Idle`)
    pub fn reset(&mut self) -> bool {
        match self.phase {
            Phase::Captured | Phase::Done => {
                self.clear();
                true
            }
            Phase::Idle => true,
            Phase::Analyzing => {
                logging::log_invalid_transition(self.phase.as_str(), "reset");
                false
            }
        }
    }

    /// Screen closed: back to `Idle` from any phase, in-flight results become stale
    pub fn close(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.image = None;
        self.result = None;
        self.epoch = self.epoch.wrapping_add(1);
        if self.phase != Phase::Idle {
            self.transition(Phase::Idle);
        }
    }

    /// Keep a successful result and reset the screen
    ///
    /// Returns `None` (and changes nothing) unless the state is `Done`
    /// with a `Success` result.
    pub fn accept(&mut self) -> Option<AcceptedDetection> {
        if self.phase != Phase::Done {
            return None;
        }

        let accepted = match (&self.image, &self.result) {
            (
                Some(image),
                Some(DetectionResult::Success {
                    category,
                    confidence,
                    category_info,
                    ..
                }),
            ) => AcceptedDetection {
                image: image.clone(),
                category: category.clone(),
                category_label: category_info.label.clone(),
                confidence: *confidence,
                timestamp: Utc::now(),
            },
            _ => return None,
        };

        self.clear();
        Some(accepted)
    }
}
