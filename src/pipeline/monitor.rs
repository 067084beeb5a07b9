//! Starvation tracking for the consumer path.

use crate::BridgeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    /// No full pull since the last format change.
    Idle,
    /// The last pull was fully served.
    Flowing,
    /// The last pull was padded with silence after audio had been flowing.
    Starved,
}

/// Detects transitions between fully served pulls and silence-padded pulls.
///
/// Pulls before the first full one (startup, or right after a format change)
/// are not reported; the bridge is expected to be empty then.
#[derive(Debug)]
pub(crate) struct StarvationMonitor {
    state: FlowState,
}

impl StarvationMonitor {
    pub(crate) fn new() -> Self {
        Self {
            state: FlowState::Idle,
        }
    }

    /// Records a pull that left `missing_samples` samples of silence.
    /// Returns an event to emit if the flow state changed.
    pub(crate) fn update(&mut self, missing_samples: usize) -> Option<BridgeEvent> {
        match (self.state, missing_samples) {
            (FlowState::Idle, 0) => {
                self.state = FlowState::Flowing;
                None
            }
            (FlowState::Flowing, missing) if missing > 0 => {
                self.state = FlowState::Starved;
                tracing::warn!(missing_samples = missing, "Bridge starved - padding with silence");
                Some(BridgeEvent::Starved {
                    missing_samples: missing,
                })
            }
            (FlowState::Starved, 0) => {
                self.state = FlowState::Flowing;
                tracing::debug!("Bridge resumed");
                Some(BridgeEvent::Resumed)
            }
            _ => None,
        }
    }

    /// Forgets the flow history, e.g. after the buffer was replaced.
    pub(crate) fn reset(&mut self) {
        self.state = FlowState::Idle;
    }
}
