//! Viewer State Controller
//!
//! Tracks which part the companion document viewer is focused on and whether
//! it is displaying. Independent of the Location Store: focusing a part that
//! is not in the table is allowed.
//!
//! States: `closed` (initial) and `viewer`. Any state can move to any state
//! through [`ViewerController::set`]; [`ViewerController::close`] is the
//! explicit way back to `closed`.

use serde::{Deserialize, Serialize};

use crate::types::ViewerPhase;

/// Host request to change the viewer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerStateRequest {
    #[serde(default)]
    pub part: Option<String>,
    pub state: ViewerPhase,
}

/// Current viewer state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewerSnapshot {
    pub focused_part: Option<String>,
    pub phase: ViewerPhase,
}

#[derive(Debug, Clone, Default)]
pub struct ViewerController {
    state: ViewerSnapshot,
}

impl ViewerController {
    /// Apply a "set viewer state" event. A blank part clears the focus.
    pub fn set(&mut self, part: Option<&str>, phase: ViewerPhase) -> &ViewerSnapshot {
        self.state = ViewerSnapshot {
            focused_part: part
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            phase,
        };
        &self.state
    }

    /// Return to `closed` and drop the focused part.
    pub fn close(&mut self) -> &ViewerSnapshot {
        self.state = ViewerSnapshot::default();
        &self.state
    }

    pub const fn snapshot(&self) -> &ViewerSnapshot {
        &self.state
    }

    pub fn focused_part(&self) -> Option<&str> {
        self.state.focused_part.as_deref()
    }

    pub const fn phase(&self) -> ViewerPhase {
        self.state.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_closed_without_part() {
        let viewer = ViewerController::default();
        assert_eq!(viewer.phase(), ViewerPhase::Closed);
        assert!(viewer.focused_part().is_none());
    }

    #[test]
    fn test_set_focuses_part_and_phase() {
        let mut viewer = ViewerController::default();
        let snap = viewer.set(Some("E2E-1"), ViewerPhase::Viewer).clone();
        assert_eq!(snap.focused_part.as_deref(), Some("E2E-1"));
        assert_eq!(snap.phase, ViewerPhase::Viewer);
    }

    #[test]
    fn test_set_with_blank_part_clears_focus() {
        let mut viewer = ViewerController::default();
        viewer.set(Some("E2E-1"), ViewerPhase::Viewer);
        viewer.set(Some("  "), ViewerPhase::Viewer);
        assert!(viewer.focused_part().is_none());
    }

    #[test]
    fn test_close_returns_to_initial_state() {
        let mut viewer = ViewerController::default();
        viewer.set(Some("E2E-1"), ViewerPhase::Viewer);
        viewer.close();
        assert_eq!(viewer.snapshot(), &ViewerSnapshot::default());
    }

    #[test]
    fn test_set_closed_keeps_requested_part() {
        let mut viewer = ViewerController::default();
        viewer.set(Some("P-9"), ViewerPhase::Closed);
        assert_eq!(viewer.focused_part(), Some("P-9"));
        assert_eq!(viewer.phase(), ViewerPhase::Closed);
    }

    #[test]
    fn test_request_deserializes_from_host_shape() {
        let req: ViewerStateRequest =
            serde_json::from_str(r#"{"part":"E2E-1","state":"viewer"}"#).unwrap();
        assert_eq!(req.part.as_deref(), Some("E2E-1"));
        assert_eq!(req.state, ViewerPhase::Viewer);
    }
}
