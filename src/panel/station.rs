//! Station Availability Gate
//!
//! Decides whether the overlay blocking the document viewer is shown. The
//! decision is a pure function of the latest notification: the overlay is
//! hidden exactly when the current process is among the available ones.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A station change notification from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationChange {
    pub process: String,
    #[serde(default)]
    pub available: Vec<String>,
}

impl StationChange {
    pub fn new<I, S>(process: &str, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            process: process.to_string(),
            available: available.into_iter().map(Into::into).collect(),
        }
    }
}

/// Latest known station availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationAvailability {
    pub current_process: Option<String>,
    pub available_processes: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StationGate {
    availability: StationAvailability,
    overlay_visible: bool,
}

impl StationGate {
    /// Replace the availability with `change` and recompute the overlay.
    /// Names are trimmed and blank available entries dropped.
    pub fn notify(&mut self, change: &StationChange) -> bool {
        let process = change.process.trim().to_string();
        let available: BTreeSet<String> = change
            .available
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        self.overlay_visible = !available.contains(&process);
        self.availability = StationAvailability {
            current_process: Some(process),
            available_processes: available,
        };
        self.overlay_visible
    }

    /// Hidden until the first notification arrives.
    pub const fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub const fn availability(&self) -> &StationAvailability {
        &self.availability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_hidden_before_first_notification() {
        let gate = StationGate::default();
        assert!(!gate.overlay_visible());
        assert!(gate.availability().current_process.is_none());
    }

    #[test]
    fn test_available_process_hides_overlay() {
        let mut gate = StationGate::default();
        assert!(!gate.notify(&StationChange::new("P1", ["P1"])));
    }

    #[test]
    fn test_unavailable_process_shows_overlay() {
        let mut gate = StationGate::default();
        assert!(gate.notify(&StationChange::new("P1", ["P2"])));
    }

    #[test]
    fn test_each_call_supersedes_previous_decision() {
        let mut gate = StationGate::default();
        gate.notify(&StationChange::new("P1", ["P2"]));
        assert!(gate.overlay_visible());
        gate.notify(&StationChange::new("P1", ["P1", "P2"]));
        assert!(!gate.overlay_visible());
        gate.notify(&StationChange::new("P3", Vec::<String>::new()));
        assert!(gate.overlay_visible());
        assert!(gate.availability().available_processes.is_empty());
    }

    #[test]
    fn test_names_are_trimmed_before_matching() {
        let mut gate = StationGate::default();
        assert!(!gate.notify(&StationChange::new(" 加工 ", ["加工  ", ""])));
        assert_eq!(gate.availability().available_processes.len(), 1);
        assert_eq!(gate.availability().current_process.as_deref(), Some("加工"));
    }

    #[test]
    fn test_overlay_rule_over_grid() {
        let processes = ["P1", "P2", "P3"];
        let sets: [&[&str]; 4] = [&[], &["P1"], &["P2", "P3"], &["P1", "P2", "P3"]];
        let mut gate = StationGate::default();
        for set in sets {
            for p in processes {
                let visible = gate.notify(&StationChange::new(p, set.iter().copied()));
                assert_eq!(visible, !set.contains(&p), "process {p} in {set:?}");
            }
        }
    }
}
