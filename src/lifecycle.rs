//! Worker lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the worker.
///
/// Install runs to completion before activation begins; a failed install
/// leaves the worker redundant and the previous version keeps serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
  /// Created but not yet installing
  #[default]
  Parsed,
  /// Install event in progress
  Installing,
  /// Installed, waiting to activate
  Installed,
  /// Activate event in progress
  Activating,
  /// Active and controlling clients
  Activated,
  /// Install failed or superseded; never serves again
  Redundant,
}

impl WorkerState {
  pub fn is_active(&self) -> bool {
    *self == WorkerState::Activated
  }

  pub fn is_redundant(&self) -> bool {
    *self == WorkerState::Redundant
  }

  /// Whether the worker is installed and waiting for activation.
  pub fn is_waiting(&self) -> bool {
    *self == WorkerState::Installed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_state() {
    assert_eq!(WorkerState::default(), WorkerState::Parsed);
  }

  #[test]
  fn test_predicates() {
    assert!(WorkerState::Activated.is_active());
    assert!(!WorkerState::Installed.is_active());
    assert!(WorkerState::Installed.is_waiting());
    assert!(WorkerState::Redundant.is_redundant());
  }
}
