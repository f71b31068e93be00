//! Per-limb lock table
//!
//! Locks are derived, never set directly: a limb is locked while the
//! critical action or a gesture owns it.

use crate::core::types::Limb;
use serde::{Deserialize, Serialize};

/// Why a limb is locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    CriticalAction,
    Gesture,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbLockTable {
    reasons: [Option<LockReason>; 2],
}

impl LimbLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute from the limbs currently owned by exclusive actions.
    /// A critical action outranks a gesture as the reported reason.
    pub fn derive(critical_limb: Option<Limb>, gesture_limb: Option<Limb>) -> Self {
        let mut table = Self::default();
        for limb in Limb::ALL {
            table.reasons[limb.index()] = if critical_limb == Some(limb) {
                Some(LockReason::CriticalAction)
            } else if gesture_limb == Some(limb) {
                Some(LockReason::Gesture)
            } else {
                None
            };
        }
        table
    }

    pub fn is_locked(&self, limb: Limb) -> bool {
        self.reasons[limb.index()].is_some()
    }

    pub fn reason(&self, limb: Limb) -> Option<LockReason> {
        self.reasons[limb.index()]
    }

    pub fn any_locked(&self) -> bool {
        self.reasons.iter().any(Option::is_some)
    }
}
