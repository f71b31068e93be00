//! Per-limb action flags

use crate::core::types::{ActionType, Limb};
use serde::{Deserialize, Serialize};

/// Independent action bits for one limb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbActionFlags {
    pub is_firing: bool,
    pub is_channeling: bool,
}

impl LimbActionFlags {
    /// Set the bit backing `action`. Returns true if it changed.
    /// Exclusive actions have no per-limb bit and are ignored.
    pub fn set(&mut self, action: ActionType, value: bool) -> bool {
        let slot = match action {
            ActionType::Fire => &mut self.is_firing,
            ActionType::Channel => &mut self.is_channeling,
            ActionType::Gesture | ActionType::CriticalAction => return false,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    pub fn is_active(&self, action: ActionType) -> bool {
        match action {
            ActionType::Fire => self.is_firing,
            ActionType::Channel => self.is_channeling,
            ActionType::Gesture | ActionType::CriticalAction => false,
        }
    }

    pub fn any(&self) -> bool {
        self.is_firing || self.is_channeling
    }
}

/// Flags for both limbs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLimbFlags {
    limbs: [LimbActionFlags; 2],
}

impl AgentLimbFlags {
    pub fn get(&self, limb: Limb) -> LimbActionFlags {
        self.limbs[limb.index()]
    }

    pub fn get_mut(&mut self, limb: Limb) -> &mut LimbActionFlags {
        &mut self.limbs[limb.index()]
    }

    /// Either limb firing
    pub fn is_shooting(&self) -> bool {
        self.limbs.iter().any(|l| l.is_firing)
    }

    /// Either limb channeling
    pub fn is_channeling(&self) -> bool {
        self.limbs.iter().any(|l| l.is_channeling)
    }
}
