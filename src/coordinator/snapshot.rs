//! Per-tick resolved snapshot pushed to animation consumers

use crate::arbiter::LimbActionFlags;
use crate::core::error::Result;
use crate::core::types::{AgentId, Limb, PresentationState, SprintDirection, StateSource, Tick};
use crate::locks::{ActiveOneShot, LockReason};
use crate::resolver::Decision;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action bits and lock of one limb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbSnapshot {
    pub flags: LimbActionFlags,
    pub lock: Option<LockReason>,
}

/// What the agent logically is this tick. Consumers decide how to play it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub agent: AgentId,
    pub state: PresentationState,
    pub source: StateSource,
    /// Present only while sprinting
    pub sprint_direction: Option<SprintDirection>,
    pub left: LimbSnapshot,
    pub right: LimbSnapshot,
    pub critical_action_active: bool,
    pub gesturing: bool,
    pub one_shot: Option<ActiveOneShot>,
    /// Resolver rule that decided this tick (diagnostics only)
    pub decision: Option<Decision>,
}

impl Snapshot {
    pub fn initial(agent: AgentId) -> Self {
        Self {
            tick: 0,
            agent,
            state: PresentationState::Idle,
            source: StateSource::Auto,
            sprint_direction: None,
            left: LimbSnapshot::default(),
            right: LimbSnapshot::default(),
            critical_action_active: false,
            gesturing: false,
            one_shot: None,
            decision: None,
        }
    }

    pub fn limb(&self, limb: Limb) -> &LimbSnapshot {
        match limb {
            Limb::Left => &self.left,
            Limb::Right => &self.right,
        }
    }

    pub fn is_shooting(&self) -> bool {
        self.left.flags.is_firing || self.right.flags.is_firing
    }

    pub fn is_channeling(&self) -> bool {
        self.left.flags.is_channeling || self.right.flags.is_channeling
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn limb_line(f: &mut fmt::Formatter<'_>, name: &str, limb: &LimbSnapshot) -> fmt::Result {
    let lock = match limb.lock {
        Some(reason) => format!("locked ({:?})", reason),
        None => "free".to_string(),
    };
    writeln!(
        f,
        "  {:<5} firing={} channeling={} {}",
        name, limb.flags.is_firing, limb.flags.is_channeling, lock
    )
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Agent {} @ tick {} ===", self.agent.0, self.tick)?;
        match self.sprint_direction {
            Some(dir) => writeln!(f, "  state: {} [{}] ({})", self.state, dir, self.source)?,
            None => writeln!(f, "  state: {} ({})", self.state, self.source)?,
        }
        if let Some(decision) = self.decision {
            writeln!(f, "  rule:  {:?}", decision)?;
        }
        if let Some(one_shot) = self.one_shot {
            writeln!(
                f,
                "  one-shot: {} until tick {}",
                one_shot.state, one_shot.window.expires_at
            )?;
        }
        limb_line(f, "left", &self.left)?;
        limb_line(f, "right", &self.right)?;
        write!(
            f,
            "  critical={} gesturing={}",
            self.critical_action_active, self.gesturing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_is_idle() {
        let snap = Snapshot::initial(AgentId::new());
        assert_eq!(snap.state, PresentationState::Idle);
        assert!(!snap.is_shooting());
        assert!(snap.sprint_direction.is_none());
    }

    #[test]
    fn test_display_dump_mentions_state_and_limbs() {
        let mut snap = Snapshot::initial(AgentId::new());
        snap.state = PresentationState::Sprint;
        snap.sprint_direction = Some(SprintDirection::StrafeLeft);
        snap.right.lock = Some(LockReason::CriticalAction);

        let dump = snap.to_string();
        assert!(dump.contains("Sprint [StrafeLeft]"));
        assert!(dump.contains("locked (CriticalAction)"));
        assert!(dump.contains("left"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut snap = Snapshot::initial(AgentId::new());
        snap.left.flags.is_firing = true;

        let json = snap.to_json().unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
        assert!(json.contains("\"state\":\"idle\""));
    }
}
