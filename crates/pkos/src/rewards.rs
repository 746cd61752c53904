//! Sandbox inbox and reward dispatch.
//!
//! Puzzle sessions run behind a trust boundary: the only thing they can do is
//! post a string through a [`SandboxPort`]. The host drains the [`Inbox`] and
//! hands each message to [`RewardDispatcher`], which ignores anything that is
//! not `mission_success_<id>` and looks the id up in the live registry before
//! granting anything.

use crossbeam_queue::SegQueue;
use pkos_common::Mission;
use pkos_common::constants::{MISSION_SUCCESS_PREFIX, OMEGA_OP, PORTAL_BREACH_SIGNAL};
use std::sync::Arc;

use crate::fs::FileSystem;
use crate::missions::MissionRegistry;

/// Host side of the sandbox message channel
#[derive(Debug, Default)]
pub struct Inbox {
    queue: Arc<SegQueue<String>>,
}

/// Sandbox side: post-only
#[derive(Debug, Clone)]
pub struct SandboxPort {
    queue: Arc<SegQueue<String>>,
}

impl SandboxPort {
    pub fn post(&self, message: impl Into<String>) {
        self.queue.push(message.into());
    }
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn port(&self) -> SandboxPort {
        SandboxPort {
            queue: self.queue.clone(),
        }
    }

    /// Take every pending message, oldest first
    pub fn drain(&self) -> Vec<String> {
        std::iter::from_fn(|| self.queue.pop()).collect()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Shape of an inbound sandbox message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage<'a> {
    /// Claimed success for a mission id (not yet validated)
    MissionSuccess(&'a str),
    /// A portal login was bypassed
    PortalBreach,
    /// Anything else
    Noise,
}

pub fn parse_message(message: &str) -> InboundMessage<'_> {
    if let Some(id) = message.strip_prefix(MISSION_SUCCESS_PREFIX) {
        if !id.is_empty() {
            return InboundMessage::MissionSuccess(id);
        }
    }
    if message == PORTAL_BREACH_SIGNAL {
        return InboundMessage::PortalBreach;
    }
    InboundMessage::Noise
}

/// How a reward was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantSource {
    /// Puzzle solved in the sandbox
    Puzzle,
    /// Loot exfiltrated with `upload`
    Upload,
}

/// Result of a grant attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub reward: String,
    /// False when the reward file already existed (replayed success)
    pub created: bool,
}

/// Validates sandbox claims and writes reward files
#[derive(Debug, Default)]
pub struct RewardDispatcher;

impl RewardDispatcher {
    /// Resolve a raw inbound message to a registered mission
    pub fn validate<'r>(&self, message: &str, registry: &'r MissionRegistry) -> Option<&'r Mission> {
        match parse_message(message) {
            InboundMessage::MissionSuccess(id) => match registry.get(id) {
                Some(mission) => Some(mission),
                None => {
                    tracing::warn!(mission_id = %id, "Rejected success claim for unknown mission");
                    None
                }
            },
            InboundMessage::PortalBreach => {
                tracing::debug!("Portal breach notice received");
                None
            }
            InboundMessage::Noise => {
                tracing::debug!(message = %message, "Ignoring sandbox noise");
                None
            }
        }
    }

    /// Write the reward file for `mission` unless it is already there
    pub fn grant(&self, mission: &Mission, source: GrantSource, fs: &mut FileSystem) -> Grant {
        let content = match source {
            GrantSource::Puzzle => puzzle_reward_content(mission),
            GrantSource::Upload => upload_reward_content(mission),
        };
        let created = fs.create_root_file_if_absent(&mission.reward, content);

        if created {
            tracing::info!(
                mission_id = %mission.id,
                reward = %mission.reward,
                source = ?source,
                "Reward granted"
            );
        } else {
            tracing::debug!(mission_id = %mission.id, "Reward already present, skipping");
        }

        Grant {
            reward: mission.reward.clone(),
            created,
        }
    }
}

fn puzzle_reward_content(mission: &Mission) -> String {
    if mission.id == OMEGA_OP {
        return "ENCRYPTED DATA\n\n[LOCKED]\n\nHint: The Creator's Location (Check Identity)".to_string();
    }
    format!(
        "MISSION COMPLETE: {}\n\nREWARD DATA: [{}]\n\nACCESS GRANTED.",
        mission.title,
        mission.reward.to_uppercase()
    )
}

fn upload_reward_content(mission: &Mission) -> String {
    format!(
        "MISSION COMPLETE: {}\n\nLOOT SECURED.\n\n[DATA ENCRYPTED]",
        mission.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_shapes() {
        assert_eq!(
            parse_message("mission_success_op_12"),
            InboundMessage::MissionSuccess("op_12")
        );
        assert_eq!(parse_message("deep_web_sqli"), InboundMessage::PortalBreach);
        assert_eq!(parse_message("mission_success_"), InboundMessage::Noise);
        assert_eq!(parse_message("hello"), InboundMessage::Noise);
    }

    #[test]
    fn test_port_posts_reach_inbox_in_order() {
        let inbox = Inbox::new();
        let port = inbox.port();
        port.post("a");
        port.clone().post("b");
        assert_eq!(inbox.drain(), vec!["a".to_string(), "b".to_string()]);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_forged_ids_are_rejected() {
        let registry = MissionRegistry::with_catalog();
        let dispatcher = RewardDispatcher;
        assert!(dispatcher.validate("mission_success_op_999999", &registry).is_none());
        assert!(dispatcher.validate("mission_success_gamma", &registry).is_some());
    }

    #[test]
    fn test_grant_is_idempotent() {
        let registry = MissionRegistry::with_catalog();
        let mission = registry.get("gamma").unwrap();
        let mut fs = FileSystem::new();
        let dispatcher = RewardDispatcher;

        let first = dispatcher.grant(mission, GrantSource::Puzzle, &mut fs);
        let content = fs.root_file("gamma_intel.txt").unwrap().to_string();
        let second = dispatcher.grant(mission, GrantSource::Upload, &mut fs);

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(fs.root_file("gamma_intel.txt").unwrap(), content);
        assert!(content.contains("REWARD DATA: [GAMMA_INTEL.TXT]"));
    }

    #[test]
    fn test_omega_reward_is_locked() {
        let registry = MissionRegistry::with_catalog();
        let mut fs = FileSystem::new();
        RewardDispatcher.grant(registry.get("omega").unwrap(), GrantSource::Puzzle, &mut fs);
        assert!(fs.root_file("encrypted_payload.dat").unwrap().contains("[LOCKED]"));
    }
}
