//! Core types shared across PK_OS components.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{DEFAULT_OP_DURATION_SECS, GENERATED_ID_PREFIX, PUZZLE_PAYOUT};

/// Mission discriminant, as shown in the contracts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionType {
    Standard,
    Timed,
    Bruteforce,
    Decipher,
    Frequency,
    Trivia,
    Grid,
}

impl MissionType {
    pub const ALL: [MissionType; 7] = [
        Self::Standard,
        Self::Timed,
        Self::Bruteforce,
        Self::Decipher,
        Self::Frequency,
        Self::Trivia,
        Self::Grid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Timed => "timed",
            Self::Bruteforce => "bruteforce",
            Self::Decipher => "decipher",
            Self::Frequency => "frequency",
            Self::Trivia => "trivia",
            Self::Grid => "grid",
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Palette tag applied to the desktop while a reward is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Green,
    Red,
    Blue,
    Purple,
    Yellow,
    Orange,
    Cyan,
    Pink,
    White,
    Brown,
    Gray,
}

impl Theme {
    /// Palette the generator draws from
    pub const GENERATED: [Theme; 9] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Purple,
        Self::Yellow,
        Self::Orange,
        Self::Cyan,
        Self::Pink,
        Self::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Cyan => "cyan",
            Self::Pink => "pink",
            Self::White => "white",
            Self::Brown => "brown",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "theme-{}", self.as_str())
    }
}

/// Type-specific mission payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MissionKind {
    /// Compared against the player's Snake high score
    Standard { score: u32 },

    /// Countdown operation driven by the mission engine
    Timed { duration: u32 },

    /// 4-digit keypad
    Bruteforce { pin: String },

    /// ROT13 cipher
    Decipher { plaintext: String, ciphertext: String },

    /// Signal lock, 10-100 Hz
    Frequency {
        #[serde(rename = "targetFreq")]
        target_freq: u32,
    },

    /// Single-shot security question
    Trivia {
        question: String,
        answer: String,
        options: Vec<String>,
    },

    /// Memory pattern over a 4x4 grid
    Grid { pattern: Vec<u8> },
}

impl MissionKind {
    pub fn mission_type(&self) -> MissionType {
        match self {
            Self::Standard { .. } => MissionType::Standard,
            Self::Timed { .. } => MissionType::Timed,
            Self::Bruteforce { .. } => MissionType::Bruteforce,
            Self::Decipher { .. } => MissionType::Decipher,
            Self::Frequency { .. } => MissionType::Frequency,
            Self::Trivia { .. } => MissionType::Trivia,
            Self::Grid { .. } => MissionType::Grid,
        }
    }

    /// Build a decipher payload; the ciphertext is always derived from the plaintext
    pub fn decipher(plaintext: impl Into<String>) -> Self {
        let plaintext = plaintext.into();
        let ciphertext = rot13(&plaintext);
        Self::Decipher {
            plaintext,
            ciphertext,
        }
    }
}

/// One challenge in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    /// Unique registry key
    pub id: String,

    /// Dotted quad, unique across the registry
    pub ip: String,

    /// Hostname, unique across the registry
    pub domain: String,

    pub title: String,

    pub theme: Theme,

    /// Filename created on success
    pub reward: String,

    /// Credential accepted by `upload` while the operation is active
    pub upload_code: String,

    #[serde(flatten)]
    pub kind: MissionKind,
}

impl Mission {
    pub fn mission_type(&self) -> MissionType {
        self.kind.mission_type()
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.kind, MissionKind::Timed { .. })
    }

    /// Countdown in seconds for timed operations
    pub fn duration(&self) -> u32 {
        match self.kind {
            MissionKind::Timed { duration } if duration > 0 => duration,
            _ => DEFAULT_OP_DURATION_SECS,
        }
    }

    /// Credits transferred when the mission pays out
    pub fn payout(&self) -> u64 {
        match self.kind {
            MissionKind::Standard { score } => u64::from(score),
            MissionKind::Timed { .. } => u64::from(self.duration() / 10),
            _ => PUZZLE_PAYOUT,
        }
    }

    /// Sequence number of a generated mission (`op_<n>`), `None` for hand-authored ones
    pub fn generated_index(&self) -> Option<u32> {
        self.id.strip_prefix(GENERATED_ID_PREFIX)?.parse().ok()
    }
}

/// Simulated file system node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FsNode {
    File { content: String },
    Dir { children: BTreeMap<String, FsNode> },
}

impl FsNode {
    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
        }
    }

    pub fn empty_dir() -> Self {
        Self::Dir {
            children: BTreeMap::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir { .. })
    }
}

/// Rotate A-Z by 13. Every other character passes through unchanged.
pub fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'A'..='Z' => (((c as u8 - b'A' + 13) % 26) + b'A') as char,
            _ => c,
        })
        .collect()
}
