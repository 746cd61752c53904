//! Everything the ledger can observe.

/// One observable player or system action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// No persisted achievement state was found at startup
    FirstBoot,
    Boot,
    /// Any console line
    CommandRun,
    /// Raw console line, for repeat detection
    Spam(&'a str),
    InvalidCommand,
    ClearTerm,
    /// `help`
    SysAdmin,
    HackComplete,
    UploadComplete,
    /// Trace level after an upload step
    TraceObserved(u32),
    /// Wallet balance after a change
    CreditsChanged(u64),
    ItemBought { all_owned: bool },
    SnakeScore(u32),
    SnakeDeath,
    /// Seconds spent in a Snake round
    SnakeTime(u32),
    UptimeTick,
    FileCreated,
    FileDeleted,
    /// Successful `cd` with its argument
    DirChange(&'a str),
    CheckId,
    CheckSkills,
    CheckProjects,
    CheckMarket,
    TrackPlayed(u32),
    MusicLover,
    WindowOpened(&'a str),
    GlitchMatrix,
    Konami,
    SystemCrash,
    RootAttempt,
}

/// Session counters; each one drives a fixed family of achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Commands,
    Hacks,
    Uploads,
    SnakeDeaths,
    SnakeSeconds,
    Clears,
    Invalid,
    FilesCreated,
    FilesDeleted,
    DirChanges,
    Recursion,
    IdChecks,
    SkillChecks,
    ProjectChecks,
    MarketChecks,
    Boots,
}

impl Counter {
    pub const ALL: [Counter; 16] = [
        Self::Commands,
        Self::Hacks,
        Self::Uploads,
        Self::SnakeDeaths,
        Self::SnakeSeconds,
        Self::Clears,
        Self::Invalid,
        Self::FilesCreated,
        Self::FilesDeleted,
        Self::DirChanges,
        Self::Recursion,
        Self::IdChecks,
        Self::SkillChecks,
        Self::ProjectChecks,
        Self::MarketChecks,
        Self::Boots,
    ];

    /// Achievements whose progress mirrors this counter
    pub fn drives(&self) -> &'static [&'static str] {
        match self {
            Self::Commands => &[
                "terminal_junkie",
                "novice_term",
                "user_term",
                "power_user",
                "sys_admin_term",
                "operator",
            ],
            Self::Hacks => &[
                "master_hacker",
                "white_hat",
                "gray_hat",
                "black_hat",
                "elite_hacker",
                "cyber_deity",
            ],
            Self::Uploads => &["payload_deliverer"],
            Self::SnakeDeaths => &["game_over"],
            Self::SnakeSeconds => &["survivor"],
            Self::Clears => &["paranoid"],
            Self::Invalid => &["lost"],
            Self::FilesCreated => &["file_hoarder"],
            Self::FilesDeleted => &["deleter"],
            Self::DirChanges => &["navigator"],
            Self::Recursion => &["recursion"],
            Self::IdChecks => &["identity_theft"],
            Self::SkillChecks => &["narcissist"],
            Self::ProjectChecks => &["developer"],
            Self::MarketChecks => &["window_shopper"],
            Self::Boots => &["hello_again"],
        }
    }
}

/// Credit thresholds, lowest first
pub const WEALTH_TIERS: [(u64, &str); 5] = [
    (100, "rich"),
    (500, "freelancer"),
    (1000, "professional"),
    (5000, "tycoon"),
    (10_000, "whale"),
];

pub const SNAKE_TIERS: [(u32, &str); 5] = [
    (10, "snake_score_10"),
    (50, "snake_score_50"),
    (100, "cobra"),
    (200, "viper"),
    (500, "hydra"),
];

/// Minutes of uptime
pub const UPTIME_TIERS: [(u32, &str); 5] = [
    (1, "uptime_1m"),
    (5, "uptime_5m"),
    (10, "uptime_10m"),
    (30, "uptime_30m"),
    (60, "uptime_1h"),
];

/// Trace level that has to be exceeded for `trace_buster`
pub const TRACE_BUSTER_LEVEL: u32 = 90;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::catalog;

    #[test]
    fn test_every_driven_id_exists_and_has_target() {
        for counter in Counter::ALL {
            for id in counter.drives() {
                let def = catalog::find(id).unwrap_or_else(|| panic!("missing {}", id));
                assert!(def.target.is_some(), "{} has no target", id);
            }
        }
    }

    #[test]
    fn test_tier_ids_exist() {
        let ids = WEALTH_TIERS
            .iter()
            .map(|(_, id)| *id)
            .chain(SNAKE_TIERS.iter().map(|(_, id)| *id))
            .chain(UPTIME_TIERS.iter().map(|(_, id)| *id));
        for id in ids {
            assert!(catalog::find(id).is_some(), "missing {}", id);
        }
    }
}
