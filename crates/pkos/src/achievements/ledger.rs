//! Achievement ledger: counters, unlock state and write-through persistence.
//!
//! [`AchievementLedger::record`] is the single entry point. Each event bumps at
//! most a few counters; a counter fans out to every achievement in its family
//! (see [`Counter::drives`]). Unlocks are idempotent and every mutation is
//! followed by a full write of the achievement map.

use pkos_common::PkosError;
use pkos_common::constants::store_keys;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::catalog::{AchievementDef, CATALOG};
use super::events::{
    Counter, Event, SNAKE_TIERS, TRACE_BUSTER_LEVEL, UPTIME_TIERS, WEALTH_TIERS,
};
use crate::store::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    def: &'static AchievementDef,
    unlocked: bool,
    progress: u32,
    unlock_date: Option<String>,
}

/// Read-only view of one achievement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementView<'a> {
    pub def: &'static AchievementDef,
    pub unlocked: bool,
    /// Clamped to `target`; `None` for one-shot achievements
    pub progress: Option<u32>,
    pub unlock_date: Option<&'a str>,
}

/// Stored shape, one object per achievement id
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedAchievement<'a> {
    id: &'a str,
    title: &'a str,
    desc: &'a str,
    icon: &'a str,
    unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unlock_date: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct AchievementLedger {
    entries: Vec<Entry>,
    counters: BTreeMap<Counter, u32>,
    spam_streak: u32,
    last_line: Option<String>,
    uptime_minutes: u32,
    windows: BTreeSet<String>,
    tracks: BTreeSet<u32>,
    restored: bool,
    fresh: Vec<&'static AchievementDef>,
    dirty: bool,
}

impl Default for AchievementLedger {
    fn default() -> Self {
        Self {
            entries: CATALOG
                .iter()
                .map(|def| Entry {
                    def,
                    unlocked: false,
                    progress: 0,
                    unlock_date: None,
                })
                .collect(),
            counters: BTreeMap::new(),
            spam_streak: 0,
            last_line: None,
            uptime_minutes: 0,
            windows: BTreeSet::new(),
            tracks: BTreeSet::new(),
            restored: false,
            fresh: Vec::new(),
            dirty: false,
        }
    }
}

impl AchievementLedger {
    /// Load persisted state and merge it into the static catalog.
    ///
    /// Each stored entry is merged on its own, field by field: unknown ids are
    /// ignored and a field of the wrong type keeps its default, so one bad
    /// entry never discards the others. Catalog ids missing from storage
    /// start locked at zero. Counters resume from the largest stored progress
    /// in their family. Storage errors and a top-level value that is not a
    /// JSON object start a clean ledger.
    pub fn load(store: &mut dyn KvStore) -> Self {
        let mut ledger = Self::default();

        let raw = match store.get(store_keys::ACHIEVEMENTS) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read achievements, starting fresh");
                None
            }
        };
        let Some(raw) = raw else {
            return ledger;
        };

        let saved: Map<String, Value> = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "Stored achievements are malformed, starting fresh");
                return ledger;
            }
        };

        let mut merged = 0usize;
        for entry in ledger.entries.iter_mut() {
            let Some(stored) = saved.get(entry.def.id) else {
                continue;
            };
            if merge_entry(entry, stored) {
                merged += 1;
            } else {
                tracing::warn!(achievement = %entry.def.id, "Skipping malformed stored achievement");
            }
        }

        for counter in Counter::ALL {
            let seed = counter
                .drives()
                .iter()
                .filter_map(|id| ledger.entry(id))
                .map(|e| e.progress)
                .max()
                .unwrap_or(0);
            if seed > 0 {
                ledger.counters.insert(counter, seed);
            }
        }

        ledger.restored = true;
        tracing::debug!(
            merged,
            ignored = saved.len() - merged,
            unlocked = ledger.unlocked_count(),
            "Achievements restored"
        );
        ledger
    }

    /// False when no stored state was found (first boot)
    pub fn restored(&self) -> bool {
        self.restored
    }

    /// Apply one event; returns the achievements it newly unlocked
    pub fn record(&mut self, event: Event<'_>, store: &mut dyn KvStore) -> Vec<&'static AchievementDef> {
        match event {
            Event::FirstBoot => self.unlock("hello_world"),
            Event::Boot => self.bump(Counter::Boots, 1),
            Event::CommandRun => self.bump(Counter::Commands, 1),
            Event::Spam(line) => self.spam_check(line),
            Event::InvalidCommand => self.bump(Counter::Invalid, 1),
            Event::ClearTerm => self.bump(Counter::Clears, 1),
            Event::SysAdmin => self.unlock("sys_admin"),
            Event::HackComplete => {
                self.unlock("script_kiddie");
                self.bump(Counter::Hacks, 1);
            }
            Event::UploadComplete => self.bump(Counter::Uploads, 1),
            Event::TraceObserved(trace) => {
                if trace > TRACE_BUSTER_LEVEL {
                    self.unlock("trace_buster");
                }
            }
            Event::CreditsChanged(credits) => {
                for (threshold, id) in WEALTH_TIERS {
                    if credits >= threshold {
                        self.unlock(id);
                    }
                }
            }
            Event::ItemBought { all_owned } => {
                self.unlock("big_spender");
                if all_owned {
                    self.unlock("fully_kitted");
                }
            }
            Event::SnakeScore(score) => {
                for (threshold, id) in SNAKE_TIERS {
                    if score >= threshold {
                        self.unlock(id);
                    }
                }
            }
            Event::SnakeDeath => self.bump(Counter::SnakeDeaths, 1),
            Event::SnakeTime(secs) => self.bump(Counter::SnakeSeconds, secs),
            Event::UptimeTick => {
                self.uptime_minutes += 1;
                for (minutes, id) in UPTIME_TIERS {
                    if self.uptime_minutes >= minutes {
                        self.unlock(id);
                    }
                }
            }
            Event::FileCreated => self.bump(Counter::FilesCreated, 1),
            Event::FileDeleted => self.bump(Counter::FilesDeleted, 1),
            Event::DirChange(path) => {
                self.bump(Counter::DirChanges, 1);
                if path == "." {
                    self.bump(Counter::Recursion, 1);
                }
            }
            Event::CheckId => self.bump(Counter::IdChecks, 1),
            Event::CheckSkills => self.bump(Counter::SkillChecks, 1),
            Event::CheckProjects => self.bump(Counter::ProjectChecks, 1),
            Event::CheckMarket => self.bump(Counter::MarketChecks, 1),
            Event::TrackPlayed(track) => {
                self.tracks.insert(track);
                self.advance("audiophile", self.tracks.len() as u32);
            }
            Event::MusicLover => self.unlock("music_lover"),
            Event::WindowOpened(window) => {
                if self.windows.insert(window.to_string()) {
                    self.advance("explorer", self.windows.len() as u32);
                }
            }
            Event::GlitchMatrix => self.unlock("glitch_matrix"),
            Event::Konami => self.unlock("konami"),
            Event::SystemCrash => self.unlock("bsod_survivor"),
            Event::RootAttempt => self.unlock("root_access"),
        }

        if self.dirty {
            self.persist(store);
        }
        std::mem::take(&mut self.fresh)
    }

    fn spam_check(&mut self, line: &str) {
        if self.last_line.as_deref() == Some(line) {
            self.spam_streak += 1;
            self.advance("spammer", self.spam_streak);
        } else {
            self.spam_streak = 0;
            self.last_line = Some(line.to_string());
        }
    }

    fn bump(&mut self, counter: Counter, by: u32) {
        let value = self.counters.entry(counter).or_default();
        *value = value.saturating_add(by);
        let value = *value;
        for id in counter.drives() {
            self.advance(id, value);
        }
    }

    /// Raise progress to `value` (never lowers it) and unlock at target
    fn advance(&mut self, id: &str, value: u32) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.def.id == id) else {
            return;
        };
        if value > entry.progress {
            entry.progress = value;
            self.dirty = true;
        }
        if entry.def.target.is_some_and(|target| value >= target) {
            self.unlock(id);
        }
    }

    fn unlock(&mut self, id: &str) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.def.id == id) else {
            tracing::warn!(achievement = %id, "Unknown achievement");
            return;
        };
        if entry.unlocked {
            return;
        }

        entry.unlocked = true;
        entry.unlock_date = Some(chrono::Local::now().format("%-m/%-d/%Y").to_string());
        self.fresh.push(entry.def);
        self.dirty = true;
        tracing::info!(achievement = %id, title = %entry.def.title, "Achievement unlocked");
    }

    fn persist(&mut self, store: &mut dyn KvStore) {
        self.dirty = false;

        let saved: BTreeMap<&str, SavedAchievement<'_>> = self
            .entries
            .iter()
            .map(|e| {
                (
                    e.def.id,
                    SavedAchievement {
                        id: e.def.id,
                        title: e.def.title,
                        desc: e.def.desc,
                        icon: e.def.icon,
                        unlocked: e.unlocked,
                        progress: e.def.target.map(|_| e.progress),
                        target: e.def.target,
                        unlock_date: e.unlock_date.as_deref(),
                    },
                )
            })
            .collect();

        let result = serde_json::to_string(&saved)
            .map_err(PkosError::from)
            .and_then(|json| store.set(store_keys::ACHIEVEMENTS, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist achievements");
        }
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.def.id == id)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.entry(id).is_some_and(|e| e.unlocked)
    }

    pub fn get(&self, id: &str) -> Option<AchievementView<'_>> {
        self.entry(id).map(view)
    }

    /// All achievements in catalog order
    pub fn views(&self) -> impl Iterator<Item = AchievementView<'_>> {
        self.entries.iter().map(view)
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.unlocked).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

/// Copy the well-typed fields of one stored object; false if it is not an object
fn merge_entry(entry: &mut Entry, stored: &Value) -> bool {
    let Some(fields) = stored.as_object() else {
        return false;
    };
    if let Some(unlocked) = fields.get("unlocked").and_then(Value::as_bool) {
        entry.unlocked = unlocked;
    }
    if let Some(progress) = fields.get("progress").and_then(Value::as_u64) {
        entry.progress = u32::try_from(progress).unwrap_or(u32::MAX);
    }
    let unlocked = entry.unlocked;
    entry.unlock_date = fields
        .get("unlockDate")
        .and_then(Value::as_str)
        .filter(|_| unlocked)
        .map(str::to_string);
    true
}

fn view(entry: &Entry) -> AchievementView<'_> {
    AchievementView {
        def: entry.def,
        unlocked: entry.unlocked,
        progress: entry.def.target.map(|target| entry.progress.min(target)),
        unlock_date: entry.unlock_date.as_deref(),
    }
}
