//! Procedural mission generation.
//!
//! Builds `OPERATION <ADJ> <NOUN>` contracts with a random payload per type.
//! IPs and domains are rejection-sampled against the whole registry, so the
//! uniqueness invariant holds for hand-authored and generated missions alike.

use pkos_common::constants::{GENERATED_ID_PREFIX, GRID_CELLS, GRID_PATTERN_LEN};
use pkos_common::{Mission, MissionKind, MissionType, Theme};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::MissionRegistry;

const ADJECTIVES: [&str; 15] = [
    "Silent", "Dark", "Crimson", "Neon", "Cyber", "Rogue", "Phantom", "Steel", "Iron", "Glass",
    "Void", "Solar", "Lunar", "Nether", "Hyper",
];

const NOUNS: [&str; 15] = [
    "Storm", "Viper", "Echo", "Protocol", "Citadel", "Fortress", "Shadow", "Dragon", "Wolf",
    "Hawk", "Core", "Nexus", "Gate", "Grid", "Pulse",
];

const TLDS: [&str; 10] = [
    ".com", ".net", ".org", ".io", ".biz", ".gov", ".mil", ".edu", ".corp", ".xyz",
];

const PHRASES: [&str; 5] = [
    "ACCESS GRANTED",
    "SYSTEM FAILURE",
    "HELLO WORLD",
    "PROJECT OMEGA",
    "SECURITY BREACH",
];

struct TriviaCard {
    question: &'static str,
    answer: &'static str,
    options: [&'static str; 4],
}

const TRIVIA: [TriviaCard; 5] = [
    TriviaCard {
        question: "What is the default port for SSH?",
        answer: "22",
        options: ["21", "22", "80", "443"],
    },
    TriviaCard {
        question: "Which command lists files in Linux?",
        answer: "ls",
        options: ["dir", "list", "ls", "show"],
    },
    TriviaCard {
        question: "What does HTML stand for?",
        answer: "HyperText Markup Language",
        options: [
            "HighText Machine Language",
            "HyperText Markup Language",
            "HyperTool Multi Language",
            "None",
        ],
    },
    TriviaCard {
        question: "Who created Linux?",
        answer: "Linus Torvalds",
        options: ["Steve Jobs", "Bill Gates", "Linus Torvalds", "Ada Lovelace"],
    },
    TriviaCard {
        question: "What is a DDoS attack?",
        answer: "Distributed Denial of Service",
        options: [
            "Direct Denial of Service",
            "Distributed Denial of Service",
            "Data Destruction on Server",
            "Digital Data on Site",
        ],
    },
];

/// Map a uniform draw in [0, 1) to a mission type.
///
/// 40% standard, 10% each for the other six.
pub fn type_for_roll(roll: f64) -> MissionType {
    match roll {
        r if r < 0.4 => MissionType::Standard,
        r if r < 0.5 => MissionType::Timed,
        r if r < 0.6 => MissionType::Bruteforce,
        r if r < 0.7 => MissionType::Decipher,
        r if r < 0.8 => MissionType::Frequency,
        r if r < 0.9 => MissionType::Trivia,
        _ => MissionType::Grid,
    }
}

/// Mission generator service
pub struct MissionGenerator<R: Rng> {
    rng: R,
}

impl MissionGenerator<StdRng> {
    /// Seeded generator when `seed` is set, entropy-seeded otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }
}

impl<R: Rng> MissionGenerator<R> {
    /// Append `count` missions to `registry`
    pub fn generate(&mut self, registry: &mut MissionRegistry, count: usize) {
        self.generate_until(registry, count, &AtomicBool::new(false));
    }

    /// Like [`generate`](Self::generate), stopping early once `cancel` is set.
    /// Returns the number of missions added.
    pub fn generate_until(
        &mut self,
        registry: &mut MissionRegistry,
        count: usize,
        cancel: &AtomicBool,
    ) -> usize {
        let first = registry.next_generated_index();
        let mut rerolls = 0usize;
        let mut added = 0usize;

        for index in first..first + count {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!(added, "Mission generation cancelled");
                return added;
            }
            let mut mission = self.generate_one(index, registry);
            // ip/domain are drawn against the registry already; ids are sequential
            while let Err(e) = registry.insert(mission) {
                rerolls += 1;
                tracing::trace!(error = %e, "Mission collided, re-rolling");
                mission = self.generate_one(index, registry);
            }
            added += 1;
        }

        tracing::debug!(count, rerolls, total = registry.len(), "Generated missions");
        added
    }

    /// Build one mission; does not touch the registry
    pub fn generate_one(&mut self, index: usize, registry: &MissionRegistry) -> Mission {
        let adj = ADJECTIVES[self.rng.random_range(0..ADJECTIVES.len())];
        let noun = NOUNS[self.rng.random_range(0..NOUNS.len())];
        let id = format!("{}{}", GENERATED_ID_PREFIX, index);
        let title = format!("OPERATION {} {}", adj.to_uppercase(), noun.to_uppercase());

        let ip = loop {
            let ip = format!(
                "192.168.{}.{}",
                self.rng.random_range(10..250),
                self.rng.random_range(0..250)
            );
            if !registry.ip_taken(&ip) {
                break ip;
            }
        };

        let domain = loop {
            let domain = format!(
                "{}{}{}{}",
                adj.to_lowercase(),
                noun.to_lowercase(),
                self.rng.random_range(0..999),
                TLDS[self.rng.random_range(0..TLDS.len())]
            );
            if !registry.domain_taken(&domain) {
                break domain;
            }
        };

        let mission_type = type_for_roll(self.rng.random::<f64>());
        let kind = self.payload(mission_type);
        let reward = match mission_type {
            MissionType::Standard => format!("data_{}.txt", id),
            _ => format!("loot_{}.zip", id),
        };
        let theme = Theme::GENERATED[self.rng.random_range(0..Theme::GENERATED.len())];
        let upload_code = format!("UP_{:06X}", self.rng.random_range(0..0xFF_FFFFu32));

        Mission {
            id,
            ip,
            domain,
            title,
            theme,
            reward,
            upload_code,
            kind,
        }
    }

    fn payload(&mut self, mission_type: MissionType) -> MissionKind {
        match mission_type {
            MissionType::Standard => MissionKind::Standard {
                score: self.rng.random_range(5..95),
            },
            MissionType::Timed => MissionKind::Timed {
                duration: self.rng.random_range(120..600),
            },
            MissionType::Bruteforce => MissionKind::Bruteforce {
                pin: self.rng.random_range(1000..10_000u32).to_string(),
            },
            MissionType::Decipher => {
                MissionKind::decipher(PHRASES[self.rng.random_range(0..PHRASES.len())])
            }
            MissionType::Frequency => MissionKind::Frequency {
                target_freq: self.rng.random_range(10..100),
            },
            MissionType::Trivia => {
                let card = &TRIVIA[self.rng.random_range(0..TRIVIA.len())];
                MissionKind::Trivia {
                    question: card.question.to_string(),
                    answer: card.answer.to_string(),
                    options: card.options.iter().map(|o| o.to_string()).collect(),
                }
            }
            MissionType::Grid => MissionKind::Grid {
                pattern: (0..GRID_PATTERN_LEN)
                    .map(|_| self.rng.random_range(0..GRID_CELLS))
                    .collect(),
            },
        }
    }
}

/// Background generation task. Dropping it leaves the job running;
/// [`Generation::cancel`] stops it between missions.
pub struct Generation {
    pub handle: tokio::task::JoinHandle<MissionRegistry>,
    cancel: Arc<AtomicBool>,
}

impl Generation {
    /// Ask the job to stop and discard its result
    pub fn cancel(self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Batch generation off the console task.
///
/// Works on a copy of `registry` and hands back the extended registry; the
/// caller swaps it in when the task completes. Nothing else adds missions, so
/// the swap cannot lose entries.
pub fn spawn_generation(registry: MissionRegistry, count: usize, seed: Option<u64>) -> Generation {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let handle = tokio::task::spawn_blocking(move || {
        let mut registry = registry;
        let started = std::time::Instant::now();
        let added = MissionGenerator::from_seed(seed).generate_until(&mut registry, count, &flag);
        tracing::info!(
            added,
            total = registry.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Mission generator finished"
        );
        registry
    });
    Generation { handle, cancel }
}
