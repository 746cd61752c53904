//! Session state and the deferred-job runner.
//!
//! `GameState` is the one context object every command and job runs against.
//! It owns the durable store for the lifetime of the session; a reset hands
//! the store back so the next session can be built on top of it.

use pkos_common::constants::{
    CRASH_RELOAD_MS, DEEP_WEB_OP, DEEP_WEB_WIPE_DELAY_MS, OMEGA_UPLOAD_STEP_MS, OMEGA_WIPE_DELAY_MS,
    THEME_FLASH_MS, UPTIME_TICK_MS, store_keys,
};
use pkos_common::{Mission, Theme};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::achievements::{AchievementLedger, Event};
use crate::config::AppConfig;
use crate::economy::{BlackMarket, Wallet};
use crate::engine::{Job, MissionEngine, Scheduler, TickOutcome, TimerId, UploadOutcome};
use crate::fs::FileSystem;
use crate::missions::MissionRegistry;
use crate::puzzles::{PuzzleSession, SandboxEnv};
use crate::rewards::{GrantSource, Inbox, RewardDispatcher};
use crate::store::KvStore;

/// Why the session has to be rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    Reboot,
    Timeout,
    Crash,
    AchievementsReset,
}

/// Everything a session mutates
pub struct GameState {
    pub config: AppConfig,
    store: Box<dyn KvStore>,
    pub registry: MissionRegistry,
    pub scheduler: Scheduler,
    pub engine: MissionEngine,
    pub wallet: Wallet,
    pub market: BlackMarket,
    pub fs: FileSystem,
    pub ledger: AchievementLedger,
    pub session: Option<PuzzleSession>,
    pub rng: StdRng,
    inbox: Inbox,
    dispatcher: RewardDispatcher,
    theme: Theme,
    theme_timer: Option<TimerId>,
    omega_upload: Option<(u32, TimerId)>,
    output: Vec<String>,
    pending_reset: Option<ResetReason>,
}

impl GameState {
    /// Start a session on top of `store`
    pub fn boot(config: AppConfig, mut store: Box<dyn KvStore>, registry: MissionRegistry) -> Self {
        let ledger = AchievementLedger::load(store.as_mut());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut state = Self {
            config,
            store,
            registry,
            scheduler: Scheduler::new(),
            engine: MissionEngine::new(),
            wallet: Wallet::default(),
            market: BlackMarket::new(),
            fs: FileSystem::new(),
            ledger,
            session: None,
            rng,
            inbox: Inbox::new(),
            dispatcher: RewardDispatcher,
            theme: Theme::default(),
            theme_timer: None,
            omega_upload: None,
            output: Vec::new(),
            pending_reset: None,
        };

        state.scheduler.schedule_every(UPTIME_TICK_MS, Job::UptimeTick);
        if !state.ledger.restored() {
            state.record(Event::FirstBoot);
        }
        state.record(Event::Boot);

        tracing::info!(
            missions = state.registry.len(),
            unlocked = state.ledger.unlocked_count(),
            "Session booted"
        );
        state
    }

    /// Hand the store back for the next session
    pub fn into_store(self) -> Box<dyn KvStore> {
        self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        self.store.as_mut()
    }

    pub fn print(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    pub fn print_all(&mut self, lines: impl IntoIterator<Item = String>) {
        self.output.extend(lines);
    }

    /// Drain everything printed since the last call
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn pending_reset(&self) -> Option<ResetReason> {
        self.pending_reset
    }

    /// First request wins
    pub fn request_reset(&mut self, reason: ResetReason) {
        if self.pending_reset.is_none() {
            tracing::info!(reason = ?reason, "Session reset requested");
            self.pending_reset = Some(reason);
        }
    }

    /// Feed the ledger and print a notification per new unlock
    pub fn record(&mut self, event: Event<'_>) {
        let unlocked = self.ledger.record(event, self.store.as_mut());
        for def in unlocked {
            self.output
                .push(format!("[ACHIEVEMENT UNLOCKED] {}: {}", def.title, def.desc));
        }
    }

    /// Player's best Snake score, read from shared storage
    pub fn high_score(&mut self) -> u32 {
        match self.store.get(store_keys::HIGH_SCORE) {
            Ok(value) => value.and_then(|v| v.trim().parse().ok()).unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read high score");
                0
            }
        }
    }

    pub fn sandbox_env(&mut self) -> SandboxEnv {
        SandboxEnv {
            high_score: self.high_score(),
        }
    }

    /// Open a puzzle page for `mission`
    pub fn open_session(&mut self, mission: &Mission) -> &mut PuzzleSession {
        self.session.insert(PuzzleSession::open(mission, self.inbox.port()))
    }

    pub fn omega_upload_running(&self) -> bool {
        self.omega_upload.is_some()
    }

    pub fn start_omega_upload(&mut self) {
        let timer = self
            .scheduler
            .schedule_every(OMEGA_UPLOAD_STEP_MS, Job::OmegaUploadStep);
        self.omega_upload = Some((0, timer));
    }

    /// Swap in a registry extended by the background generator
    pub fn install_registry(&mut self, registry: MissionRegistry) {
        tracing::debug!(before = self.registry.len(), after = registry.len(), "Registry updated");
        self.registry = registry;
    }

    /// Move the virtual clock forward, running every job that falls due
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now() + ms;
        while let Some((_, job)) = self.scheduler.pop_due(until) {
            self.run_job(job);
            self.process_inbox();
        }
        self.scheduler.settle(until);
    }

    fn run_job(&mut self, job: Job) {
        match job {
            Job::EngineTick => {
                if let TickOutcome::Expired { message } = self.engine.tick(&mut self.scheduler) {
                    self.print(message);
                    self.print("MISSION FAILED: TIME EXPIRED");
                    self.request_reset(ResetReason::Timeout);
                }
            }
            Job::UploadStep => {
                let effects = self.market.effects();
                match self.engine.upload_step(effects, &mut self.scheduler) {
                    UploadOutcome::Idle => {}
                    UploadOutcome::Progress { progress, trace } => {
                        self.print(format!("Progress: {}%", progress));
                        self.record(Event::TraceObserved(trace));
                    }
                    UploadOutcome::Complete {
                        mission,
                        trace,
                        message,
                    } => {
                        self.print("Progress: 100%");
                        self.record(Event::TraceObserved(trace));
                        self.print(message);
                        self.complete_upload(&mission);
                    }
                }
            }
            Job::OmegaUploadStep => self.omega_upload_step(),
            Job::ScanComplete => {
                self.print("Found: 192.168.0.1 (Gateway)");
                self.print("Found: 192.168.0.105 (Self)");
                let lines = self.engine.scan_complete();
                self.print_all(lines);
            }
            Job::DecryptComplete => {
                self.print("KEY ACCEPTED.");
                self.print("Decryption Successful.");
                self.print("Output: payload_decrypted.txt");
                self.fs.write_root_file(
                    "payload_decrypted.txt",
                    "PROJECT OMEGA-9\n\nUPLOAD CODE: OMEGA-9\n\nWARNING: UPLOADING THIS CODE WILL TRIGGER A SYSTEM WIPE TO COVER TRACKS."
                        .to_string(),
                );
            }
            Job::PingReply(line) => self.print(line),
            Job::ThemeRestore => {
                self.theme = Theme::default();
                self.theme_timer = None;
            }
            Job::UptimeTick => self.record(Event::UptimeTick),
            Job::Crash => self.crash(),
            Job::Reload => self.request_reset(ResetReason::Crash),
        }
    }

    fn omega_upload_step(&mut self) {
        let Some((progress, timer)) = self.omega_upload.as_mut() else {
            return;
        };
        *progress = (*progress + 10).min(100);
        let (progress, timer) = (*progress, *timer);

        self.print(format!("Progress: {}%", progress));
        if progress >= 100 {
            self.scheduler.cancel(timer);
            self.omega_upload = None;
            self.print("UPLOAD COMPLETE.");
            self.print("INITIATING TRACE CLEANUP...");
            self.scheduler.schedule(OMEGA_WIPE_DELAY_MS, Job::Crash);
        }
    }

    fn complete_upload(&mut self, mission: &Mission) {
        self.record(Event::UploadComplete);
        self.record(Event::HackComplete);

        if mission.id == DEEP_WEB_OP {
            self.scheduler.schedule(DEEP_WEB_WIPE_DELAY_MS, Job::Crash);
            return;
        }

        let payout = mission.payout();
        let balance = self.wallet.deposit(payout);
        self.print(format!("MISSION COMPLETE. {} CREDITS TRANSFERRED.", payout));
        self.record(Event::CreditsChanged(balance));

        self.dispatcher.grant(mission, GrantSource::Upload, &mut self.fs);
        self.flash_theme(mission.theme);
    }

    /// Validate and apply every message the sandbox posted
    pub fn process_inbox(&mut self) {
        for message in self.inbox.drain() {
            let Some(mission) = self
                .dispatcher
                .validate(&message, &self.registry)
                .cloned()
            else {
                continue;
            };

            let grant = self.dispatcher.grant(&mission, GrantSource::Puzzle, &mut self.fs);
            self.print(format!("[SYSTEM] {} DOWNLOADED.", grant.reward.to_uppercase()));
            self.flash_theme(mission.theme);

            if grant.created {
                let payout = mission.payout();
                let balance = self.wallet.deposit(payout);
                self.print(format!("{} CREDITS TRANSFERRED.", payout));
                self.record(Event::HackComplete);
                self.record(Event::CreditsChanged(balance));
            }
        }
    }

    fn flash_theme(&mut self, theme: Theme) {
        if let Some(timer) = self.theme_timer.take() {
            self.scheduler.cancel(timer);
        }
        self.theme = theme;
        self.theme_timer = Some(self.scheduler.schedule(THEME_FLASH_MS, Job::ThemeRestore));
    }

    /// Blue screen; the session reloads after a short hold
    pub fn crash(&mut self) {
        tracing::warn!("System crash");
        self.print(":( Your PC ran into a problem and needs to restart.");
        self.print("STOP CODE: CRITICAL_PROCESS_DIED");
        self.record(Event::SystemCrash);
        self.scheduler.schedule(CRASH_RELOAD_MS, Job::Reload);
    }
}
