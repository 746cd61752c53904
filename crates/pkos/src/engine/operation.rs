//! Mission Engine: the single timed operation state machine.
//!
//! `Idle -> Active` only through [`MissionEngine::start`]. Every way out
//! (timeout, exfiltration, explicit stop) goes through [`MissionEngine::stop`],
//! which cancels the countdown and any running upload.

use pkos_common::Mission;
use pkos_common::constants::{DEEP_WEB_OP, ENGINE_TICK_MS, UPLOAD_STEP_MS};

use super::scheduler::{Job, Scheduler, TimerId};
use crate::economy::UpgradeEffects;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Operation already in progress.")]
    AlreadyActive,
    #[error("Error: Invalid Upload Code.")]
    InvalidUploadCode,
    #[error("Upload already in progress.")]
    UploadInProgress,
}

#[derive(Debug, Clone)]
struct Upload {
    progress: u32,
    timer: TimerId,
}

/// The running operation
#[derive(Debug, Clone)]
pub struct Operation {
    mission: Mission,
    stage: u32,
    timer: i64,
    trace: u32,
    shield_used: u32,
    objective: String,
    tick: TimerId,
    upload: Option<Upload>,
}

impl Operation {
    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// Seconds left
    pub fn timer(&self) -> i64 {
        self.timer
    }

    pub fn trace(&self) -> u32 {
        self.trace
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn upload_progress(&self) -> Option<u32> {
        self.upload.as_ref().map(|u| u.progress)
    }

    /// One-line status, e.g. `OPERATION: DEEP_WEB | 4:59 | OBJ: ... | TRACE: 0%`
    pub fn hud(&self) -> String {
        let secs = self.timer.max(0);
        format!(
            "OPERATION: {} | {}:{:02} | OBJ: {} | TRACE: {}%",
            self.mission.id.to_uppercase(),
            secs / 60,
            secs % 60,
            self.objective,
            self.trace
        )
    }
}

/// Result of one countdown tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running { timer: i64 },
    /// Timer ran out; the operation was stopped with failure
    Expired { message: String },
}

/// Result of one upload step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Idle,
    Progress { progress: u32, trace: u32 },
    /// Upload reached 100%; the operation was stopped with success
    Complete {
        mission: Mission,
        trace: u32,
        message: String,
    },
}

#[derive(Debug, Default)]
pub struct MissionEngine {
    op: Option<Operation>,
}

impl MissionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.op.is_some()
    }

    pub fn current(&self) -> Option<&Operation> {
        self.op.as_ref()
    }

    pub fn start(&mut self, mission: &Mission, scheduler: &mut Scheduler) -> Result<String, EngineError> {
        if self.op.is_some() {
            return Err(EngineError::AlreadyActive);
        }

        let objective = if mission.id == DEEP_WEB_OP {
            "Scan network for entry point.".to_string()
        } else {
            format!("Scan network to locate {}", mission.domain)
        };
        let tick = scheduler.schedule_every(ENGINE_TICK_MS, Job::EngineTick);

        self.op = Some(Operation {
            mission: mission.clone(),
            stage: 1,
            timer: i64::from(mission.duration()),
            trace: 0,
            shield_used: 0,
            objective,
            tick,
            upload: None,
        });

        tracing::info!(mission_id = %mission.id, duration = mission.duration(), "Operation started");
        Ok(format!("OPERATION {} INITIATED. GOOD LUCK.", mission.id.to_uppercase()))
    }

    /// Back to idle. Safe to call when already idle.
    pub fn stop(&mut self, success: bool, scheduler: &mut Scheduler) -> String {
        if let Some(op) = self.op.take() {
            scheduler.cancel(op.tick);
            if let Some(upload) = op.upload {
                scheduler.cancel(upload.timer);
            }
            tracing::info!(
                mission_id = %op.mission.id,
                success,
                trace = op.trace,
                timer = op.timer,
                "Operation stopped"
            );
        }

        if success {
            "OPERATION COMPLETE. SYSTEM WIPE INITIATED...".to_string()
        } else {
            "OPERATION FAILED. CONNECTION TERMINATED.".to_string()
        }
    }

    pub fn tick(&mut self, scheduler: &mut Scheduler) -> TickOutcome {
        let Some(op) = self.op.as_mut() else {
            return TickOutcome::Idle;
        };

        op.timer -= 1;
        if op.timer <= 0 {
            tracing::warn!(mission_id = %op.mission.id, "Operation timed out");
            let message = self.stop(false, scheduler);
            return TickOutcome::Expired { message };
        }
        TickOutcome::Running { timer: op.timer }
    }

    /// Deferred half of `scan_network`; only advances from stage 1
    pub fn scan_complete(&mut self) -> Vec<String> {
        let Some(op) = self.op.as_mut() else {
            return Vec::new();
        };
        if op.stage != 1 || !op.mission.is_timed() {
            return Vec::new();
        }

        op.stage = 2;
        if op.mission.id == DEEP_WEB_OP {
            op.objective = format!("Hack Employee Portal ({})", op.mission.domain);
            vec![
                format!("Found: {} (HIDDEN) - PORT 80 OPEN", op.mission.ip),
                format!("Resolving hostname... {}", op.mission.domain),
            ]
        } else {
            op.objective = format!("Infiltrate {}", op.mission.domain);
            vec![
                format!("Found: {} (TARGET) - PORT 80 OPEN", op.mission.ip),
                format!("Resolving hostname... {}", op.mission.domain),
            ]
        }
    }

    /// Start exfiltration if `code` is the active mission's upload code
    pub fn begin_upload(&mut self, code: &str, scheduler: &mut Scheduler) -> Result<String, EngineError> {
        let op = self
            .op
            .as_mut()
            .filter(|op| op.mission.upload_code == code)
            .ok_or(EngineError::InvalidUploadCode)?;

        if op.upload.is_some() {
            return Err(EngineError::UploadInProgress);
        }

        let timer = scheduler.schedule_every(UPLOAD_STEP_MS, Job::UploadStep);
        op.upload = Some(Upload { progress: 0, timer });

        if op.mission.id == DEEP_WEB_OP {
            Ok("Uploading PROJECT GENESIS...".to_string())
        } else {
            Ok("Uploading Mission Loot...".to_string())
        }
    }

    /// Advance the upload by one step. Upgrade effects are read fresh each call.
    pub fn upload_step(&mut self, effects: UpgradeEffects, scheduler: &mut Scheduler) -> UploadOutcome {
        let Some(op) = self.op.as_mut() else {
            return UploadOutcome::Idle;
        };
        let Some(upload) = op.upload.as_mut() else {
            return UploadOutcome::Idle;
        };

        upload.progress = (upload.progress + effects.upload_step_pct).min(100);
        let progress = upload.progress;

        let absorbed = effects
            .trace_per_step
            .min(effects.trace_shield.saturating_sub(op.shield_used));
        op.shield_used += absorbed;
        op.trace += effects.trace_per_step - absorbed;

        if progress < 100 {
            return UploadOutcome::Progress {
                progress,
                trace: op.trace,
            };
        }

        let mission = op.mission.clone();
        let trace = op.trace;
        let message = self.stop(true, scheduler);
        UploadOutcome::Complete {
            mission,
            trace,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::missions::MissionRegistry;
    use pkos_common::MissionKind;

    fn deep_web() -> Mission {
        MissionRegistry::with_catalog().get(DEEP_WEB_OP).unwrap().clone()
    }

    fn timed(duration: u32) -> Mission {
        let mut mission = deep_web();
        mission.id = "op_3".into();
        mission.domain = "voidgate12.io".into();
        mission.ip = "192.168.40.4".into();
        mission.upload_code = "UP_00BEEF".into();
        mission.kind = MissionKind::Timed { duration };
        mission
    }

    /// Run due jobs through the engine the way the session does
    fn run(engine: &mut MissionEngine, scheduler: &mut Scheduler, until: u64) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        while let Some((_, job)) = scheduler.pop_due(until) {
            if job == Job::EngineTick {
                outcomes.push(engine.tick(scheduler));
            }
        }
        scheduler.settle(until);
        outcomes
    }

    #[test]
    fn test_start_is_guarded() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();

        assert_eq!(
            engine.start(&deep_web(), &mut scheduler).unwrap(),
            "OPERATION DEEP_WEB INITIATED. GOOD LUCK."
        );
        assert_eq!(
            engine.start(&timed(200), &mut scheduler),
            Err(EngineError::AlreadyActive)
        );
        assert_eq!(engine.current().unwrap().mission().id, DEEP_WEB_OP);

        engine.stop(false, &mut scheduler);
        assert!(!engine.is_active());
        assert_eq!(scheduler.pending(), 0);
        assert!(engine.start(&timed(200), &mut scheduler).is_ok());
    }

    #[test]
    fn test_timer_expires_exactly_once() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();
        engine.start(&timed(3), &mut scheduler).unwrap();

        let outcomes = run(&mut engine, &mut scheduler, 10_000);
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Running { timer: 2 },
                TickOutcome::Running { timer: 1 },
                TickOutcome::Expired {
                    message: "OPERATION FAILED. CONNECTION TERMINATED.".into()
                },
            ]
        );
        assert!(!engine.is_active());
    }

    #[test]
    fn test_scan_only_advances_stage_one() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();
        engine.start(&deep_web(), &mut scheduler).unwrap();
        assert_eq!(engine.current().unwrap().objective(), "Scan network for entry point.");

        let lines = engine.scan_complete();
        assert_eq!(lines[0], "Found: 10.0.0.66 (HIDDEN) - PORT 80 OPEN");
        assert_eq!(engine.current().unwrap().stage(), 2);
        assert_eq!(
            engine.current().unwrap().objective(),
            "Hack Employee Portal (portal.dark.net)"
        );
        assert!(engine.scan_complete().is_empty());
    }

    #[test]
    fn test_generated_timed_objectives() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();
        engine.start(&timed(200), &mut scheduler).unwrap();
        assert_eq!(
            engine.current().unwrap().objective(),
            "Scan network to locate voidgate12.io"
        );
        engine.scan_complete();
        assert_eq!(engine.current().unwrap().objective(), "Infiltrate voidgate12.io");
        assert!(engine.current().unwrap().hud().starts_with("OPERATION: OP_3 | 3:20"));
    }

    #[test]
    fn test_upload_completes_and_stops() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();
        engine.start(&timed(200), &mut scheduler).unwrap();

        assert_eq!(
            engine.begin_upload("WRONG", &mut scheduler),
            Err(EngineError::InvalidUploadCode)
        );
        assert_eq!(
            engine.begin_upload("UP_00BEEF", &mut scheduler).unwrap(),
            "Uploading Mission Loot..."
        );
        assert_eq!(
            engine.begin_upload("UP_00BEEF", &mut scheduler),
            Err(EngineError::UploadInProgress)
        );

        let effects = UpgradeEffects::default();
        let mut last = UploadOutcome::Idle;
        for _ in 0..20 {
            last = engine.upload_step(effects, &mut scheduler);
        }
        match last {
            UploadOutcome::Complete { mission, trace, .. } => {
                assert_eq!(mission.id, "op_3");
                assert_eq!(trace, 40);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(!engine.is_active());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_upgrades_read_each_step() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();
        engine.start(&timed(200), &mut scheduler).unwrap();
        engine.begin_upload("UP_00BEEF", &mut scheduler).unwrap();

        let base = UpgradeEffects::default();
        assert_eq!(
            engine.upload_step(base, &mut scheduler),
            UploadOutcome::Progress { progress: 5, trace: 2 }
        );

        // VPN bought mid-upload
        let vpn = UpgradeEffects {
            trace_per_step: 1,
            ..base
        };
        assert_eq!(
            engine.upload_step(vpn, &mut scheduler),
            UploadOutcome::Progress { progress: 10, trace: 3 }
        );

        let kitted = UpgradeEffects {
            trace_per_step: 1,
            upload_step_pct: 10,
            trace_shield: 20,
        };
        assert_eq!(
            engine.upload_step(kitted, &mut scheduler),
            UploadOutcome::Progress { progress: 20, trace: 3 }
        );
    }

    #[test]
    fn test_stealth_shield_absorbs_first_points() {
        let mut scheduler = Scheduler::new();
        let mut engine = MissionEngine::new();
        engine.start(&timed(200), &mut scheduler).unwrap();
        engine.begin_upload("UP_00BEEF", &mut scheduler).unwrap();

        let effects = UpgradeEffects {
            trace_shield: 20,
            ..UpgradeEffects::default()
        };
        let mut trace = 0;
        for _ in 0..12 {
            if let UploadOutcome::Progress { trace: t, .. } = engine.upload_step(effects, &mut scheduler) {
                trace = t;
            }
        }
        // 12 steps x 2 = 24 points, 20 absorbed
        assert_eq!(trace, 4);
    }
}
