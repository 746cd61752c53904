//! Command dispatch against the session state.

use pkos_common::Mission;
use pkos_common::constants::{DECRYPT_DELAY_MS, PING_REPLY_MS, SCAN_DELAY_MS, store_keys};
use rand::Rng;

use super::command::{Command, SnakeRound};
use crate::achievements::Event;
use crate::engine::Job;
use crate::state::{GameState, ResetReason};

const HELP: &str = "cmds: ls, cd, cat, mkdir, touch, rm, clear, reboot, snake, matrix, market, wallet, \
                    ping, connect, disconnect, solve, play, tune, login, decrypt, upload, start_op, random, \
                    contracts, scan_network, status, note, music, achievements, del system32";

const OMEGA_UPLOAD_CODE: &str = "OMEGA-9";
const ENCRYPTED_PAYLOAD: &str = "encrypted_payload.dat";
const PAYLOAD_PASSWORD: &str = "india";

const TRACKS: [(&str, &str); 3] = [
    ("Cyber Chase", "Neon Grid"),
    ("Night City", "Synthwave"),
    ("Mainframe", "Hacker"),
];

/// Run one console line. Output is buffered on `state`.
pub fn handle(state: &mut GameState, line: &str) {
    let command = Command::parse(line);
    if command == Command::Empty {
        return;
    }

    state.record(Event::CommandRun);
    state.record(Event::Spam(line.trim()));

    match command {
        Command::Empty => {}
        Command::Help => {
            state.print(HELP);
            state.record(Event::SysAdmin);
        }
        Command::Clear => {
            state.print("\x1B[2J\x1B[H");
            state.record(Event::ClearTerm);
        }
        Command::Reboot => state.request_reset(ResetReason::Reboot),
        Command::Ls => match state.fs.ls() {
            Ok(entries) => state.print(entries.join("  ")),
            Err(e) => state.print(e),
        },
        Command::Cd(Some(dir)) => match state.fs.cd(dir) {
            Ok(()) => {
                let pwd = state.fs.pwd();
                state.print(pwd);
                state.record(Event::DirChange(dir));
                if dir == "projects" {
                    state.record(Event::CheckProjects);
                }
            }
            Err(e) => state.print(e),
        },
        Command::Cat(Some(name)) => match state
            .fs
            .cat(name)
            .map(|content| content.lines().map(str::to_string).collect::<Vec<_>>())
        {
            Ok(lines) => {
                state.print_all(lines);
                match name {
                    "about.txt" => state.record(Event::CheckId),
                    "skills.md" => state.record(Event::CheckSkills),
                    _ => {}
                }
            }
            Err(e) => state.print(e),
        },
        Command::Mkdir(Some(name)) => {
            if let Err(e) = state.fs.mkdir(name) {
                state.print(e);
            }
        }
        Command::Touch(Some(name)) => {
            if state.fs.touch(name) {
                state.record(Event::FileCreated);
            }
        }
        Command::Rm(Some(name)) => match state.fs.rm(name) {
            Ok(()) => state.record(Event::FileDeleted),
            Err(e) => state.print(e),
        },
        Command::Cd(None) => state.print("Usage: cd <dir>"),
        Command::Cat(None) => state.print("Usage: cat <file>"),
        Command::Mkdir(None) => state.print("Usage: mkdir <name>"),
        Command::Touch(None) => state.print("Usage: touch <name>"),
        Command::Rm(None) => state.print("Usage: rm <name>"),
        Command::DeleteSystem32 => state.crash(),
        Command::Ping(target) => ping(state, target.unwrap_or("")),
        Command::Connect(target) => connect(state, target.unwrap_or("")),
        Command::Disconnect => match state.session.take() {
            Some(session) => state.print(format!("Connection to {} closed.", session.mission_id())),
            None => state.print("No active connection."),
        },
        Command::Decrypt { file, password } => decrypt(state, file, password),
        Command::Upload(code) => upload(state, code.unwrap_or("")),
        Command::StartOp(id) => match id.and_then(|id| state.registry.get(id)).cloned() {
            Some(mission) => launch(state, &mission),
            None => {
                state.print("Usage: start_op <operation_id>");
                state.print("Example: start_op deep_web");
            }
        },
        Command::Random => random(state),
        Command::Contracts(page) => contracts(state, page),
        Command::Wallet => {
            let credits = state.wallet.credits();
            state.print(format!("CREDITS: {}", credits));
        }
        Command::Market => {
            state.print("--- BLACK MARKET ---");
            state.record(Event::CheckMarket);
            let listing = state.market.listing();
            state.print_all(listing);
            state.print("Usage: market buy <item_id>");
        }
        Command::MarketBuy(id) => {
            let result = state
                .market
                .buy(id, &mut state.wallet)
                .map(|upgrade| upgrade.name);
            match result {
                Ok(name) => {
                    state.print(format!("Purchased {}.", name));
                    let all_owned = state.market.all_owned();
                    state.record(Event::ItemBought { all_owned });
                }
                Err(e) => state.print(e.to_string()),
            }
        }
        Command::ScanNetwork => {
            state.print("Scanning local subnet...");
            state.scheduler.schedule(SCAN_DELAY_MS, Job::ScanComplete);
        }
        Command::Status => {
            let status = state
                .engine
                .current()
                .map(|op| (op.hud(), op.upload_progress()));
            match status {
                Some((hud, upload)) => {
                    state.print(hud);
                    if let Some(progress) = upload {
                        state.print(format!("UPLOAD: {}%", progress));
                    }
                }
                None => state.print("No active operation."),
            }
        }
        Command::ResetAchievements => {
            if let Err(e) = state.store_mut().remove(store_keys::ACHIEVEMENTS) {
                tracing::warn!(error = %e, "Failed to clear achievements");
            }
            state.request_reset(ResetReason::AchievementsReset);
        }
        Command::TestNotification => {
            state.print("[ACHIEVEMENT UNLOCKED] Test Achievement: This is a test.")
        }
        Command::Snake(round) => snake(state, round),
        Command::Sudo => {
            state.print("Permission denied. This incident will be reported.");
            state.record(Event::RootAttempt);
        }
        Command::Note(text) => note(state, text),
        Command::Solve(input) => {
            let env = state.sandbox_env();
            with_session(state, |session| session.solve(input, env));
        }
        Command::Play => with_session(state, |session| session.play()),
        Command::Tune(hz) => with_session(state, |session| session.tune(hz)),
        Command::Login(raw) => with_session(state, |session| session.login(raw)),
        Command::Achievements => achievements(state),
        Command::Music(track) => {
            let (title, artist) = TRACKS[(track as usize - 1).min(TRACKS.len() - 1)];
            state.record(Event::WindowOpened("media"));
            state.print(format!("Now playing: {} - {}", title, artist));
            state.record(Event::MusicLover);
            state.record(Event::TrackPlayed(track));
        }
        Command::Matrix => {
            state.print("Wake up, Operator... The Matrix has you.");
            state.record(Event::GlitchMatrix);
        }
        Command::Konami => {
            state.print("30 LIVES GRANTED.");
            state.record(Event::Konami);
        }
        Command::Usage(usage) => state.print(format!("Usage: {}", usage)),
        Command::Unknown(verb) => {
            state.print(format!("Unknown command: {}", verb));
            state.record(Event::InvalidCommand);
        }
    }

    state.process_inbox();
}

fn ping(state: &mut GameState, domain: &str) {
    let Some(ip) = state.registry.find_by_domain(domain).map(|m| m.ip.clone()) else {
        state.print(format!(
            "Ping request could not find host {}. Please check the name and try again.",
            domain
        ));
        return;
    };

    state.print(format!("Pinging {} [{}] with 32 bytes of data:", domain, ip));
    for (i, time) in [12, 15, 11].into_iter().enumerate() {
        let reply = format!("Reply from {}: bytes=32 time={}ms TTL=54", ip, time);
        state
            .scheduler
            .schedule(PING_REPLY_MS * (i as u64 + 1), Job::PingReply(reply));
    }
}

fn connect(state: &mut GameState, target: &str) {
    let Some(mission) = state.registry.resolve_target(target).cloned() else {
        state.print(format!("Connection to {} failed. Target unreachable.", target));
        return;
    };

    state.print(format!(
        "Initiating secure connection to {}...",
        mission.domain.to_uppercase()
    ));
    state.record(Event::WindowOpened("browser"));
    let page = state.open_session(&mission).render();
    state.print_all(page);
}

fn decrypt(state: &mut GameState, file: Option<&str>, password: Option<&str>) {
    let Some(file) = file else {
        state.print("Usage: decrypt <file> <password>");
        return;
    };
    if !state.fs.exists_here(file) {
        state.print(format!("decrypt: {}: No such file", file));
        return;
    }
    if file != ENCRYPTED_PAYLOAD {
        state.print("Error: File is not encrypted.");
        return;
    }

    if password.is_some_and(|p| p.eq_ignore_ascii_case(PAYLOAD_PASSWORD)) {
        state.print("Verifying key...");
        state.scheduler.schedule(DECRYPT_DELAY_MS, Job::DecryptComplete);
    } else {
        state.print("Error: Incorrect Password.");
        state.print("Hint: The Creator's Location (Check Identity)");
    }
}

fn upload(state: &mut GameState, code: &str) {
    if code == OMEGA_UPLOAD_CODE {
        if state.omega_upload_running() {
            state.print("Upload already in progress.");
            return;
        }
        state.print("Uploading Project OMEGA-9...");
        state.start_omega_upload();
        return;
    }

    match state.engine.begin_upload(code, &mut state.scheduler) {
        Ok(message) => state.print(message),
        Err(e) => state.print(e.to_string()),
    }
}

/// Timed missions start the engine; everything else is a browser target
fn launch(state: &mut GameState, mission: &Mission) {
    if mission.is_timed() {
        match state.engine.start(mission, &mut state.scheduler) {
            Ok(message) => state.print(message),
            Err(e) => state.print(e.to_string()),
        }
    } else {
        state.print(format!(
            "Operation {} is a {} Mission.",
            mission.title,
            mission.mission_type().as_str().to_uppercase()
        ));
        state.print(format!(
            "Use 'connect {}' or 'connect {}' to begin.",
            mission.ip, mission.domain
        ));
    }
}

fn random(state: &mut GameState) {
    let ids = state.registry.generated_ids();
    if ids.is_empty() {
        state.print("No contracts available yet.");
        return;
    }
    let pick = ids[state.rng.random_range(0..ids.len())].to_string();
    let Some(mission) = state.registry.get(&pick).cloned() else {
        return;
    };
    state.print(format!("Selecting random target... {}", mission.title));
    launch(state, &mission);
}

fn contracts(state: &mut GameState, page: usize) {
    let page_size = state.config.contracts_page_size;
    let missions = state.registry.sorted();
    let total_pages = missions.len().div_ceil(page_size);

    if page > total_pages {
        let message = format!("Page {} does not exist. Total pages: {}", page, total_pages);
        state.print(message);
        return;
    }

    let mut lines = vec![
        format!("--- AVAILABLE CONTRACTS (Page {}/{}) ---", page, total_pages),
        "ID           | TITLE                          | TARGET          | TYPE".to_string(),
        "-".repeat(70),
    ];
    for m in missions.iter().skip((page - 1) * page_size).take(page_size) {
        lines.push(format!(
            "{:<12} | {:<30} | {:<15} | {:<10}",
            m.id,
            m.title.replacen("OPERATION ", "", 1),
            m.ip,
            m.mission_type().as_str().to_uppercase()
        ));
    }
    lines.push("-".repeat(70));
    lines.push(format!("Type 'contracts {}' for next page.", page + 1));
    state.print_all(lines);
}

fn snake(state: &mut GameState, round: Option<SnakeRound>) {
    state.record(Event::WindowOpened("snake"));
    let high_score = state.high_score();

    let Some(round) = round else {
        state.print("ARCADE: SNAKE");
        state.print(format!("HIGH SCORE: {}", high_score));
        state.print("Report a finished round: snake <score> [seconds]");
        return;
    };

    if round.seconds > 0 {
        state.record(Event::SnakeTime(round.seconds));
    }
    state.record(Event::SnakeScore(round.score));
    state.record(Event::SnakeDeath);

    let best = if round.score > high_score {
        if let Err(e) = state
            .store_mut()
            .set(store_keys::HIGH_SCORE, &round.score.to_string())
        {
            tracing::warn!(error = %e, "Failed to save high score");
        }
        round.score
    } else {
        high_score
    };

    state.print(format!("GAME OVER. SCORE: {}", round.score));
    state.print(format!("HIGH SCORE: {}", best));
}

fn note(state: &mut GameState, text: Option<&str>) {
    state.record(Event::WindowOpened("notepad"));
    match text {
        Some(text) => match state.store_mut().set(store_keys::NOTEPAD, text) {
            Ok(()) => state.print("SAVED"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save notepad");
                state.print("SAVE FAILED");
            }
        },
        None => {
            let content = state
                .store_mut()
                .get(store_keys::NOTEPAD)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to read notepad");
                    None
                })
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "(empty)".to_string());
            let lines: Vec<String> = content.lines().map(str::to_string).collect();
            state.print_all(lines);
        }
    }
}

fn achievements(state: &mut GameState) {
    state.record(Event::WindowOpened("achievements"));

    let mut lines = vec![format!(
        "ACHIEVEMENTS: {}/{}",
        state.ledger.unlocked_count(),
        state.ledger.total()
    )];
    for view in state.ledger.views() {
        let mark = if view.unlocked { "x" } else { " " };
        let mut line = format!("[{}] {} - {}", mark, view.def.title, view.def.desc);
        match (view.unlock_date, view.progress, view.def.target) {
            (Some(date), _, _) => line.push_str(&format!(" (Unlocked: {})", date)),
            (None, Some(progress), Some(target)) => {
                line.push_str(&format!(" (Progress: {}/{})", progress, target))
            }
            _ => {}
        }
        lines.push(line);
    }
    state.print_all(lines);
}

/// Route puzzle input to the open page
fn with_session<F>(state: &mut GameState, f: F)
where
    F: FnOnce(&mut crate::puzzles::PuzzleSession) -> Vec<String>,
{
    match state.session.as_mut() {
        Some(session) => {
            let lines = f(session);
            state.print_all(lines);
        }
        None => state.print("No active connection. Use 'connect <ip>' first."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::missions::{MissionGenerator, MissionRegistry};
    use crate::store::MemoryStore;
    use pkos_common::constants::{OMEGA_UPLOAD_STEP_MS, OMEGA_WIPE_DELAY_MS};

    fn boot_with(registry: MissionRegistry) -> GameState {
        let mut state = GameState::boot(
            AppConfig {
                seed: Some(11),
                ..AppConfig::default()
            },
            Box::new(MemoryStore::default()),
            registry,
        );
        state.take_output();
        state
    }

    fn boot() -> GameState {
        boot_with(MissionRegistry::with_catalog())
    }

    fn run(state: &mut GameState, line: &str) -> Vec<String> {
        handle(state, line);
        state.take_output()
    }

    #[test]
    fn test_unknown_command_counts_once() {
        let mut state = boot();
        let out = run(&mut state, "hack_the_planet now");
        assert_eq!(out, vec!["Unknown command: hack_the_planet".to_string()]);
        assert_eq!(state.ledger.get("lost").unwrap().progress, Some(1));

        run(&mut state, "help");
        assert_eq!(state.ledger.get("lost").unwrap().progress, Some(1));
        assert!(state.ledger.is_unlocked("sys_admin"));
    }

    #[test]
    fn test_empty_line_is_ignored() {
        let mut state = boot();
        assert!(run(&mut state, "   ").is_empty());
        assert_eq!(state.ledger.get("terminal_junkie").unwrap().progress, Some(0));
    }

    #[test]
    fn test_contracts_pagination() {
        let mut registry = MissionRegistry::with_catalog();
        let mut generator = MissionGenerator::from_seed(Some(3));
        generator.generate(&mut registry, 999);
        assert_eq!(registry.len(), 1010);
        let mut state = boot_with(registry);

        let out = run(&mut state, "contracts 1");
        assert_eq!(out[0], "--- AVAILABLE CONTRACTS (Page 1/101) ---");
        // header, column row, rule, 10 rows, rule, footer
        assert_eq!(out.len(), 15);
        assert!(out[3].starts_with("alpha        | SECURE SERVER (ALPHA)"));
        assert_eq!(out[14], "Type 'contracts 2' for next page.");

        let out = run(&mut state, "contracts 102");
        assert_eq!(out, vec!["Page 102 does not exist. Total pages: 101".to_string()]);

        let out = run(&mut state, "contracts 101");
        assert_eq!(out.len(), 5 + 10);
        assert_eq!(out.last().unwrap(), "Type 'contracts 102' for next page.");
    }

    #[test]
    fn test_deep_web_title_drops_operation_prefix() {
        let mut state = boot();
        let out = run(&mut state, "contracts");
        assert!(out.iter().any(|l| l.starts_with("deep_web     | DEEP WEB ")));
    }

    #[test]
    fn test_ping_replies_arrive_over_time() {
        let mut state = boot();
        let out = run(&mut state, "ping gamma.net");
        assert_eq!(out, vec!["Pinging gamma.net [192.168.0.55] with 32 bytes of data:".to_string()]);

        state.advance(PING_REPLY_MS);
        assert_eq!(
            state.take_output(),
            vec!["Reply from 192.168.0.55: bytes=32 time=12ms TTL=54".to_string()]
        );
        state.advance(PING_REPLY_MS * 2);
        assert_eq!(state.take_output().len(), 2);

        let out = run(&mut state, "ping nowhere.net");
        assert!(out[0].starts_with("Ping request could not find host nowhere.net."));
    }

    #[test]
    fn test_bruteforce_connect_and_solve() {
        let mut registry = MissionRegistry::with_catalog();
        let mut mission = registry.get("alpha").unwrap().clone();
        mission.id = "op_7".into();
        mission.ip = "192.168.77.7".into();
        mission.domain = "shadowvault7.net".into();
        mission.reward = "data_op_7.enc".into();
        mission.kind = pkos_common::MissionKind::Bruteforce { pin: "5000".into() };
        registry.insert(mission).unwrap();
        let mut state = boot_with(registry);

        let out = run(&mut state, "connect 192.168.77.7");
        assert_eq!(out[0], "Initiating secure connection to SHADOWVAULT7.NET...");

        assert_eq!(run(&mut state, "solve 4999"), vec!["ACCESS DENIED. TRY HIGHER".to_string()]);
        let out = run(&mut state, "solve 5000");
        assert!(out.contains(&"ACCESS GRANTED.".to_string()));
        assert!(out.contains(&"[SYSTEM] DATA_OP_7.ENC DOWNLOADED.".to_string()));
        assert_eq!(state.wallet.credits(), 25);

        // replay pays nothing
        run(&mut state, "solve 5000");
        assert_eq!(state.wallet.credits(), 25);
    }

    #[test]
    fn test_puzzle_commands_need_connection() {
        let mut state = boot();
        assert_eq!(
            run(&mut state, "solve 1234"),
            vec!["No active connection. Use 'connect <ip>' first.".to_string()]
        );
        assert_eq!(
            run(&mut state, "connect 1.2.3.4"),
            vec!["Connection to 1.2.3.4 failed. Target unreachable.".to_string()]
        );
    }

    #[test]
    fn test_standard_mission_uses_stored_high_score() {
        let mut state = boot();
        run(&mut state, "snake 10 30");
        assert_eq!(state.high_score(), 10);
        assert!(state.ledger.is_unlocked("snake_score_10"));
        assert_eq!(state.ledger.get("game_over").unwrap().progress, Some(1));

        run(&mut state, "connect gamma.net");
        assert_eq!(run(&mut state, "solve 9"), vec!["ACCESS DENIED.".to_string()]);
        let out = run(&mut state, "solve 10");
        assert!(out.contains(&"[SYSTEM] GAMMA_INTEL.TXT DOWNLOADED.".to_string()));

        // a lower round keeps the stored best
        let out = run(&mut state, "snake 5");
        assert_eq!(out.last().unwrap(), "HIGH SCORE: 10");
    }

    #[test]
    fn test_deep_web_full_chain() {
        let mut state = boot();
        let out = run(&mut state, "start_op deep_web");
        assert_eq!(out, vec!["OPERATION DEEP_WEB INITIATED. GOOD LUCK.".to_string()]);
        assert_eq!(
            run(&mut state, "start_op deep_web"),
            vec!["Operation already in progress.".to_string()]
        );

        run(&mut state, "scan_network");
        state.advance(SCAN_DELAY_MS);
        let out = state.take_output();
        assert!(out.contains(&"Found: 10.0.0.66 (HIDDEN) - PORT 80 OPEN".to_string()));

        run(&mut state, "connect 10.0.0.66");
        let out = run(&mut state, "login admin ' OR '1'='1");
        assert!(out.contains(&"To Exfiltrate: Run upload GENESIS in Terminal.".to_string()));
        // the breach notice grants nothing
        assert_eq!(state.wallet.credits(), 0);

        assert_eq!(run(&mut state, "upload WRONG"), vec!["Error: Invalid Upload Code.".to_string()]);
        assert_eq!(run(&mut state, "upload GENESIS"), vec!["Uploading PROJECT GENESIS...".to_string()]);
        let status = run(&mut state, "status");
        assert!(status[0].starts_with("OPERATION: DEEP_WEB | "));
        assert_eq!(status[1], "UPLOAD: 0%");
    }

    #[test]
    fn test_timed_op_via_start_op_rejects_puzzle_types() {
        let mut state = boot();
        let out = run(&mut state, "start_op gamma");
        assert_eq!(out[0], "Operation GAMMA NETWORKS is a STANDARD Mission.");
        assert_eq!(out[1], "Use 'connect 192.168.0.55' or 'connect gamma.net' to begin.");
        assert_eq!(
            run(&mut state, "start_op"),
            vec![
                "Usage: start_op <operation_id>".to_string(),
                "Example: start_op deep_web".to_string()
            ]
        );
    }

    #[test]
    fn test_omega_decrypt_and_upload_crash() {
        let mut state = boot();
        assert_eq!(
            run(&mut state, "decrypt encrypted_payload.dat"),
            vec!["decrypt: encrypted_payload.dat: No such file".to_string()]
        );

        state.fs.write_root_file(ENCRYPTED_PAYLOAD, "locked".to_string());
        let out = run(&mut state, "decrypt encrypted_payload.dat paris");
        assert_eq!(out[0], "Error: Incorrect Password.");

        run(&mut state, "decrypt encrypted_payload.dat INDIA");
        state.advance(DECRYPT_DELAY_MS);
        assert!(state.fs.root_file("payload_decrypted.txt").unwrap().contains("UPLOAD CODE: OMEGA-9"));

        run(&mut state, "upload OMEGA-9");
        state.advance(OMEGA_UPLOAD_STEP_MS * 10);
        let out = state.take_output();
        assert_eq!(out.last().unwrap(), "INITIATING TRACE CLEANUP...");
        assert!(!state.omega_upload_running());

        state.advance(OMEGA_WIPE_DELAY_MS);
        assert!(state.ledger.is_unlocked("bsod_survivor"));
    }

    #[test]
    fn test_market_purchase_flow() {
        let mut state = boot();
        assert_eq!(
            run(&mut state, "market buy vpn_proxy"),
            vec!["Insufficient credits. Cost: 50".to_string()]
        );
        assert!(!state.market.owns("vpn_proxy"));
        assert!(!state.ledger.is_unlocked("big_spender"));

        state.wallet.deposit(60);
        let out = run(&mut state, "market buy vpn_proxy");
        assert_eq!(out[0], "Purchased VPN Proxy.");
        assert!(out.contains(&"[ACHIEVEMENT UNLOCKED] Big Spender: Buy 1 item.".to_string()));
        assert_eq!(state.wallet.credits(), 10);
        assert!(state.ledger.is_unlocked("big_spender"));
        assert_eq!(run(&mut state, "market buy vpn_proxy"), vec!["Already owned.".to_string()]);
        assert_eq!(run(&mut state, "market buy laser"), vec!["Item not found.".to_string()]);

        let out = run(&mut state, "market");
        assert!(out.contains(&"vpn_proxy       | 50 CR | [OWNED]".to_string()));
        assert_eq!(state.ledger.get("window_shopper").unwrap().progress, Some(1));
    }

    #[test]
    fn test_file_commands_feed_ledger() {
        let mut state = boot();
        run(&mut state, "touch a.txt");
        run(&mut state, "touch a.txt");
        assert_eq!(state.ledger.get("file_hoarder").unwrap().progress, Some(1));

        run(&mut state, "rm a.txt");
        assert_eq!(run(&mut state, "rm a.txt"), vec!["rm: a.txt: No such file".to_string()]);
        assert_eq!(state.ledger.get("deleter").unwrap().progress, Some(1));

        assert_eq!(run(&mut state, "cd projects"), vec!["/projects".to_string()]);
        assert_eq!(state.ledger.get("developer").unwrap().progress, Some(1));
        assert_eq!(run(&mut state, "cd ."), vec!["/projects".to_string()]);
        assert_eq!(state.ledger.get("recursion").unwrap().progress, Some(1));
        assert_eq!(state.ledger.get("navigator").unwrap().progress, Some(2));

        run(&mut state, "cd /");
        run(&mut state, "cat about.txt");
        assert_eq!(state.ledger.get("identity_theft").unwrap().progress, Some(1));
    }

    #[test]
    fn test_explorer_counts_distinct_apps() {
        let mut state = boot();
        for line in ["snake", "snake", "note", "achievements", "music 2", "connect gamma.net"] {
            run(&mut state, line);
        }
        assert!(state.ledger.is_unlocked("explorer"));
        assert!(state.ledger.is_unlocked("music_lover"));
        assert_eq!(state.ledger.get("audiophile").unwrap().progress, Some(1));
    }

    #[test]
    fn test_notepad_persists_in_store() {
        let mut state = boot();
        assert_eq!(run(&mut state, "note"), vec!["(empty)".to_string()]);
        assert_eq!(run(&mut state, "note meet at 0300"), vec!["SAVED".to_string()]);
        assert_eq!(run(&mut state, "note"), vec!["meet at 0300".to_string()]);
    }

    #[test]
    fn test_resets() {
        let mut state = boot();
        run(&mut state, "reset_achievements");
        assert_eq!(state.pending_reset(), Some(ResetReason::AchievementsReset));
        assert!(state.store_mut().get(store_keys::ACHIEVEMENTS).unwrap().is_none());

        let mut state = boot();
        run(&mut state, "del system32");
        assert!(state.ledger.is_unlocked("bsod_survivor"));
        assert!(state.pending_reset().is_none());
    }

    #[test]
    fn test_easter_eggs() {
        let mut state = boot();
        run(&mut state, "sudo rm -rf /");
        run(&mut state, "up up down down left right left right b a");
        run(&mut state, "matrix");
        assert!(state.ledger.is_unlocked("root_access"));
        assert!(state.ledger.is_unlocked("konami"));
        assert!(state.ledger.is_unlocked("glitch_matrix"));
    }

    #[test]
    fn test_spam_detection() {
        let mut state = boot();
        for _ in 0..6 {
            run(&mut state, "wallet");
        }
        assert!(state.ledger.is_unlocked("spammer"));
    }
}
