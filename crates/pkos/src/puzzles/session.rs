//! Sandboxed puzzle pages.
//!
//! A session is what `connect` opens in the browser: a copy of the mission's
//! puzzle data plus a post-only [`SandboxPort`]. It never touches host state;
//! success is reported by posting `mission_success_<id>`.

use pkos_common::constants::{
    FREQUENCY_MAX, FREQUENCY_MIN, FREQUENCY_START, GRID_CELLS, MISSION_SUCCESS_PREFIX, PIN_LENGTH,
    PORTAL_BREACH_SIGNAL,
};
use pkos_common::{Mission, MissionKind};

use super::evaluator::{
    PinVerdict, check_cipher, check_frequency, check_pattern, check_pin, check_score, check_trivia,
};
use crate::rewards::SandboxPort;

const SQL_INJECTION: &str = "' OR '1'='1";

/// Values the sandbox may read from the host (the high score lives in shared storage)
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxEnv {
    pub high_score: u32,
}

#[derive(Debug, Clone)]
enum Screen {
    Biometric { required: u32 },
    Keypad { pin: String, buffer: String },
    Cipher { plaintext: String, ciphertext: String },
    Signal { target: u32, current: u32 },
    Question {
        question: String,
        answer: String,
        options: Vec<String>,
        locked: bool,
    },
    Pattern { pattern: Vec<u8>, input: Vec<u8> },
    Portal { reward: String, upload_code: String },
}

/// One open puzzle page
#[derive(Debug, Clone)]
pub struct PuzzleSession {
    mission_id: String,
    title: String,
    screen: Screen,
    port: SandboxPort,
}

impl PuzzleSession {
    pub fn open(mission: &Mission, port: SandboxPort) -> Self {
        let screen = match &mission.kind {
            MissionKind::Standard { score } => Screen::Biometric { required: *score },
            MissionKind::Timed { .. } => Screen::Portal {
                reward: mission.reward.clone(),
                upload_code: mission.upload_code.clone(),
            },
            MissionKind::Bruteforce { pin } => Screen::Keypad {
                pin: pin.clone(),
                buffer: String::new(),
            },
            MissionKind::Decipher {
                plaintext,
                ciphertext,
            } => Screen::Cipher {
                plaintext: plaintext.clone(),
                ciphertext: ciphertext.clone(),
            },
            MissionKind::Frequency { target_freq } => Screen::Signal {
                target: *target_freq,
                current: FREQUENCY_START,
            },
            MissionKind::Trivia {
                question,
                answer,
                options,
            } => Screen::Question {
                question: question.clone(),
                answer: answer.clone(),
                options: options.clone(),
                locked: false,
            },
            MissionKind::Grid { pattern } => Screen::Pattern {
                pattern: pattern.clone(),
                input: Vec::new(),
            },
        };

        Self {
            mission_id: mission.id.clone(),
            title: mission.title.clone(),
            screen,
            port,
        }
    }

    pub fn mission_id(&self) -> &str {
        &self.mission_id
    }

    fn post_success(&self) {
        self.port
            .post(format!("{}{}", MISSION_SUCCESS_PREFIX, self.mission_id));
    }

    /// Page as first shown
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("== {} ==", self.title)];
        match &self.screen {
            Screen::Biometric { required } => {
                lines.push("BIOMETRIC VERIFICATION REQUIRED".into());
                lines.push(format!("REQUIRED SCORE: {}", required));
                lines.push("Enter score: solve <score>".into());
            }
            Screen::Keypad { .. } => {
                lines.push("ENTER 4-DIGIT PIN".into());
                lines.push("____".into());
                lines.push("Enter pin: solve <digits>".into());
            }
            Screen::Cipher { ciphertext, .. } => {
                lines.push("DECRYPT THE MESSAGE".into());
                lines.push(ciphertext.clone());
                lines.push("Enter plaintext: solve <text>".into());
            }
            Screen::Signal { current, .. } => {
                lines.push("MATCH THE FREQUENCY".into());
                lines.push(format!("TARGET: ??? Hz | CURRENT: {} Hz", current));
                lines.push("Adjust: tune <hz>   Lock: solve [hz]".into());
            }
            Screen::Question {
                question, options, ..
            } => {
                lines.push("SECURITY QUESTION".into());
                lines.push(question.clone());
                for (i, option) in options.iter().enumerate() {
                    lines.push(format!("  [{}] {}", i + 1, option));
                }
                lines.push("Answer: solve <number|text> (one attempt)".into());
            }
            Screen::Pattern { .. } => {
                lines.push("REPEAT THE PATTERN".into());
                lines.push("Cells 0-15 (4x4). Watch: play   Repeat: solve <cell...>".into());
            }
            Screen::Portal { .. } => {
                lines.push("Login".into());
                lines.push("From: IT Support - Reminder: Password rotation is mandatory. Do not use pet names!".into());
                lines.push("From: jdoe - Ugh, I hate these new rules. I just set mine to 'Fluffy123' so I don't forget it again.".into());
                lines.push("Sign in: login <user> <password>".into());
            }
        }
        lines
    }

    /// Main input action for the page
    pub fn solve(&mut self, input: &str, env: SandboxEnv) -> Vec<String> {
        let input = input.trim();
        let mut granted = false;

        let lines = match &mut self.screen {
            Screen::Biometric { required } => {
                let submitted = input.parse::<u32>().ok();
                if submitted.is_some_and(|v| check_score(v, env.high_score, *required)) {
                    granted = true;
                    vec!["ACCESS GRANTED.".to_string()]
                } else {
                    vec!["ACCESS DENIED.".to_string()]
                }
            }
            Screen::Keypad { pin, buffer } => {
                for digit in input.chars().filter(char::is_ascii_digit) {
                    if buffer.len() < PIN_LENGTH {
                        buffer.push(digit);
                    }
                }
                match check_pin(buffer, pin) {
                    PinVerdict::Granted => {
                        granted = true;
                        vec!["ACCESS GRANTED.".to_string()]
                    }
                    hint => {
                        buffer.clear();
                        vec![format!("ACCESS DENIED. TRY {}", hint)]
                    }
                }
            }
            Screen::Cipher { plaintext, .. } => {
                if check_cipher(input, plaintext) {
                    granted = true;
                    vec!["ACCESS GRANTED.".to_string()]
                } else {
                    vec!["INCORRECT.".to_string()]
                }
            }
            Screen::Signal { target, current } => {
                if let Ok(hz) = input.parse::<u32>() {
                    *current = hz.clamp(FREQUENCY_MIN, FREQUENCY_MAX);
                }
                if check_frequency(*current, *target) {
                    granted = true;
                    vec!["SIGNAL LOCKED.".to_string()]
                } else {
                    vec![format!("SIGNAL UNSTABLE. ({} Hz)", current)]
                }
            }
            Screen::Question {
                answer,
                options,
                locked,
                ..
            } => {
                if *locked {
                    vec!["LOCKOUT ACTIVE.".to_string()]
                } else {
                    match pick_option(options, input) {
                        None => vec![format!("No such option: {}", input)],
                        Some(choice) if check_trivia(&choice, answer) => {
                            granted = true;
                            vec!["ACCESS GRANTED.".to_string()]
                        }
                        Some(_) => {
                            *locked = true;
                            vec!["ACCESS DENIED. LOCKOUT INITIATED.".to_string()]
                        }
                    }
                }
            }
            Screen::Pattern { pattern, input: clicks } => {
                let mut lines = Vec::new();
                for token in input.split_whitespace() {
                    let cell = match token.parse::<u8>() {
                        Ok(cell) if cell < GRID_CELLS => cell,
                        _ => {
                            lines.push(format!("Invalid cell: {}", token));
                            continue;
                        }
                    };
                    clicks.push(cell);
                    if clicks.len() == pattern.len() {
                        if check_pattern(clicks, pattern) {
                            granted = true;
                            lines.push("ACCESS GRANTED.".to_string());
                        } else {
                            lines.push("PATTERN MISMATCH.".to_string());
                        }
                        clicks.clear();
                    }
                }
                if lines.is_empty() {
                    lines.push(format!("{}/{}", clicks.len(), pattern.len()));
                }
                lines
            }
            Screen::Portal { .. } => vec!["Sign in: login <user> <password>".to_string()],
        };

        if granted {
            self.post_success();
        }
        lines
    }

    /// Grid reference animation; clears the player's input
    pub fn play(&mut self) -> Vec<String> {
        match &mut self.screen {
            Screen::Pattern { pattern, input } => {
                input.clear();
                pattern.iter().map(|cell| format!("FLASH {}", cell)).collect()
            }
            _ => vec!["Nothing to play.".to_string()],
        }
    }

    /// Move the frequency slider
    pub fn tune(&mut self, hz: u32) -> Vec<String> {
        match &mut self.screen {
            Screen::Signal { current, .. } => {
                *current = hz.clamp(FREQUENCY_MIN, FREQUENCY_MAX);
                vec![format!("TARGET: ??? Hz | CURRENT: {} Hz", current)]
            }
            _ => vec!["No signal to tune.".to_string()],
        }
    }

    /// Portal sign-in; `raw` is everything after `login`
    pub fn login(&mut self, raw: &str) -> Vec<String> {
        let Screen::Portal {
            reward,
            upload_code,
        } = &self.screen
        else {
            return vec!["No login form on this page.".to_string()];
        };

        if raw.contains(SQL_INJECTION) {
            let lines = vec![
                "SQL INJECTION SUCCESSFUL".to_string(),
                "Dumping User Database...".to_string(),
                "ID | USER | ROLE".to_string(),
                "1  | admin| SYSADMIN".to_string(),
                "2  | jdoe | USER".to_string(),
                "3  | root | SUPERUSER".to_string(),
                "VAULT IP FOUND: 10.0.0.99".to_string(),
                format!("Target File: {}", reward),
                format!("To Exfiltrate: Run upload {} in Terminal.", upload_code),
            ];
            self.port.post(PORTAL_BREACH_SIGNAL);
            return lines;
        }

        let mut parts = raw.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("jdoe"), Some("Fluffy123")) => vec![
                "Login Successful. Welcome, John.".to_string(),
                "Welcome to Intranet. Search the database for files.".to_string(),
            ],
            _ => vec!["Invalid Credentials.".to_string()],
        }
    }
}

/// Resolve `1`-`4` or option text (case-insensitive) to the option string
fn pick_option(options: &[String], input: &str) -> Option<String> {
    if let Ok(n) = input.parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Some(options[n - 1].clone());
        }
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::Inbox;
    use pkos_common::Theme;

    fn mission(kind: MissionKind) -> Mission {
        Mission {
            id: "op_1".into(),
            ip: "192.168.10.1".into(),
            domain: "neonwolf1.io".into(),
            title: "OPERATION NEON WOLF".into(),
            theme: Theme::Cyan,
            reward: "loot_op_1.zip".into(),
            upload_code: "UP_ABCDEF".into(),
            kind,
        }
    }

    #[test]
    fn test_keypad_hint_resets_buffer() {
        let inbox = Inbox::new();
        let mut session = PuzzleSession::open(
            &mission(MissionKind::Bruteforce { pin: "5000".into() }),
            inbox.port(),
        );

        assert_eq!(
            session.solve("4999", SandboxEnv::default()),
            vec!["ACCESS DENIED. TRY HIGHER"]
        );
        assert!(matches!(&session.screen, Screen::Keypad { buffer, .. } if buffer.is_empty()));
        assert!(inbox.is_empty());

        assert_eq!(session.solve("5000", SandboxEnv::default()), vec!["ACCESS GRANTED."]);
        assert_eq!(inbox.drain(), vec!["mission_success_op_1".to_string()]);
    }

    #[test]
    fn test_keypad_ignores_extra_digits() {
        let inbox = Inbox::new();
        let mut session = PuzzleSession::open(
            &mission(MissionKind::Bruteforce { pin: "1234".into() }),
            inbox.port(),
        );
        session.solve("123456", SandboxEnv::default());
        assert_eq!(inbox.drain().len(), 1);
    }

    #[test]
    fn test_biometric_reads_high_score() {
        let inbox = Inbox::new();
        let mut session =
            PuzzleSession::open(&mission(MissionKind::Standard { score: 30 }), inbox.port());

        let env = SandboxEnv { high_score: 40 };
        assert_eq!(session.solve("30", env), vec!["ACCESS DENIED."]);
        assert_eq!(session.solve("abc", env), vec!["ACCESS DENIED."]);
        assert_eq!(session.solve("40", env), vec!["ACCESS GRANTED."]);
        assert_eq!(inbox.drain().len(), 1);
    }

    #[test]
    fn test_trivia_locks_after_wrong_answer() {
        let inbox = Inbox::new();
        let mut session = PuzzleSession::open(
            &mission(MissionKind::Trivia {
                question: "What is the default port for SSH?".into(),
                answer: "22".into(),
                options: vec!["21".into(), "22".into(), "80".into(), "443".into()],
            }),
            inbox.port(),
        );

        assert_eq!(session.solve("9", SandboxEnv::default()), vec!["No such option: 9"]);
        assert_eq!(
            session.solve("1", SandboxEnv::default()),
            vec!["ACCESS DENIED. LOCKOUT INITIATED."]
        );
        assert_eq!(session.solve("22", SandboxEnv::default()), vec!["LOCKOUT ACTIVE."]);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_grid_mismatch_clears_input() {
        let inbox = Inbox::new();
        let mut session = PuzzleSession::open(
            &mission(MissionKind::Grid {
                pattern: vec![3, 7, 7, 0, 15],
            }),
            inbox.port(),
        );

        assert_eq!(
            session.play(),
            vec!["FLASH 3", "FLASH 7", "FLASH 7", "FLASH 0", "FLASH 15"]
        );
        assert_eq!(session.solve("3 7", SandboxEnv::default()), vec!["2/5"]);
        assert_eq!(
            session.solve("7 0 14", SandboxEnv::default()),
            vec!["PATTERN MISMATCH."]
        );
        assert!(inbox.is_empty());

        assert_eq!(
            session.solve("3 7 7 0 15", SandboxEnv::default()),
            vec!["ACCESS GRANTED."]
        );
        assert_eq!(inbox.drain().len(), 1);
    }

    #[test]
    fn test_signal_tuning() {
        let inbox = Inbox::new();
        let mut session = PuzzleSession::open(
            &mission(MissionKind::Frequency { target_freq: 80 }),
            inbox.port(),
        );
        assert_eq!(session.tune(500), vec!["TARGET: ??? Hz | CURRENT: 100 Hz"]);
        assert_eq!(
            session.solve("", SandboxEnv::default()),
            vec!["SIGNAL UNSTABLE. (100 Hz)"]
        );
        assert_eq!(session.solve("77", SandboxEnv::default()), vec!["SIGNAL LOCKED."]);
        assert_eq!(inbox.drain().len(), 1);
    }

    #[test]
    fn test_cipher() {
        let inbox = Inbox::new();
        let mut session =
            PuzzleSession::open(&mission(MissionKind::decipher("HELLO WORLD")), inbox.port());
        assert!(session.render().contains(&"URYYB JBEYQ".to_string()));
        assert_eq!(session.solve("hello world", SandboxEnv::default()), vec!["ACCESS GRANTED."]);
    }

    #[test]
    fn test_portal_injection_reveals_upload_code() {
        let inbox = Inbox::new();
        let mut session =
            PuzzleSession::open(&mission(MissionKind::Timed { duration: 200 }), inbox.port());

        assert_eq!(session.login("jdoe hunter2"), vec!["Invalid Credentials."]);
        assert_eq!(session.login("jdoe Fluffy123")[0], "Login Successful. Welcome, John.");

        let lines = session.login("admin ' OR '1'='1");
        assert_eq!(lines[0], "SQL INJECTION SUCCESSFUL");
        assert!(lines.contains(&"To Exfiltrate: Run upload UP_ABCDEF in Terminal.".to_string()));
        assert_eq!(inbox.drain(), vec!["deep_web_sqli".to_string()]);
    }
}
