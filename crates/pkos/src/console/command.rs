//! Console line parser.
//!
//! Parsing never fails: malformed arguments become [`Command::Usage`] and
//! unrecognized verbs become [`Command::Unknown`], both of which the handler
//! prints inline.

const KONAMI: [&str; 10] = [
    "up", "up", "down", "down", "left", "right", "left", "right", "b", "a",
];

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Help,
    Clear,
    Reboot,
    Ls,
    Cd(Option<&'a str>),
    Cat(Option<&'a str>),
    Mkdir(Option<&'a str>),
    Touch(Option<&'a str>),
    Rm(Option<&'a str>),
    DeleteSystem32,
    Ping(Option<&'a str>),
    Connect(Option<&'a str>),
    Disconnect,
    Decrypt {
        file: Option<&'a str>,
        password: Option<&'a str>,
    },
    Upload(Option<&'a str>),
    StartOp(Option<&'a str>),
    Random,
    /// Page number; anything unparsable means page 1
    Contracts(usize),
    Wallet,
    Market,
    MarketBuy(&'a str),
    ScanNetwork,
    Status,
    ResetAchievements,
    TestNotification,
    /// `snake` opens the arcade; `snake <score> [seconds]` reports a finished round
    Snake(Option<SnakeRound>),
    Sudo,
    /// `note` prints the notepad, `note <text>` replaces it
    Note(Option<&'a str>),
    Solve(&'a str),
    Play,
    Tune(u32),
    Login(&'a str),
    Achievements,
    /// Track number, 1-based
    Music(u32),
    Matrix,
    Konami,
    /// Right verb, wrong arguments
    Usage(&'static str),
    /// Lowercased verb
    Unknown(String),
}

/// A finished Snake game as reported by the arcade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeRound {
    pub score: u32,
    pub seconds: u32,
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        let mut parts = trimmed.split_whitespace();
        let Some(verb) = parts.next() else {
            return Self::Empty;
        };
        let verb = verb.to_ascii_lowercase();
        let arg = parts.next();
        let rest = trimmed
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("");

        if is_konami(trimmed) {
            return Self::Konami;
        }

        match verb.as_str() {
            "help" => Self::Help,
            "clear" => Self::Clear,
            "reboot" => Self::Reboot,
            "ls" => Self::Ls,
            "cd" => Self::Cd(arg),
            "cat" => Self::Cat(arg),
            "mkdir" => Self::Mkdir(arg),
            "touch" => Self::Touch(arg),
            "rm" => Self::Rm(arg),
            "del" | "delete" if arg == Some("system32") => Self::DeleteSystem32,
            "ping" => Self::Ping(arg),
            "connect" => Self::Connect(arg),
            "disconnect" => Self::Disconnect,
            "decrypt" => Self::Decrypt {
                file: arg,
                password: parts.next(),
            },
            "upload" => Self::Upload(arg),
            "start_op" => Self::StartOp(arg),
            "random" => Self::Random,
            "contracts" => Self::Contracts(
                arg.and_then(|a| a.parse::<usize>().ok())
                    .filter(|&p| p > 0)
                    .unwrap_or(1),
            ),
            "wallet" => Self::Wallet,
            "market" => match (arg, parts.next()) {
                (None, _) => Self::Market,
                (Some("buy"), Some(id)) => Self::MarketBuy(id),
                _ => Self::Usage("market buy <item_id>"),
            },
            "scan_network" => Self::ScanNetwork,
            "status" => Self::Status,
            "reset_achievements" => Self::ResetAchievements,
            "test_notification" => Self::TestNotification,
            "snake" => parse_snake(arg, parts.next()),
            "sudo" | "su" => Self::Sudo,
            "note" => Self::Note(Some(rest).filter(|r| !r.is_empty())),
            "solve" => Self::Solve(rest),
            "play" => Self::Play,
            "tune" => match arg.map(str::parse::<u32>) {
                Some(Ok(hz)) => Self::Tune(hz),
                _ => Self::Usage("tune <hz>"),
            },
            "login" => Self::Login(rest),
            "achievements" => Self::Achievements,
            "music" => match arg.map(str::parse::<u32>) {
                None => Self::Music(1),
                Some(Ok(track @ 1..=3)) => Self::Music(track),
                _ => Self::Usage("music [1-3]"),
            },
            "matrix" => Self::Matrix,
            _ => Self::Unknown(verb),
        }
    }
}

fn parse_snake<'a>(score: Option<&str>, seconds: Option<&str>) -> Command<'a> {
    let Some(score) = score else {
        return Command::Snake(None);
    };
    let score = score.parse::<u32>();
    let seconds = seconds.map(str::parse::<u32>).unwrap_or(Ok(0));
    match (score, seconds) {
        (Ok(score), Ok(seconds)) => Command::Snake(Some(SnakeRound { score, seconds })),
        _ => Command::Usage("snake [score] [seconds]"),
    }
}

fn is_konami(line: &str) -> bool {
    let mut words = line.split_whitespace();
    KONAMI
        .iter()
        .all(|expected| words.next().is_some_and(|w| w.eq_ignore_ascii_case(expected)))
        && words.next().is_none()
}
