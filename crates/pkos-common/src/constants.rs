//! Shared constants for PK_OS components.

/// Default durable store location
pub const DEFAULT_STORE_URL: &str = "file://.pkos/store.json";

/// Number of procedural missions generated at boot
pub const GENERATED_MISSION_COUNT: usize = 1000;

/// Rows per `contracts` page
pub const CONTRACTS_PAGE_SIZE: usize = 10;

/// Engine countdown tick (1 second)
pub const ENGINE_TICK_MS: u64 = 1000;

/// Mission loot upload step interval
pub const UPLOAD_STEP_MS: u64 = 500;

/// Project OMEGA-9 upload step interval
pub const OMEGA_UPLOAD_STEP_MS: u64 = 200;

/// Delay before `scan_network` reports
pub const SCAN_DELAY_MS: u64 = 2000;

/// Delay before `decrypt` accepts a key
pub const DECRYPT_DELAY_MS: u64 = 800;

/// Spacing between ping replies
pub const PING_REPLY_MS: u64 = 500;

/// How long a reward theme stays on screen
pub const THEME_FLASH_MS: u64 = 3000;

/// Uptime achievement tick (1 minute)
pub const UPTIME_TICK_MS: u64 = 60_000;

/// Crash screen hold time before the forced reload
pub const CRASH_RELOAD_MS: u64 = 5000;

/// Delay between deep-web exfiltration and the system wipe
pub const DEEP_WEB_WIPE_DELAY_MS: u64 = 3000;

/// Delay between OMEGA-9 upload completion and the trace cleanup crash
pub const OMEGA_WIPE_DELAY_MS: u64 = 2000;

/// Countdown for timed operations without an explicit duration (5 minutes)
pub const DEFAULT_OP_DURATION_SECS: u32 = 300;

/// Id of the hand-authored deep-web operation
pub const DEEP_WEB_OP: &str = "deep_web";

/// Id of the hand-authored Omega heist
pub const OMEGA_OP: &str = "omega";

/// Prefix of generated mission ids
pub const GENERATED_ID_PREFIX: &str = "op_";

/// Sandbox success message prefix: `mission_success_<missionId>`
pub const MISSION_SUCCESS_PREFIX: &str = "mission_success_";

/// Sandbox notice posted when a portal login is bypassed
pub const PORTAL_BREACH_SIGNAL: &str = "deep_web_sqli";

/// Absolute frequency error accepted by the signal lock
pub const FREQUENCY_TOLERANCE: u32 = 5;

/// Frequency slider bounds (Hz)
pub const FREQUENCY_MIN: u32 = 10;
pub const FREQUENCY_MAX: u32 = 100;

/// Frequency slider start position (Hz)
pub const FREQUENCY_START: u32 = 50;

/// Keypad PIN length
pub const PIN_LENGTH: usize = 4;

/// Grid pattern length and cell count (4x4)
pub const GRID_PATTERN_LEN: usize = 5;
pub const GRID_CELLS: u8 = 16;

/// Trace added per upload step, with and without the VPN proxy
pub const BASE_TRACE_PER_STEP: u32 = 2;
pub const VPN_TRACE_PER_STEP: u32 = 1;

/// Upload progress per step, with and without Brute Force MkII
pub const BASE_UPLOAD_STEP_PCT: u32 = 5;
pub const BOOSTED_UPLOAD_STEP_PCT: u32 = 10;

/// Trace points absorbed by the stealth kit per operation
pub const STEALTH_TRACE_SHIELD: u32 = 20;

/// Credits paid for non-standard, non-timed missions
pub const PUZZLE_PAYOUT: u64 = 25;

/// Durable key-value store keys
pub mod store_keys {
    /// Achievement unlock/progress map (JSON)
    pub const ACHIEVEMENTS: &str = "achievements";

    /// Snake high score (integer)
    pub const HIGH_SCORE: &str = "snakeHighScore";

    /// Freeform notepad text
    pub const NOTEPAD: &str = "notepadContent";
}
