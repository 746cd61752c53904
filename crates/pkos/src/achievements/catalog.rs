//! Static achievement definitions, in display order.

/// One achievement as shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub desc: &'static str,
    pub icon: &'static str,
    /// Counter threshold for progress-tracked achievements
    pub target: Option<u32>,
}

const fn flag(id: &'static str, title: &'static str, desc: &'static str, icon: &'static str) -> AchievementDef {
    AchievementDef { id, title, desc, icon, target: None }
}

const fn tally(
    id: &'static str,
    title: &'static str,
    desc: &'static str,
    icon: &'static str,
    target: u32,
) -> AchievementDef {
    AchievementDef { id, title, desc, icon, target: Some(target) }
}

#[rustfmt::skip]
pub static CATALOG: [AchievementDef; 55] = [
    flag("hello_world", "Hello World", "Boot up the system for the first time.", "power"),
    flag("script_kiddie", "Script Kiddie", "Complete your first hack.", "terminal"),
    tally("master_hacker", "Master Hacker", "Complete 10 hacks.", "skull", 10),
    flag("rich", "Crypto Miner", "Earn 100 Credits.", "bitcoin"),
    flag("snake_score_10", "Baby Snake", "Score 10 in Snake.", "gamepad-2"),
    flag("snake_score_50", "Serpent", "Score 50 in Snake.", "crown"),
    flag("sys_admin", "System Admin", "Run the 'help' command.", "terminal-square"),
    tally("explorer", "Explorer", "Open 5 different applications.", "compass", 5),
    flag("music_lover", "Music Lover", "Play a track in Media Player.", "headphones"),
    tally("terminal_junkie", "Terminal Junkie", "Run 20 terminal commands.", "keyboard", 20),
    flag("glitch_matrix", "Glitch in the Matrix", "Find the hidden trigger.", "zap"),

    // hacking
    tally("white_hat", "White Hat", "Complete 5 hacks.", "shield", 5),
    tally("gray_hat", "Gray Hat", "Complete 10 hacks.", "user-check", 10),
    tally("black_hat", "Black Hat", "Complete 25 hacks.", "skull", 25),
    tally("elite_hacker", "Elite Hacker", "Complete 50 hacks.", "terminal", 50),
    tally("cyber_deity", "Cyber Deity", "Complete 100 hacks.", "server", 100),
    tally("payload_deliverer", "Payload Deliverer", "Upload 10 files.", "upload", 10),
    flag("trace_buster", "Trace Buster", "Complete hack with >90% trace.", "alert-triangle"),

    // wealth
    flag("freelancer", "Freelancer", "Earn 500 Credits.", "dollar-sign"),
    flag("professional", "Professional", "Earn 1000 Credits.", "briefcase"),
    flag("tycoon", "Tycoon", "Earn 5000 Credits.", "trending-up"),
    flag("whale", "Whale", "Earn 10000 Credits.", "anchor"),
    flag("big_spender", "Big Spender", "Buy 1 item.", "shopping-cart"),
    flag("fully_kitted", "Fully Kitted", "Buy all upgrades.", "package"),

    // snake
    flag("cobra", "Cobra", "Score 100 in Snake.", "target"),
    flag("viper", "Viper", "Score 200 in Snake.", "zap"),
    flag("hydra", "Hydra", "Score 500 in Snake.", "layers"),
    tally("survivor", "Survivor", "Play Snake for 5 mins.", "clock", 300),
    tally("game_over", "Game Over", "Die 10 times in Snake.", "x-circle", 10),

    // terminal
    tally("novice_term", "Novice", "Run 10 commands.", "chevron-right", 10),
    tally("user_term", "User", "Run 50 commands.", "terminal", 50),
    tally("power_user", "Power User", "Run 100 commands.", "cpu", 100),
    tally("sys_admin_term", "SysAdmin", "Run 500 commands.", "server", 500),
    tally("operator", "Operator", "Run 1000 commands.", "globe", 1000),
    tally("paranoid", "Paranoid", "Clear screen 10 times.", "trash-2", 10),
    tally("lost", "Lost", "Enter 5 invalid commands.", "help-circle", 5),
    tally("spammer", "Spammer", "Run same command 5 times.", "repeat", 5),

    // system and exploration
    flag("uptime_1m", "Warming Up", "1 minute uptime.", "sun"),
    flag("uptime_5m", "Stable", "5 minutes uptime.", "battery"),
    flag("uptime_10m", "Reliable", "10 minutes uptime.", "battery-charging"),
    flag("uptime_30m", "Dedicated", "30 minutes uptime.", "battery-full"),
    flag("uptime_1h", "Server Grade", "1 hour uptime.", "database"),
    tally("file_hoarder", "File Hoarder", "Create 10 files.", "file-plus", 10),
    tally("deleter", "Deleter", "Delete 10 files.", "file-minus", 10),
    tally("navigator", "Navigator", "Change directory 20 times.", "folder", 20),
    tally("identity_theft", "Identity Theft", "Check Identity 5 times.", "user", 5),
    tally("narcissist", "Narcissist", "Check Skills 5 times.", "star", 5),
    tally("developer", "Developer", "Check Projects 5 times.", "code", 5),
    tally("audiophile", "Audiophile", "Listen to all tracks.", "music", 3),
    tally("window_shopper", "Window Shopper", "Check market 5 times.", "eye", 5),

    // easter eggs
    flag("konami", "Konami Code", "Up, Up, Down, Down...", "gamepad"),
    flag("bsod_survivor", "BSOD Survivor", "Trigger a system crash.", "alert-octagon"),
    tally("recursion", "Recursion", "cd . 5 times.", "refresh-cw", 5),
    flag("root_access", "Root Access", "Try sudo or su.", "lock"),
    tally("hello_again", "Hello Again", "Boot system 5 times.", "power", 5),
];

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}
