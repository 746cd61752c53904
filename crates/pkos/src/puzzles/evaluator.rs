//! Success predicates, one per mission type.

use pkos_common::constants::FREQUENCY_TOLERANCE;
use std::fmt;

/// Biometric gate: the submitted value must be the player's real high score,
/// and that score must meet the mission requirement.
pub fn check_score(submitted: u32, high_score: u32, required: u32) -> bool {
    submitted == high_score && high_score >= required
}

/// Keypad verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinVerdict {
    Granted,
    Higher,
    Lower,
}

impl fmt::Display for PinVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => f.write_str("GRANTED"),
            Self::Higher => f.write_str("HIGHER"),
            Self::Lower => f.write_str("LOWER"),
        }
    }
}

/// Hints compare the digit strings lexicographically
pub fn check_pin(input: &str, pin: &str) -> PinVerdict {
    if input == pin {
        PinVerdict::Granted
    } else if input < pin {
        PinVerdict::Higher
    } else {
        PinVerdict::Lower
    }
}

pub fn check_cipher(input: &str, plaintext: &str) -> bool {
    input.to_uppercase() == plaintext
}

pub fn check_frequency(current: u32, target: u32) -> bool {
    current.abs_diff(target) < FREQUENCY_TOLERANCE
}

pub fn check_trivia(choice: &str, answer: &str) -> bool {
    choice == answer
}

pub fn check_pattern(input: &[u8], pattern: &[u8]) -> bool {
    input == pattern
}
