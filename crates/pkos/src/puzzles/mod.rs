//! Puzzle evaluators and the sandboxed pages that run them.

mod evaluator;
mod session;

pub use session::{PuzzleSession, SandboxEnv};
