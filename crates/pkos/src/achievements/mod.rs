//! Achievement definitions, events and the persisted ledger.

mod catalog;
mod events;
mod ledger;

pub use events::Event;
pub use ledger::AchievementLedger;
