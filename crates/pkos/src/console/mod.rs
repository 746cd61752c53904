//! Line-oriented console: parse a line, run it against the session.

mod command;
mod handler;

pub use handler::handle;
