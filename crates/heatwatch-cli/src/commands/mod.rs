//! Command implementations for the CLI.

mod check;
mod classify;
mod search;
mod watch;

pub use check::cmd_check;
pub use classify::{ClassifyArgs, cmd_classify};
pub use search::cmd_search;
pub use watch::{WatchArgs, cmd_watch};
