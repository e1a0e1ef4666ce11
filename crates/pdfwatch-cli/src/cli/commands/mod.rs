//! CLI command handlers. Each command is in its own file.

mod check;
mod checksum;
mod reset;
mod run;
mod status;

pub use check::run_check;
pub use checksum::run_checksum;
pub use reset::run_reset;
pub use run::run_watch;
pub use status::run_status;
