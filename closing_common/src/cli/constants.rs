/// CLI Commands

pub const HELP: &str = "help";
pub const PENDING: &str = "pending";
pub const SHOW: &str = "show";
pub const RECONCILE: &str = "reconcile";
pub const SETTLE: &str = "settle";
pub const LAST: &str = "last";
pub const QUIT: &str = "quit";

/// Various CLI constants

pub const PROMPT: &str = "> ";
