//! Terminal output helpers
//!
//! Progress bars are suppressed when:
//! - `--quiet` flag is passed
//! - `VENTDIR_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output)

use std::io::IsTerminal;
use std::sync::OnceLock;

static QUIET_MODE: OnceLock<bool> = OnceLock::new();

/// Call once at startup with the --quiet flag value.
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var("VENTDIR_QUIET").map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&false)
}

/// Heading plus a rule, for end-of-job summaries.
pub fn section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// `label: value` line, aligned.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{:<28} {}", format!("{label}:"), value);
}
