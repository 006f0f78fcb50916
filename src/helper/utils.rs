use std::io::{Result as IoResult, Write};
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

pub const CLI_ANIMATION_TICK_STRINGS: [&str; 5] = ["🧬   ", " 🧬  ", "  🧬 ", "   🧬", "  🌳 "];

pub fn log_line<W: Write>(writer: &mut W, message: &str) -> IoResult<()> {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(writer, "[{}] {}", now, message)?;
    writer.flush()?;
    Ok(())
}

/// Runs `task` behind a terminal spinner. Meant for external tools whose own
/// output is silenced.
pub fn with_spinner<T, F: FnOnce() -> T>(message: &str, task: F) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style.tick_strings(&CLI_ANIMATION_TICK_STRINGS));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = task();

    spinner.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_is_timestamped() {
        let mut buffer = Vec::new();
        log_line(&mut buffer, "Aligning sequences").unwrap();
        let line = String::from_utf8(buffer).unwrap();

        assert!(line.starts_with('['));
        assert!(line.ends_with("] Aligning sequences\n"));
        // [YYYY-mm-dd HH:MM:SS]
        assert_eq!(line.find(']'), Some(20));
    }

    #[test]
    fn test_with_spinner_returns_task_result() {
        let value = with_spinner("counting", || 21 * 2);
        assert_eq!(value, 42);
    }
}
