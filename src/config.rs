// ABOUTME: Configuration and constants for the Vibe interpreter CLI and REPL

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "Vibe v0.1.0";
pub const WELCOME_SUBTITLE: &str = "A small dynamically-evaluated scripting language";

/// Default cap on persisted REPL history entries (spec.md §6.2).
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Directory (under `$HOME`) holding REPL state.
pub const STATE_DIR_NAME: &str = ".vibe";
pub const HISTORY_FILE_NAME: &str = "history";

/// Extension appended to `run <path>` arguments that lack one.
pub const SOURCE_EXTENSION: &str = "vi";

pub const HELP_TEXT: &str = r#"
Vibe interactive mode.

Type any Vibe statement or expression to evaluate it. A bare expression at
the end of a unit echoes its value. Multi-line constructs (if/while/for/def
/class ... end) may span several lines; the prompt changes to `.. ` while a
block is still open.

Type `exit` on its own line to leave.
"#;

/// Keeps only the last `limit` lines of a persisted history file (spec.md
/// §6.2/§6.3). Pure function over line content so it's testable without
/// touching the filesystem; the REPL's `main.rs` is the only caller that
/// reads/writes the actual history file.
pub fn trim_history_lines(lines: &[&str], limit: usize) -> Vec<String> {
    if lines.len() <= limit {
        return lines.iter().map(|l| l.to_string()).collect();
    }
    lines[lines.len() - limit..]
        .iter()
        .map(|l| l.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_history_lines_keeps_newest_entries() {
        let lines = vec!["a", "b", "c", "d"];
        assert_eq!(trim_history_lines(&lines, 2), vec!["c", "d"]);
    }

    #[test]
    fn trim_history_lines_is_a_no_op_under_the_limit() {
        let lines = vec!["a", "b"];
        assert_eq!(trim_history_lines(&lines, 10), vec!["a", "b"]);
    }
}
