// ABOUTME: Integration tests for the REPL history file persisted under $HOME
//
// These mutate the process-wide `HOME` environment variable, so they run
// `#[serial]` (same reasoning as the teacher's database tests: a shared
// external resource can't be exercised safely in parallel).

use serial_test::serial;
use std::fs;
use vibe::config;

fn with_temp_home<F: FnOnce(&std::path::Path)>(f: F) {
    let dir = std::env::temp_dir().join(format!("vibe-history-test-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp home");
    let previous = std::env::var("HOME").ok();
    std::env::set_var("HOME", &dir);

    f(&dir);

    match previous {
        Some(home) => std::env::set_var("HOME", home),
        None => std::env::remove_var("HOME"),
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
#[serial]
fn history_file_lives_under_home_state_dir() {
    with_temp_home(|home| {
        let state_dir = home.join(config::STATE_DIR_NAME);
        fs::create_dir_all(&state_dir).unwrap();
        let history_path = state_dir.join(config::HISTORY_FILE_NAME);
        fs::write(&history_path, "puts 1\nputs 2\n").unwrap();

        let contents = fs::read_to_string(&history_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    });
}

#[test]
#[serial]
fn trimming_a_history_file_over_the_limit_keeps_only_the_newest_entries() {
    with_temp_home(|home| {
        let state_dir = home.join(config::STATE_DIR_NAME);
        fs::create_dir_all(&state_dir).unwrap();
        let history_path = state_dir.join(config::HISTORY_FILE_NAME);

        let entries: Vec<String> = (0..2500).map(|i| format!("entry {}", i)).collect();
        fs::write(&history_path, entries.join("\n") + "\n").unwrap();

        let contents = fs::read_to_string(&history_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        let trimmed = config::trim_history_lines(&lines, config::DEFAULT_HISTORY_LIMIT);
        fs::write(&history_path, trimmed.join("\n") + "\n").unwrap();

        let refreshed = fs::read_to_string(&history_path).unwrap();
        let refreshed_lines: Vec<&str> = refreshed.lines().collect();
        assert_eq!(refreshed_lines.len(), config::DEFAULT_HISTORY_LIMIT);
        assert_eq!(refreshed_lines.last(), Some(&"entry 2499"));
    });
}
