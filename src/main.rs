// ABOUTME: CLI entry point — `vibe run <path>` and `vibe interactive`/`i`

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::{Path, PathBuf};
use vibe::config;
use vibe::env::Environment;
use vibe::error::VibeError;
use vibe::eval::{evaluate_incremental, Evaluator, ModuleResolver};
use vibe::highlighter::VibeHelper;
use vibe::lexer::{Lexer, TokenKind};
use vibe::value::Value;

/// Vibe: a small dynamically-evaluated scripting language with optional
/// type annotations
#[derive(Parser, Debug)]
#[command(name = "vibe")]
#[command(version = config::VERSION)]
#[command(about = "A small dynamically-evaluated scripting language")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a Vibe source file
    Run {
        /// Path to a .vi source file (the extension may be omitted)
        path: PathBuf,
    },
    /// Start the interactive REPL
    #[command(alias = "i")]
    Interactive,
}

/// Resolves `require` paths against the filesystem, relative to the
/// directory the entry-point script lives in (or the current directory,
/// in the REPL). The core evaluator never touches a filesystem directly —
/// this is the host-side half of `ModuleResolver` (spec.md §1).
struct FsResolver {
    base_dir: PathBuf,
}

impl FsResolver {
    fn new(base_dir: PathBuf) -> Self {
        FsResolver { base_dir }
    }
}

impl ModuleResolver for FsResolver {
    fn resolve(&self, path: &str) -> Result<String, String> {
        let candidate = self.base_dir.join(path);
        let with_ext = resolve_source_path(&candidate);
        std::fs::read_to_string(&with_ext)
            .map_err(|e| format!("cannot read {}: {}", with_ext.display(), e))
    }
}

/// Appends the `.vi` extension when `path` doesn't already exist and has
/// no extension of its own.
fn resolve_source_path(path: &Path) -> PathBuf {
    if path.exists() || path.extension().is_some() {
        return path.to_path_buf();
    }
    path.with_extension(config::SOURCE_EXTENSION)
}

fn main() {
    let args = CliArgs::parse();

    let exit_code = match args.command {
        Some(Command::Run { path }) => run_script(&path),
        Some(Command::Interactive) | None => run_repl(),
    };

    std::process::exit(exit_code);
}

fn run_script(path: &Path) -> i32 {
    let resolved = resolve_source_path(path);
    let source = match std::fs::read_to_string(&resolved) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: cannot read file: {}", resolved.display(), e);
            return 1;
        }
    };

    let base_dir = resolved
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let resolver = FsResolver::new(base_dir);
    let evaluator = Evaluator::new(&resolver);
    let env = Environment::new();

    match evaluate_incremental(&evaluator, &env, &source) {
        Err(parse_errors) => {
            for e in &parse_errors {
                report_error(&resolved, e);
            }
            1
        }
        Ok(Value::Error(e)) => {
            report_error(&resolved, &e);
            1
        }
        Ok(Value::Nil) => 0,
        Ok(other) => {
            println!("{}: {}", other, other.type_name());
            0
        }
    }
}

fn report_error(path: &Path, e: &VibeError) {
    eprintln!("{}:{}:{}: {}", path.display(), e.line(), e.column(), e);
}

fn run_repl() -> i32 {
    let rl_config = Config::builder().auto_add_history(false).build();
    let mut rl: Editor<VibeHelper, rustyline::history::DefaultHistory> =
        match Editor::with_config(rl_config) {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize REPL: {}", e);
                return 1;
            }
        };
    rl.set_helper(Some(VibeHelper::new()));

    let history_path = history_file_path();
    if let Some(dir) = history_path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let _ = rl.load_history(&history_path);

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let resolver = FsResolver::new(cwd);
    let evaluator = Evaluator::new(&resolver);
    let env = Environment::new();

    'outer: loop {
        let mut buffer = String::new();
        let mut prompt = ">> ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if buffer.is_empty() && line.trim() == "exit" {
                        break 'outer;
                    }
                    if buffer.is_empty() && line.trim() == "help" {
                        println!("{}", config::HELP_TEXT);
                        continue 'outer;
                    }
                    buffer.push_str(&line);
                    buffer.push('\n');
                    if needs_continuation(&buffer) {
                        prompt = ".. ";
                        continue;
                    }
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue 'outer;
                }
                Err(ReadlineError::Eof) => {
                    println!("\nGoodbye!");
                    break 'outer;
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break 'outer;
                }
            }
        }

        if buffer.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(buffer.trim_end());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            evaluate_incremental(&evaluator, &env, &buffer)
        }));

        match outcome {
            Ok(Ok(Value::Error(e))) => eprintln!("Error: {}", e),
            Ok(Ok(Value::Nil)) => {}
            Ok(Ok(other)) => println!("=> {}", other),
            Ok(Err(parse_errors)) => {
                for e in &parse_errors {
                    eprintln!("Parse error ({}:{}): {}", e.line(), e.column(), e);
                }
            }
            Err(_) => eprintln!("Evaluation error: the interpreter hit an internal fault"),
        }
    }

    let _ = std::fs::create_dir_all(history_path.parent().unwrap_or(Path::new(".")));
    let _ = rl.save_history(&history_path);
    trim_history_file(&history_path, config::DEFAULT_HISTORY_LIMIT);

    0
}

fn history_file_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(config::STATE_DIR_NAME)
        .join(config::HISTORY_FILE_NAME)
}

/// Keeps only the last `limit` entries in the saved history file.
fn trim_history_file(path: &Path, limit: usize) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return;
    };
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() <= limit {
        return;
    }
    let trimmed = config::trim_history_lines(&lines, limit).join("\n");
    let _ = std::fs::write(path, trimmed + "\n");
}

/// Re-tokenizes the accumulated buffer and counts unmatched block-openers
/// against `end`, and `[` against `]`. A substring scan over keywords would
/// misfire on an identifier that merely contains "end"; re-lexing doesn't.
fn needs_continuation(buffer: &str) -> bool {
    let mut opens = 0i32;
    let mut brackets = 0i32;
    let mut lexer = Lexer::new(buffer);

    loop {
        let tok = lexer.next();
        match tok.kind {
            TokenKind::Eof => break,
            TokenKind::If
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Def
            | TokenKind::Class
            | TokenKind::Do => opens += 1,
            TokenKind::End => opens -= 1,
            TokenKind::LBracket => brackets += 1,
            TokenKind::RBracket => brackets -= 1,
            _ => {}
        }
    }

    opens > 0 || brackets > 0
}
