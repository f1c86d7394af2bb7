//! Kromium CLI and REPL
//!
//! Usage:
//!   kromium run <file.kr>   - Execute a Kromium file
//!   kromium repl            - Start interactive REPL
//!   kromium help            - Show help message

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use kromium::{Interpreter, KromiumError, Value, VERSION};

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: kromium run <file.kr>");
                process::exit(1);
            }
            run_file(&args[2]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Kromium {}", VERSION),
        _ => {
            // Assume it's a file
            if args[1].ends_with(".kr") {
                run_file(&args[1]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(1);
            }
        }
    }
}

/// Install a fmt subscriber when `RUST_LOG` is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn print_help() {
    println!("{}", "Kromium".cyan().bold());
    println!("A small statically-declared scripting language");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  kromium run <file.kr>    Execute a Kromium file");
    println!("  kromium repl             Start interactive REPL");
    println!("  kromium help             Show this help message");
    println!("  kromium version          Show version\n");
    println!("{}", "EXAMPLES:".yellow());
    println!("  kromium run demos/fib.kr");
    println!("  kromium repl\n");
    print_language_summary();
}

fn print_language_summary() {
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  new int x = 10                    Typed declaration");
    println!("  new const string s = \"hi\"         Constant");
    println!("  x += 1                            Compound reassignment");
    println!("  func add(a, b) -> a + b           Function definition");
    println!("  for i; i < 3; i += 1 -> i         Loop collecting [0, 1, 2]");
    println!("  include \"lib.kr\"                  Evaluate another file");
}

fn report(err: &KromiumError) {
    eprintln!("{}", err.to_string().red());
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    };

    // Includes resolve against the script's directory
    let base_path = Path::new(path)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let mut interpreter = Interpreter::new().with_base_path(base_path);
    if let Err(e) = interpreter.run(path, &source) {
        report(&e);
        process::exit(1);
    }
}

fn run_repl() {
    println!(
        "{} {} - {}",
        "Kromium".cyan().bold(),
        VERSION.cyan(),
        "A small statically-declared language".dimmed()
    );
    println!("Type {} to exit, {} for help\n", "exit".yellow(), "help".yellow());

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start REPL: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // Bindings persist across REPL lines
    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline(&format!("{} ", "kromium>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    "clear" => {
                        interpreter.reset();
                        println!("{}", "State cleared.".dimmed());
                        continue;
                    }
                    _ => {}
                }

                match interpreter.run("<stdin>", line) {
                    Ok(value) => {
                        if value != Value::null() {
                            println!("{} {}", "=>".dimmed(), value.to_string().cyan());
                        }
                    }
                    Err(e) => report(&e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  clear        Discard every binding");
    println!("  help         Show this help\n");
    print_language_summary();
}
