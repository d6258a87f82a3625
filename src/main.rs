// jester - A Clojure-family interpreter and linter written in Rust
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, Read as _, Write};
use std::process;

use jester_core::error::Error;
use jester_core::{
    ensure_initialized, eval, parse, with_runtime, Dialect, LocalEnv, ParseContext,
};
use jester_reader::{JesterVal, Reader};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to do with each form read from a source.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Read,
    Parse,
    Eval,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && (args[1] == "-v" || args[1] == "--version") {
        println!("jester v{}", VERSION);
        return;
    }

    if let Err(e) = ensure_initialized() {
        eprintln!("Failed to load the core library: {}", e);
        process::exit(1);
    }

    if args.len() == 1 {
        repl(Phase::Eval);
        return;
    }

    let code = match args[1].as_str() {
        "--read" => with_file_arg(&args, |file| process_file(file, Phase::Read)),
        "--parse" => with_file_arg(&args, |file| process_file(file, Phase::Parse)),
        "--lint" => with_file_arg(&args, |file| lint_file(file, detect_dialect(file))),
        "--lintclj" => with_file_arg(&args, |file| lint_file(file, Dialect::Clj)),
        "--lintcljs" => with_file_arg(&args, |file| lint_file(file, Dialect::Cljs)),
        "--lintjoker" => with_file_arg(&args, |file| lint_file(file, Dialect::Joker)),
        "--lintedn" => with_file_arg(&args, |file| lint_file(file, Dialect::Edn)),
        file => process_file(file, Phase::Eval),
    };
    process::exit(code);
}

fn with_file_arg(args: &[String], f: impl FnOnce(&str) -> i32) -> i32 {
    match args.get(2) {
        Some(file) => f(file),
        None => {
            eprintln!("Error: {} requires a file argument", args[1]);
            1
        }
    }
}

fn detect_dialect(filename: &str) -> Dialect {
    if filename.ends_with(".edn") {
        Dialect::Edn
    } else if filename.ends_with(".cljs") {
        Dialect::Cljs
    } else if filename.ends_with(".joke") {
        Dialect::Joker
    } else {
        Dialect::Clj
    }
}

/// Read a source file, `--` meaning standard input.
fn read_source(filename: &str) -> Result<(String, String), io::Error> {
    if filename == "--" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok((source, "<stdin>".to_string()))
    } else {
        Ok((fs::read_to_string(filename)?, filename.to_string()))
    }
}

/// Process one file in the given phase. Returns the process exit code.
fn process_file(filename: &str, phase: Phase) -> i32 {
    let (source, display_name) = match read_source(filename) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: could not read '{}': {}", filename, e);
            return 1;
        }
    };
    match process_source(&source, &display_name, phase) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

fn process_source(source: &str, filename: &str, phase: Phase) -> Result<(), Error> {
    let features = with_runtime(|rt| rt.features());
    let mut reader = Reader::new(source, Some(filename))?.with_features(features);
    loop {
        let ns_name = with_runtime(|rt| rt.current_ns().name().name().to_string());
        reader.set_current_ns(&ns_name);
        let Some(form) = reader.read()? else {
            return Ok(());
        };
        match phase {
            Phase::Read => println!("{}", form.to_readable_string()),
            Phase::Parse => {
                let mut ctx = ParseContext::new();
                let parsed = parse(&form, &mut ctx)?;
                println!("{}", parsed);
            }
            Phase::Eval => {
                let mut ctx = ParseContext::new();
                let parsed = parse(&form, &mut ctx)?;
                eval(&parsed, &LocalEnv::new())?;
            }
        }
    }
}

/// Lint a file: parse-only analysis under the dialect's feature profile.
/// EDN sources only run the reader. Warnings and errors both fail the
/// lint.
fn lint_file(filename: &str, dialect: Dialect) -> i32 {
    with_runtime(|rt| rt.configure_linter(dialect));
    let phase = if dialect == Dialect::Edn {
        Phase::Read
    } else {
        Phase::Parse
    };

    let (source, display_name) = match read_source(filename) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: could not read '{}': {}", filename, e);
            return 1;
        }
    };

    let mut problems = 0usize;
    if let Err(e) = lint_source(&source, &display_name, phase) {
        eprintln!("{}", e);
        problems += 1;
    }
    for warning in with_runtime(|rt| rt.take_warnings()) {
        eprintln!("{}", warning);
        problems += 1;
    }
    i32::from(problems > 0)
}

fn lint_source(source: &str, filename: &str, phase: Phase) -> Result<(), Error> {
    let features = with_runtime(|rt| rt.features());
    let mut reader = Reader::new(source, Some(filename))?.with_features(features);
    loop {
        let Some(form) = reader.read()? else {
            return Ok(());
        };
        if phase == Phase::Parse {
            let mut ctx = ParseContext::new();
            let _ = parse(&form, &mut ctx)?;
        }
    }
}

// ---------------------------------------------------------------------------
// The interactive prompt
// ---------------------------------------------------------------------------

/// The prompt's context vars: `*1` `*2` `*3` hold recent results, `*e`
/// the last uncaught error.
struct ReplContext {
    first: jester_reader::JesterVar,
    second: jester_reader::JesterVar,
    third: jester_reader::JesterVar,
    exc: jester_reader::JesterVar,
}

impl ReplContext {
    fn new() -> Self {
        with_runtime(|rt| {
            let core = rt.registry().core_ns();
            ReplContext {
                first: core.intern("*1"),
                second: core.intern("*2"),
                third: core.intern("*3"),
                exc: core.intern("*e"),
            }
        })
    }

    fn push_value(&self, val: JesterVal) {
        let second = self.second.deref().unwrap_or(JesterVal::Nil);
        self.third.set_root(second);
        let first = self.first.deref().unwrap_or(JesterVal::Nil);
        self.second.set_root(first);
        self.first.set_root(val);
    }

    fn push_exception(&self, exc: JesterVal) {
        self.exc.set_root(exc);
    }
}

fn repl(phase: Phase) {
    println!("Welcome to jester v{}. Use ctrl-d to exit.", VERSION);
    let ctx = ReplContext::new();

    loop {
        let ns_name = with_runtime(|rt| rt.current_ns().name().name().to_string());
        print!("{}=> ", ns_name);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                return;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                repl_line(line, phase, &ctx);
            }
            Err(e) => {
                eprintln!("Read error: {}", e);
                return;
            }
        }
    }
}

fn repl_line(line: &str, phase: Phase, ctx: &ReplContext) {
    let features = with_runtime(|rt| rt.features());
    let mut reader = match Reader::new(line, Some("<repl>")) {
        Ok(reader) => reader.with_features(features),
        Err(e) => {
            eprintln!("{}", Error::from(e));
            return;
        }
    };
    loop {
        let ns_name = with_runtime(|rt| rt.current_ns().name().name().to_string());
        reader.set_current_ns(&ns_name);
        let form = match reader.read() {
            Ok(Some(form)) => form,
            Ok(None) => return,
            Err(e) => {
                let err = Error::from(e);
                ctx.push_exception(err.to_value());
                eprintln!("{}", err);
                return;
            }
        };
        if phase == Phase::Read {
            println!("{}", form.to_readable_string());
            continue;
        }
        let mut parse_ctx = ParseContext::new();
        let parsed = match parse(&form, &mut parse_ctx) {
            Ok(parsed) => parsed,
            Err(e) => {
                ctx.push_exception(e.to_value());
                eprintln!("{}", e);
                continue;
            }
        };
        if phase == Phase::Parse {
            println!("{}", parsed);
            continue;
        }
        match eval(&parsed, &LocalEnv::new()) {
            Ok(result) => match jester_core::eval::deep_realize(&result) {
                Ok(realized) => {
                    ctx.push_value(realized.clone());
                    println!("{}", realized.to_readable_string());
                }
                Err(e) => {
                    ctx.push_exception(e.to_value());
                    eprintln!("{}", e);
                }
            },
            Err(e) => {
                ctx.push_exception(e.to_value());
                eprintln!("{}", e);
            }
        }
    }
}
