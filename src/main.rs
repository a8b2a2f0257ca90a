use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};

use quill::interpreter::{Evaluator, QuillError};
use quill::lexer::{self, Lexer};
use quill::parser::Parser;
use quill::runtime::value::Exception;
use quill::token::TokenKind;

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    match (args.next(), args.next()) {
        (None, _) => match repl() {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("{error:#}");
                ExitCode::FAILURE
            }
        },
        (Some(path), None) => run_file(&path),
        (Some(_), Some(_)) => {
            eprintln!("usage: quill [script]");
            ExitCode::from(2)
        }
    }
}

fn repl() -> Result<()> {
    println!("quill {}", env!("CARGO_PKG_VERSION"));
    println!("exit with ctrl+d");

    let mut evaluator = Evaluator::new();
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().context("Flushing prompt")?;

        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line).context("Reading input")?;
        if read == 0 {
            println!();
            return Ok(());
        }

        // REPL diagnostics go to stdout so they interleave with the prompt.
        match evaluator.run_string(&line) {
            Ok(()) => {}
            Err(QuillError::Compile(errors)) => {
                for error in errors {
                    println!("compile error: {error}");
                }
            }
            Err(QuillError::Runtime(exception)) => print_exception(&exception, false),
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    match try_run_file(path) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

// Returns Ok(false) for compile/runtime failures that were already reported.
fn try_run_file(path: &str) -> Result<bool> {
    let source = fs::read_to_string(path).with_context(|| format!("Reading {path}"))?;

    println!("== Source ==");
    println!("{}", source.trim());

    println!("== Tokens ==");
    let mut lexer = Lexer::new(&source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error);
        tokens.push(token);
        if done {
            break;
        }
    }
    print!("{}", lexer::dump_tokens(&tokens));

    lexer.reset();
    let (script, errors) = Parser::new(&mut lexer).parse();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("compile error: {error}");
        }
        return Ok(false);
    }

    println!("== AST ==");
    print!("{script}");

    println!("== Output ==");
    let mut evaluator = Evaluator::new();
    let started = Instant::now();
    if let Err(exception) = evaluator.run(&script) {
        print_exception(&exception, true);
        return Ok(false);
    }

    println!("== Done ==");
    println!("finished in {:.3?}", started.elapsed());
    Ok(true)
}

fn print_exception(exception: &Exception, to_stderr: bool) {
    let mut lines = vec![format!("runtime error: {exception}")];
    for frame in exception.trace.iter().rev() {
        lines.push(format!("  at {frame}"));
    }
    for line in lines {
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}
