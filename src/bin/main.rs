use std::env;
use std::fs;
use std::io;
use std::process;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lispy::evaluator::{self, prelude};
use lispy::printer;
use lispy::reader;
use lispy::repl::{self, Config};

/// init_tracing installs a subscriber only when `RUST_LOG` is set, e.g. `RUST_LOG=lispy=trace`.
fn init_tracing() {
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &str) -> io::Result<bool> {
    let source = fs::read_to_string(path)?;
    let env = prelude::env();

    let data = match reader::read(&source) {
        Ok(data) => data,
        Err(e) => {
            printer::println_to(io::stderr(), &[Err(e.into())])?;
            return Ok(false);
        }
    };

    // forms run in order and the first failure stops the file
    for datum in &data {
        let result = evaluator::analyze(datum).and_then(|expr| evaluator::eval_expr(&expr, &env));
        if result.is_err() {
            printer::println_to(io::stderr(), &[result])?;
            return Ok(false);
        }
        printer::println_to(io::stdout(), &[result])?;
    }

    Ok(true)
}

fn main() -> io::Result<()> {
    init_tracing();

    match env::args().nth(1) {
        Some(path) => {
            if !run_file(&path)? {
                process::exit(1);
            }
            Ok(())
        }
        None => repl::run(&Config::from_env()),
    }
}
