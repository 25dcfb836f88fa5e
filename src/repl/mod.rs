use std::env;
use std::io;
use std::path::PathBuf;

use ansi_term::Color;
use linefeed::{Interface, ReadResult, Terminal};
use tracing::{info, warn};

use crate::evaluator::{self, prelude, Env};
use crate::printer;

static HISTORY_FILE: &str = "lispy.history";
static HISTORY_VAR: &str = "LISPY_HISTORY";
static PROMPT: &str = "lispy=> ";

/// Config holds the settings of an interactive session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub history_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: PROMPT.into(),
            history_file: PathBuf::from(HISTORY_FILE),
        }
    }
}

impl Config {
    /// from_env starts from the defaults and lets `LISPY_HISTORY` relocate the history file.
    pub fn from_env() -> Self {
        Config::with_history_override(env::var_os(HISTORY_VAR).map(PathBuf::from))
    }

    fn with_history_override(history_file: Option<PathBuf>) -> Self {
        let mut config = Config::default();
        if let Some(history_file) = history_file {
            config.history_file = history_file;
        }
        config
    }
}

fn configure_reader<T: Terminal>(reader: &Interface<T>, config: &Config) -> io::Result<()> {
    let mut reader = reader.lock_reader();
    reader.set_blink_matching_paren(true);

    let style = Color::Purple.bold();

    reader.set_prompt(&format!(
        "\x01{prefix}\x02{text}\x01{suffix}\x02",
        prefix = style.prefix(),
        text = config.prompt,
        suffix = style.suffix()
    ))
}

pub fn run(config: &Config) -> io::Result<()> {
    let reader = Interface::new("lispy")?;
    configure_reader(&reader, config)?;

    if let Err(e) = reader.load_history(&config.history_file) {
        if e.kind() == io::ErrorKind::NotFound {
            info!(
                path = %config.history_file.display(),
                "history file doesn't exist, not loading history"
            );
        } else {
            warn!(path = %config.history_file.display(), error = %e, "could not load history file");
        }
    }

    // one global environment for the whole session
    let env = prelude::env();

    loop {
        match reader.read_line()? {
            ReadResult::Input(input) => {
                if input.trim().is_empty() {
                    continue;
                }
                reader.add_history_unique(input.clone());
                rep(&input, &env)?
            }
            ReadResult::Eof => {
                print!("^D");
                break;
            }
            ReadResult::Signal(signal) => {
                println!("signal: {:?}", signal);
                break;
            }
        }
    }

    if let Err(e) = reader.save_history(&config.history_file) {
        warn!(path = %config.history_file.display(), error = %e, "could not save history file");
    }

    Ok(())
}

fn rep(input: &str, env: &Env) -> io::Result<()> {
    let results = evaluator::eval_in(input, env);
    if results.iter().any(|result| result.is_err()) {
        let mut rendered = Vec::new();
        printer::println_to(&mut rendered, results.as_slice())?;
        print!("{}", Color::Red.paint(String::from_utf8_lossy(&rendered)));
        Ok(())
    } else {
        printer::println_to(io::stdout(), results.as_slice())
    }
}
