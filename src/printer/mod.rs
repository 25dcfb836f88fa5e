use std::io;

use crate::evaluator::{Result, Value};

pub fn print_value_to(mut out: impl io::Write, value: &Value) -> io::Result<()> {
    write!(&mut out, "{}", value)
}

/// print_to writes each result, separated by newlines; errors are written in place of the value they replaced.
pub fn print_to(mut out: impl io::Write, results: &[Result<Value>]) -> io::Result<()> {
    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            writeln!(&mut out)?;
        }
        match result {
            Ok(value) => print_value_to(&mut out, value)?,
            Err(e) => write!(&mut out, "error: {}", e)?,
        }
    }
    Ok(())
}

pub fn println_to(mut out: impl io::Write, results: &[Result<Value>]) -> io::Result<()> {
    if results.is_empty() {
        return Ok(());
    }
    print_to(&mut out, results)?;
    writeln!(&mut out)
}
