//! Line-oriented operator prompts over any reader/writer pair.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

pub struct Prompter<'a> {
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
}

impl<'a> Prompter<'a> {
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Prints `label` without a newline and returns the trimmed reply.
    pub fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Empty reply yields `default`; an unparsable one yields `None`.
    pub fn ask_parsed<T: FromStr>(&mut self, label: &str, default: T) -> io::Result<Option<T>> {
        let reply = self.ask(label)?;
        if reply.is_empty() {
            return Ok(Some(default));
        }
        Ok(reply.parse().ok())
    }

    pub fn confirm(&mut self, label: &str) -> io::Result<bool> {
        let reply = self.ask(label)?.to_lowercase();
        Ok(reply == "y" || reply == "yes")
    }

    /// Waits for Enter.
    pub fn pause(&mut self, label: &str) -> io::Result<()> {
        self.ask(label).map(|_| ())
    }
}

impl Prompter<'static> {
    pub fn stdio() -> Self {
        Prompter::new(io::stdin().lock(), io::stdout())
    }
}
