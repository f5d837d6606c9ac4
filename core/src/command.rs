//! Command — one parsed operator input line.
//!
//! A raw line such as `goto pos 10 64 -3 2` is split into a lower-cased
//! command name and an ordered list of argument tokens. Whitespace inside a
//! pair of double quotes does not split, so `say "hello there"` yields the
//! single argument `"hello there"` (quotes are kept, not stripped).
//!
//! Tokenizing never fails: an empty line produces a command with an empty
//! name, which the scheduler later reports as an unknown command.

use std::fmt;


/// A parsed command line. Immutable once produced by [`parse_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}


impl Command {
    /// Build a command directly. The name is lower-cased; args keep their case.
    pub fn new(name: &str, args: Vec<String>) -> Self {
        Command {
            name: name.to_lowercase(),
            args,
        }
    }

    /// The case-normalized command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument tokens in their original order.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}


impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}


/// Tokenize a raw input line into a [`Command`].
pub fn parse_command(line: &str) -> Command {
    let mut tokens = tokenize(line).into_iter();
    let name = tokens.next().unwrap_or_default();
    Command::new(&name, tokens.collect())
}


/// Split `line` on runs of whitespace, keeping quoted spans together.
///
/// Quotes pair up left to right. When the line holds an odd number of
/// quotes the last one has no partner and is treated as a plain character.
pub fn tokenize(line: &str) -> Vec<String> {
    let quote_count = line.matches('"').count();
    let mut quotes_left = quote_count - quote_count % 2;

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' && (in_quotes || quotes_left > 0) {
            in_quotes = !in_quotes;
            quotes_left = quotes_left.saturating_sub(1);
            current.push(ch);
        } else if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
