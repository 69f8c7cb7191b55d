//! # Tracking and processing for commands
//!
//! ## Overview
//!
//! This module contains the table that maps command names typed at the `:` prompt onto their
//! handlers. Commands are registered under a full name and any number of aliases. A name that
//! isn't registered may still select a command if it is a prefix of exactly one full name, so
//! `:sor` runs `:sort`.
//!
use std::fmt::Debug;
use std::str::FromStr;

use radix_trie::Trie;

use crate::util::completion_keys;

/// Errors that can be encountered during command processing.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum CommandError {
    /// Error for unmapped commands.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Error for bad command arguments.
    #[error("Invalid argument")]
    InvalidArgument,

    /// Error for bad ranges.
    #[error("Invalid range")]
    InvalidRange,

    /// Error for command parse failures.
    #[error("Failed to parse command: {0}")]
    ParseFailed(String),

    /// Error for a pattern or replacement that isn't terminated.
    #[error("Missing delimiter after {0:?}")]
    MissingDelimiter(String),

    /// Error for a bad regular expression.
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Error for a search that matched nothing.
    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    /// Error for reusing a search pattern or substitution before one has been given.
    #[error("No previous regular expression")]
    NoPreviousPattern,

    /// Error for running `:global` from within `:global`.
    #[error("Cannot do :global recursively")]
    Recursive,

    /// Generic error.
    #[error("Error: {0}")]
    Error(String),
}

/// Result type for individual, mapped commands.
pub type CommandResult = Result<(), CommandError>;

/// Trait for result type of parsing commands.
pub trait ParsedCommand: Debug + FromStr<Err = String> {
    /// Get the name of the command being executed.
    fn name(&self) -> String;
}

/// Trait for mapped commands.
pub trait Command: Clone {
    /// Result of parsing a command string.
    type Parsed: ParsedCommand;

    /// Context passed to [Command::exec].
    type Context;

    /// The primary name to map this command under.
    fn name(&self) -> String;

    /// Additional names to map this command under.
    fn aliases(&self) -> Vec<String>;

    /// Execute this command.
    fn exec(&self, cmd: Self::Parsed, ctx: &mut Self::Context) -> CommandResult;
}

/// Track mapped commands and handle their execution.
#[derive(Debug)]
pub struct CommandMachine<C: Command> {
    names: Trie<String, C>,
    aliases: Trie<String, C>,
    unnamed: Option<C>,
}

impl<C: Command> CommandMachine<C> {
    /// Create a new instance.
    pub fn new() -> Self {
        let names = Trie::new();
        let aliases = Trie::new();

        CommandMachine { names, aliases, unnamed: None }
    }

    /// Map a command under its names.
    ///
    /// A command whose name is empty runs when the input contains only a range, like `:5`.
    pub fn add_command(&mut self, cmd: C) {
        let name = cmd.name();

        if name.is_empty() {
            self.unnamed = Some(cmd);
            return;
        }

        for alias in cmd.aliases().into_iter() {
            self.aliases.insert(alias, cmd.clone());
        }

        self.names.insert(name, cmd);
    }

    /// Generate a list of completion candidates for command names.
    pub fn complete_name(&self, prefix: &str) -> Vec<String> {
        completion_keys(&self.names, prefix)
    }

    /// Look up a command by its name, an alias, or a unique prefix of its name.
    pub fn get(&self, name: &str) -> Result<&C, CommandError> {
        if let Some(m) = self.names.get(name) {
            return Ok(m);
        }

        if let Some(m) = self.aliases.get(name) {
            return Ok(m);
        }

        let candidates: Vec<String> = self
            .complete_name(name)
            .into_iter()
            .filter(|full| full.starts_with(name))
            .collect();

        if let [full] = candidates.as_slice() {
            if let Some(m) = self.names.get(full) {
                return Ok(m);
            }
        }

        Err(CommandError::InvalidCommand(name.into()))
    }

    /// Parse and execute a command string.
    pub fn input_cmd(&self, input: &str, ctx: &mut C::Context) -> CommandResult {
        let cmd = C::Parsed::from_str(input).map_err(CommandError::ParseFailed)?;
        let name = cmd.name();

        if name.is_empty() {
            return match &self.unnamed {
                Some(unnamed) => unnamed.exec(cmd, ctx),
                None => Ok(()),
            };
        }

        self.get(&name)?.exec(cmd, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Words(Vec<String>);

    impl FromStr for Words {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, String> {
            if s.contains('!') {
                return Err(s.to_string());
            }

            Ok(Words(s.split_whitespace().map(String::from).collect()))
        }
    }

    impl ParsedCommand for Words {
        fn name(&self) -> String {
            self.0.first().cloned().unwrap_or_default()
        }
    }

    #[derive(Clone)]
    struct Record {
        name: &'static str,
        aliases: Vec<String>,
    }

    impl Command for Record {
        type Parsed = Words;
        type Context = Vec<String>;

        fn name(&self) -> String {
            self.name.to_string()
        }

        fn aliases(&self) -> Vec<String> {
            self.aliases.clone()
        }

        fn exec(&self, cmd: Words, ctx: &mut Vec<String>) -> CommandResult {
            ctx.push(format!("{}:{}", self.name, cmd.0.len()));

            Ok(())
        }
    }

    fn machine() -> CommandMachine<Record> {
        let mut cmds = CommandMachine::new();

        cmds.add_command(Record { name: "substitute", aliases: strs!["s"] });
        cmds.add_command(Record { name: "sort", aliases: vec![] });
        cmds.add_command(Record { name: "delete", aliases: strs!["d"] });
        cmds.add_command(Record { name: "", aliases: vec![] });

        cmds
    }

    #[test]
    fn test_lookup() {
        let cmds = machine();

        assert_eq!(cmds.get("substitute").map(|c| c.name), Ok("substitute"));
        assert_eq!(cmds.get("s").map(|c| c.name), Ok("substitute"));
        assert_eq!(cmds.get("sor").map(|c| c.name), Ok("sort"));
        assert_eq!(cmds.get("del").map(|c| c.name), Ok("delete"));
        assert_eq!(cmds.get("su").map(|c| c.name), Ok("substitute"));
        assert_eq!(cmds.get("xyz").map(|c| c.name), Err(CommandError::InvalidCommand("xyz".into())));
    }

    #[test]
    fn test_input_cmd() {
        let cmds = machine();
        let mut ctx = vec![];

        cmds.input_cmd("s a b", &mut ctx).unwrap();
        cmds.input_cmd("delete", &mut ctx).unwrap();
        cmds.input_cmd("", &mut ctx).unwrap();

        assert_eq!(ctx, strs!["substitute:3", "delete:1", ":0"]);

        let err = cmds.input_cmd("bad!", &mut ctx).unwrap_err();
        assert_eq!(err, CommandError::ParseFailed("bad!".into()));

        let err = cmds.input_cmd("nope", &mut ctx).unwrap_err();
        assert_eq!(err, CommandError::InvalidCommand("nope".into()));
    }
}
