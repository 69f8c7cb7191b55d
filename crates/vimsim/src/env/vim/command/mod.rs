//! # Vim Commands
//!
//! ## Overview
//!
//! These components parse the text typed after `:` and run it against a [VimState]. Each
//! command gets the parsed [CommandDescription] and a [CommandContext] holding a copy of the
//! state, so a command that fails partway through never leaves a half-edited buffer behind.
//!
//! Supported commands:
//!
//! - `:{range}` on its own, which moves to the last line of the range
//! - `:substitute`, `:&`, `:&&` and `:~`
//! - `:global` and `:vglobal`
//! - `:sort`, `:delete`, `:join`, `:move`, `:copy`, `:>` and `:<`
//! - `:set`, for the options in [InterpreterConfig]
//! - `:write`, `:quit` and friends, which do nothing
use std::cmp::Ordering;
use std::fmt;

use regex::Captures;
use tracing::debug;

use crate::commands::{Command, CommandError, CommandMachine, CommandResult};
use crate::config::InterpreterConfig;
use crate::editing::cursor::Cursor;
use crate::errors::EditError;
use crate::prelude::MoveDir1D;
use crate::state::{Substitution, VimState};

use super::ops;
use super::regex::{compile, expand_replacement, replacement_len};

pub mod parse;

pub use self::parse::{
    CommandArgument,
    CommandDescription,
    RangeEnding,
    RangeEndingModifier,
    RangeEndingType,
    RangeSearchInit,
    RangeSpec,
};

use self::parse::{is_delimiter, parse_delimited, parse_sub_flags, split_delimited, SubFlags};

/// Handler for a mapped command.
pub type CommandFunc = fn(CommandDescription, &mut CommandContext) -> CommandResult;

/// Description of a mapped Vim command.
pub struct VimCommand {
    /// Primary name of this command.
    pub name: String,

    /// Additional names for this command.
    pub aliases: Vec<String>,

    /// Function that handles command.
    pub f: CommandFunc,
}

impl Clone for VimCommand {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            f: self.f,
        }
    }
}

impl fmt::Debug for VimCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VimCommand")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl Command for VimCommand {
    type Parsed = CommandDescription;
    type Context = CommandContext;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    fn exec(&self, cmd: Self::Parsed, ctx: &mut Self::Context) -> CommandResult {
        (self.f)(cmd, ctx)
    }
}

/// How a command moved lines around, so that `:global` can find the lines it marked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LineChange {
    /// `old` lines starting at `start` were replaced by `new` lines.
    Replace { start: usize, old: usize, new: usize },

    /// The lines from `start` to `end` were removed and then inserted at index `dest`.
    Move { start: usize, end: usize, dest: usize },
}

impl LineChange {
    /// Where line `m` ended up, or `None` if it's gone.
    fn remap(&self, m: usize) -> Option<usize> {
        match *self {
            LineChange::Replace { start, old, new } => {
                if m < start {
                    Some(m)
                } else if m >= start + old {
                    Some(m - old + new)
                } else if old == new {
                    Some(m)
                } else {
                    None
                }
            },
            LineChange::Move { start, end, dest } => {
                let n = end - start + 1;

                if m >= start && m <= end {
                    return Some(dest + (m - start));
                }

                let m = if m > end { m - n } else { m };

                if m >= dest {
                    Some(m + n)
                } else {
                    Some(m)
                }
            },
        }
    }
}

/// Context object passed to each [CommandFunc].
#[derive(Clone, Debug)]
pub struct CommandContext {
    /// The state the command edits.
    pub state: VimState,

    global: bool,
    changes: Vec<LineChange>,
}

impl From<VimState> for CommandContext {
    fn from(state: VimState) -> Self {
        CommandContext { state, global: false, changes: vec![] }
    }
}

fn sum_mods(mods: &[RangeEndingModifier]) -> (MoveDir1D, usize) {
    let mut dir = MoveDir1D::Next;
    let mut off: usize = 0;

    for modifier in mods.iter() {
        match modifier {
            RangeEndingModifier::Offset(md, count) => {
                let count = *count;

                match (*md == dir, count.cmp(&off)) {
                    (true, _) => {
                        off = off.saturating_add(count);
                    },
                    (false, Ordering::Less) => {
                        off -= count;
                    },
                    (false, Ordering::Equal) => {
                        dir = dir.flip();
                        off = 0;
                    },
                    (false, Ordering::Greater) => {
                        dir = dir.flip();
                        off = count - off;
                    },
                }
            },
        }
    }

    (dir, off)
}

/// Resolve an address to a line number counted from 1, where 0 is the position before the
/// first line.
fn resolve_address(
    ending: &RangeEnding,
    base: usize,
    state: &VimState,
) -> Result<usize, CommandError> {
    let RangeEnding(kind, mods) = ending;
    let last = state.buffer.get_lines();

    let line = match kind {
        RangeEndingType::Absolute(n) => *n,
        RangeEndingType::Current => state.cursor.y + 1,
        RangeEndingType::Last => last,
        RangeEndingType::Unspecified => base,
        RangeEndingType::VisualBegin => {
            let (start, _) = state.persist.last_visual.ok_or(CommandError::InvalidRange)?;
            start + 1
        },
        RangeEndingType::VisualEnd => {
            let (_, end) = state.persist.last_visual.ok_or(CommandError::InvalidRange)?;
            end + 1
        },
        RangeEndingType::All => {
            return Err(CommandError::InvalidRange);
        },
    };

    let line = match sum_mods(mods) {
        (MoveDir1D::Next, off) => line.saturating_add(off),
        (MoveDir1D::Previous, off) => line.saturating_sub(off),
    };

    Ok(line.min(last))
}

/// Interpret the range of a command as a pair of line indices.
///
/// Without a range, commands act on the cursor line, or on the whole buffer when `default_all`
/// is true.
fn line_range(
    desc: &CommandDescription,
    ctx: &CommandContext,
    default_all: bool,
) -> Result<(usize, usize), CommandError> {
    let state = &ctx.state;
    let cur = state.cursor.y + 1;
    let last = state.buffer.get_lines();

    let (a, b) = match &desc.range {
        None if default_all => (1, last),
        None => (cur, cur),
        Some(RangeSpec::Single(RangeEnding(RangeEndingType::All, _))) => (1, last),
        Some(RangeSpec::Single(ending)) => {
            let a = resolve_address(ending, cur, state)?;
            (a, a)
        },
        Some(RangeSpec::Double(left, right, init)) => {
            let a = resolve_address(left, cur, state)?;
            let base = match init {
                RangeSearchInit::Cursor => cur,
                RangeSearchInit::Start => a,
            };
            let b = resolve_address(right, base, state)?;

            (a, b)
        },
    };

    let (a, b) = if a > b { (b, a) } else { (a, b) };

    Ok((a.max(1) - 1, b.max(1) - 1))
}

/// Apply the count that some commands take after their name, which starts a new range at the
/// end of the old one.
fn with_count(
    range: (usize, usize),
    count: Option<usize>,
    state: &VimState,
) -> Result<(usize, usize), CommandError> {
    match count {
        None => Ok(range),
        Some(0) => Err(CommandError::InvalidArgument),
        Some(n) => {
            let end = range.1.saturating_add(n - 1).min(state.buffer.max_line_idx());
            Ok((range.1, end))
        },
    }
}

fn check_lines(state: &VimState, added: usize) -> CommandResult {
    state.check_lines(added).map_err(|e| CommandError::Error(e.to_string()))
}

fn check_bytes(state: &VimState, added: usize) -> CommandResult {
    state.check_bytes(added).map_err(|e| CommandError::Error(e.to_string()))
}

fn too_many_bytes(state: &VimState) -> CommandError {
    CommandError::Error(EditError::TooManyBytes(state.config.max_bytes).to_string())
}

fn last_search(state: &VimState) -> Result<String, CommandError> {
    match &state.persist.last_search {
        Some((pattern, _)) => Ok(pattern.clone()),
        None => Err(CommandError::NoPreviousPattern),
    }
}

/// Read `:s` flags, filling in the previous substitution's flags when they start with `&`.
fn resolve_flags(text: &str, last: Option<&Substitution>) -> Result<SubFlags, CommandError> {
    let flags = parse_sub_flags(text)?;

    if !flags.keep {
        return Ok(flags);
    }

    let prev = last.map(|sub| sub.flags.as_str()).unwrap_or("");
    let rest = text.trim_start().trim_start_matches('&');

    parse_sub_flags(&format!("{prev}{rest}"))
}

fn substitute(
    desc: &CommandDescription,
    ctx: &mut CommandContext,
    pattern: String,
    replacement: String,
    flags: SubFlags,
) -> CommandResult {
    let pattern = if pattern.is_empty() {
        last_search(&ctx.state)?
    } else {
        pattern
    };

    let regex = compile(&pattern, &ctx.state.config, flags.case)?;
    let range = line_range(desc, ctx, false)?;
    let (start, end) = with_count(range, flags.count, &ctx.state)?;

    let dir = ctx.state.persist.last_search.as_ref().map_or(MoveDir1D::Next, |(_, dir)| *dir);
    ctx.state.persist.last_search = Some((pattern.clone(), dir));
    ctx.state.persist.last_substitute = Some(Substitution {
        pattern: pattern.clone(),
        replacement: replacement.clone(),
        flags: flags.to_flag_string(),
    });

    let limit = if flags.global { 0 } else { 1 };
    let mut room = ctx.state.byte_room();
    let mut y = start;
    let mut last = end;
    let mut changed = None;

    while y <= last {
        let line = ctx.state.buffer.line(y);

        if !regex.is_match(line) {
            y += 1;
            continue;
        }

        // Stop expanding once the line can no longer fit.
        let (mut added, mut matched) = (0usize, 0usize);
        let text = regex
            .replacen(line, limit, |caps: &Captures<'_>| {
                matched += caps.get(0).map_or(0, |m| m.len());
                added = added.saturating_add(replacement_len(&replacement, caps));

                if added > matched.saturating_add(room) {
                    return String::new();
                }

                expand_replacement(&replacement, caps)
            })
            .into_owned();

        if added > matched.saturating_add(room) || text.len() > line.len().saturating_add(room) {
            return Err(too_many_bytes(&ctx.state));
        }

        room = room.saturating_add(line.len()) - text.len();

        let lines: Vec<String> = text.split('\n').map(String::from).collect();
        let n = lines.len();

        check_lines(&ctx.state, n - 1)?;

        ctx.state.buffer.replace_lines(y, y, lines);
        ctx.changes.push(LineChange::Replace { start: y, old: 1, new: n });

        last += n - 1;
        y += n;
        changed = Some(y - 1);
    }

    match changed {
        Some(y) => ctx.state.goto_first_word(y),
        None if flags.no_error => {},
        None => return Err(CommandError::PatternNotFound(pattern)),
    }

    Ok(())
}

/// The command that runs when only a range is given, like `:5`.
///
/// Moves to the first non-blank character of the last line in the range.
fn vim_cmd_goto(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let (_, end) = line_range(&desc, ctx, false)?;

    ctx.state.goto_first_word(end);

    Ok(())
}

/// The `:substitute` command.
///
/// *Aliases:* `s`
///
/// Without a pattern, repeats the previous substitution with new flags.
fn vim_cmd_substitute(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let text = desc.arg.text.as_str();

    match text.chars().next() {
        Some(delim) if delim != '&' && is_delimiter(delim) => {
            let delimited = parse_delimited(text)?;
            let rest = match delimited.rest {
                Some(rest) => rest,
                None => return Err(CommandError::MissingDelimiter(delimited.pattern)),
            };
            let (replacement, flags) = split_delimited(&rest, delim);
            let flags = resolve_flags(flags.unwrap_or(""), ctx.state.persist.last_substitute.as_ref())?;

            substitute(&desc, ctx, delimited.pattern, replacement, flags)
        },
        _ => {
            let last = ctx.state.persist.last_substitute.clone();
            let last = last.ok_or(CommandError::NoPreviousPattern)?;
            let flags = resolve_flags(text, Some(&last))?;

            substitute(&desc, ctx, last.pattern, last.replacement, flags)
        },
    }
}

/// The `:&` command.
///
/// *Aliases:* `&&`, `~`
///
/// Repeat the previous substitution. `:&&` keeps its flags, and `:~` uses the most recent
/// search pattern instead of its pattern.
fn vim_cmd_substitute_repeat(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let last = ctx.state.persist.last_substitute.clone();
    let last = last.ok_or(CommandError::NoPreviousPattern)?;

    let text = if desc.command == "&&" {
        format!("&{}", desc.arg.text)
    } else {
        desc.arg.text.clone()
    };
    let flags = resolve_flags(&text, Some(&last))?;

    let pattern = if desc.command == "~" {
        last_search(&ctx.state)?
    } else {
        last.pattern
    };

    substitute(&desc, ctx, pattern, last.replacement, flags)
}

/// The `:global` command.
///
/// *Aliases:* `g`, `vglobal`, `v`
///
/// Mark every line in the range that matches a pattern (or, for `:g!` and `:v`, that doesn't),
/// and then run a command on each marked line that still exists.
fn vim_cmd_global(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    if ctx.global {
        return Err(CommandError::Recursive);
    }

    let invert = desc.bang || desc.command.starts_with('v');
    let delimited = parse_delimited(&desc.arg.text)?;
    let command = delimited.rest.unwrap_or_default();
    let command = if command.trim().is_empty() {
        String::from("p")
    } else {
        command
    };

    let pattern = if delimited.pattern.is_empty() {
        last_search(&ctx.state)?
    } else {
        delimited.pattern
    };
    let regex = compile(&pattern, &ctx.state.config, None)?;
    let (start, end) = line_range(&desc, ctx, true)?;

    let mut marks: Vec<Option<usize>> = (start..=end)
        .filter(|y| regex.is_match(ctx.state.buffer.line(*y)) != invert)
        .map(Some)
        .collect();

    if marks.is_empty() {
        return Err(CommandError::PatternNotFound(pattern));
    }

    let dir = ctx.state.persist.last_search.as_ref().map_or(MoveDir1D::Next, |(_, dir)| *dir);
    ctx.state.persist.last_search = Some((pattern, dir));

    if is_plain_delete(&command) {
        let ys: Vec<usize> = marks.into_iter().flatten().collect();
        let last = ys[ys.len() - 1] - (ys.len() - 1);

        ctx.state.buffer.delete_each_line(&ys);
        ctx.state.goto_first_word(last);

        return Ok(());
    }

    let cmds = VimCommandMachine::default();
    let mut shift = 0;
    let mut ordered = true;
    ctx.global = true;

    for i in 0..marks.len() {
        let Some(m) = marks[i] else {
            continue;
        };
        let y = m.saturating_add_signed(shift);

        ctx.state.cursor = Cursor::new(y, 0);
        ctx.changes.clear();

        let res = cmds.input_cmd(&command, ctx);

        for change in std::mem::take(&mut ctx.changes) {
            renumber(&mut marks[i + 1..], &mut shift, &mut ordered, change);
        }

        match res {
            Ok(()) => {},
            Err(CommandError::Recursive) => {
                ctx.global = false;
                return Err(CommandError::Recursive);
            },
            Err(err) => {
                debug!(line = y, %err, "command failed under :global");
            },
        }
    }

    ctx.global = false;

    Ok(())
}

/// Whether a `:global` command is a bare `:delete`, which can remove every marked line at once.
fn is_plain_delete(command: &str) -> bool {
    let command = command.trim();

    !command.is_empty() && "delete".starts_with(command)
}

/// Apply a line change to the marks that `:global` hasn't visited yet.
///
/// A mark's current line is its stored index plus `shift`. While the marks are still in
/// ascending order, a change that starts at or above all of them only moves `shift`.
fn renumber(
    marks: &mut [Option<usize>],
    shift: &mut isize,
    ordered: &mut bool,
    change: LineChange,
) {
    let at = |m: usize, shift: isize| m.saturating_add_signed(shift);

    if let LineChange::Replace { start, old, new } = change {
        let first = marks.iter().flatten().next().map(|m| at(*m, *shift));

        if *ordered && !matches!(first, Some(p) if p < start) {
            if old != new {
                for mark in marks.iter_mut() {
                    match *mark {
                        Some(m) if at(m, *shift) < start + old => *mark = None,
                        Some(_) => break,
                        None => continue,
                    }
                }
            }

            *shift += new as isize - old as isize;
            return;
        }
    }

    for mark in marks.iter_mut() {
        *mark = mark.and_then(|m| change.remap(at(m, *shift)));
    }

    *shift = 0;
    *ordered = *ordered && matches!(change, LineChange::Replace { .. });
}

/// The first decimal number in a line, including a leading `-`.
fn sort_number(line: &str) -> Option<i64> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits = &line[start..];
    let len = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    let n = digits[..len].parse::<i64>().unwrap_or(i64::MAX);

    if line[..start].ends_with('-') {
        Some(-n)
    } else {
        Some(n)
    }
}

/// The `:sort` command.
///
/// *Aliases:* `sor`
///
/// Sort lines, by default across the whole buffer. The flags `i` (ignore case), `n` (sort on
/// the first number) and `u` (drop duplicates) may be combined, and `:sort!` reverses.
fn vim_cmd_sort(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let mut icase = false;
    let mut numeric = false;
    let mut unique = false;

    for c in desc.arg.text.chars() {
        match c {
            'i' => icase = true,
            'n' => numeric = true,
            'u' => unique = true,
            c if c.is_whitespace() => {},
            _ => return Err(CommandError::InvalidArgument),
        }
    }

    let (start, end) = line_range(&desc, ctx, true)?;
    let mut lines = ctx.state.buffer.get_line_range(start, end);
    let old = lines.len();

    let cmp = |a: &String, b: &String| -> Ordering {
        if numeric {
            sort_number(a).cmp(&sort_number(b))
        } else if icase {
            a.to_lowercase().cmp(&b.to_lowercase())
        } else {
            a.cmp(b)
        }
    };

    if desc.bang {
        lines.sort_by(|a, b| cmp(b, a));
    } else {
        lines.sort_by(|a, b| cmp(a, b));
    }

    if unique {
        lines.dedup_by(|a, b| cmp(a, b) == Ordering::Equal);
    }

    let new = lines.len();
    ctx.state.buffer.replace_lines(start, end, lines);
    ctx.changes.push(LineChange::Replace { start, old, new });
    ctx.state.goto_first_word(start);

    Ok(())
}

/// The `:delete` command.
///
/// *Aliases:* `d`
///
/// A register name may be given, but the deleted lines are never stored.
fn vim_cmd_delete(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let (_, count) = desc.arg.register_count()?;
    let range = line_range(&desc, ctx, false)?;
    let (start, end) = with_count(range, count, &ctx.state)?;

    let old = ctx.state.buffer.delete_lines(start, end).len();
    ctx.changes.push(LineChange::Replace { start, old, new: 0 });
    ctx.state.goto_first_word(start);

    Ok(())
}

/// The `:join` command.
///
/// *Aliases:* `j`
///
/// `:join!` keeps leading whitespace and doesn't insert spaces.
fn vim_cmd_join(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let count = desc.arg.count()?;
    let (start, end) = line_range(&desc, ctx, false)?;

    let (y, n) = match count {
        Some(0) => return Err(CommandError::InvalidArgument),
        Some(n) => (end, n),
        None if start == end => (start, 2),
        None => (start, end - start + 1),
    };

    let before = ctx.state.buffer.get_lines();

    if ctx.state.buffer.join_lines(y, n, !desc.bang).is_some() {
        let removed = before - ctx.state.buffer.get_lines();

        ctx.changes.push(LineChange::Replace { start: y, old: removed + 1, new: 1 });
        ctx.state.goto_first_word(y);
    }

    Ok(())
}

/// The `:move` command.
///
/// *Aliases:* `m`
///
/// Move lines below the given address, where `0` is above the first line.
fn vim_cmd_move(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let (start, end) = line_range(&desc, ctx, false)?;
    let dest = resolve_address(&desc.arg.address()?, ctx.state.cursor.y + 1, &ctx.state)?;

    if dest > start && dest <= end {
        return Err(CommandError::InvalidRange);
    }

    let n = end - start + 1;

    if dest == start || dest == end + 1 {
        ctx.state.goto_first_word(end);
        return Ok(());
    }

    let dest = if dest > end { dest - n } else { dest };
    let lines = ctx.state.buffer.delete_lines(start, end);

    ctx.state.buffer.insert_lines(dest, lines);
    ctx.changes.push(LineChange::Move { start, end, dest });
    ctx.state.goto_first_word(dest + n - 1);

    Ok(())
}

/// The `:copy` command.
///
/// *Aliases:* `co`, `t`
///
/// Copy lines below the given address, where `0` is above the first line.
fn vim_cmd_copy(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let (start, end) = line_range(&desc, ctx, false)?;
    let dest = resolve_address(&desc.arg.address()?, ctx.state.cursor.y + 1, &ctx.state)?;

    let lines = ctx.state.buffer.get_line_range(start, end);
    let n = lines.len();

    check_lines(&ctx.state, n)?;
    check_bytes(&ctx.state, lines.iter().map(|line| line.len() + 1).sum())?;

    ctx.state.buffer.insert_lines(dest, lines);
    ctx.changes.push(LineChange::Replace { start: dest, old: 0, new: n });
    ctx.state.goto_first_word(dest + n - 1);

    Ok(())
}

fn shift(desc: CommandDescription, ctx: &mut CommandContext, dir: MoveDir1D) -> CommandResult {
    let levels = desc.command.len();
    let count = desc.arg.count()?;
    let range = line_range(&desc, ctx, false)?;
    let (start, end) = with_count(range, count, &ctx.state)?;

    ops::shift_lines(&mut ctx.state, start, end, levels, dir)
        .map_err(|e| CommandError::Error(e.to_string()))?;
    ctx.state.goto_first_word(end);

    Ok(())
}

/// The `:>` command.
///
/// *Aliases:* `>>`, `>>>`, ...
///
/// Each extra `>` indents by another level.
fn vim_cmd_shift_right(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    shift(desc, ctx, MoveDir1D::Next)
}

/// The `:<` command.
///
/// *Aliases:* `<<`, `<<<`, ...
fn vim_cmd_shift_left(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    shift(desc, ctx, MoveDir1D::Previous)
}

fn set_option(config: &mut InterpreterConfig, item: &str) -> CommandResult {
    if let Some((name, value)) = item.split_once('=') {
        let n = value.parse::<usize>().map_err(|_| CommandError::InvalidArgument)?;

        match name {
            "shiftwidth" | "sw" => config.shiftwidth = n,
            "tabstop" | "ts" if n > 0 => config.tabstop = n,
            _ => return Err(CommandError::InvalidArgument),
        }

        return Ok(());
    }

    let (name, value) = if let Some(name) = item.strip_suffix('?') {
        (name, Some(None))
    } else if let Some(name) = item.strip_suffix('!') {
        (name, None)
    } else if let Some(name) = item.strip_prefix("inv") {
        (name, None)
    } else if let Some(name) = item.strip_prefix("no") {
        (name, Some(Some(false)))
    } else {
        (item, Some(Some(true)))
    };

    let flag = match name {
        "ignorecase" | "ic" => &mut config.ignorecase,
        "smartcase" | "scs" => &mut config.smartcase,
        "wrapscan" | "ws" => &mut config.wrapscan,
        "expandtab" | "et" => &mut config.expandtab,
        "shiftwidth" | "sw" | "tabstop" | "ts" if value == Some(None) => {
            return Ok(());
        },
        _ => return Err(CommandError::InvalidArgument),
    };

    match value {
        Some(Some(v)) => *flag = v,
        Some(None) => {},
        None => *flag = !*flag,
    }

    Ok(())
}

/// The `:set` command.
///
/// *Aliases:* `se`
///
/// Change options, using the forms `name`, `noname`, `invname`, `name!` and `name=value`.
fn vim_cmd_set(desc: CommandDescription, ctx: &mut CommandContext) -> CommandResult {
    let mut config = ctx.state.config;

    for item in desc.arg.text.split_whitespace() {
        set_option(&mut config, item)?;
    }

    ctx.state.config = config;

    Ok(())
}

/// Commands that are accepted and do nothing, like `:write` and `:quit`.
fn vim_cmd_ignore(_: CommandDescription, _: &mut CommandContext) -> CommandResult {
    Ok(())
}

fn default_cmds() -> Vec<VimCommand> {
    vec![
        VimCommand {
            name: "".into(),
            aliases: strs![],
            f: vim_cmd_goto,
        },
        VimCommand {
            name: "&".into(),
            aliases: strs!["&&", "~"],
            f: vim_cmd_substitute_repeat,
        },
        VimCommand {
            name: "substitute".into(),
            aliases: strs!["s"],
            f: vim_cmd_substitute,
        },
        VimCommand {
            name: "global".into(),
            aliases: strs!["g"],
            f: vim_cmd_global,
        },
        VimCommand {
            name: "vglobal".into(),
            aliases: strs!["v"],
            f: vim_cmd_global,
        },
        VimCommand {
            name: "sort".into(),
            aliases: strs!["sor"],
            f: vim_cmd_sort,
        },
        VimCommand {
            name: "delete".into(),
            aliases: strs!["d"],
            f: vim_cmd_delete,
        },
        VimCommand {
            name: "join".into(),
            aliases: strs!["j"],
            f: vim_cmd_join,
        },
        VimCommand {
            name: "move".into(),
            aliases: strs!["m"],
            f: vim_cmd_move,
        },
        VimCommand {
            name: "copy".into(),
            aliases: strs!["co", "t"],
            f: vim_cmd_copy,
        },
        VimCommand {
            name: ">".into(),
            aliases: strs![">>", ">>>", ">>>>", ">>>>>", ">>>>>>", ">>>>>>>", ">>>>>>>>"],
            f: vim_cmd_shift_right,
        },
        VimCommand {
            name: "<".into(),
            aliases: strs!["<<", "<<<", "<<<<", "<<<<<", "<<<<<<", "<<<<<<<", "<<<<<<<<"],
            f: vim_cmd_shift_left,
        },
        VimCommand {
            name: "set".into(),
            aliases: strs!["se"],
            f: vim_cmd_set,
        },
        VimCommand {
            name: "write".into(),
            aliases: strs!["w"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "update".into(),
            aliases: strs!["up"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "quit".into(),
            aliases: strs!["q"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "wq".into(),
            aliases: strs![],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "xit".into(),
            aliases: strs!["x"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "wall".into(),
            aliases: strs!["wa"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "qall".into(),
            aliases: strs!["qa", "quitall"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "wqall".into(),
            aliases: strs!["wqa", "xa", "xall"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "nohlsearch".into(),
            aliases: strs!["noh"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "print".into(),
            aliases: strs!["p"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "undo".into(),
            aliases: strs!["u"],
            f: vim_cmd_ignore,
        },
        VimCommand {
            name: "redo".into(),
            aliases: strs!["red"],
            f: vim_cmd_ignore,
        },
    ]
}

/// A [CommandMachine] that knows the commands listed in this module.
pub type VimCommandMachine = CommandMachine<VimCommand>;

impl Default for VimCommandMachine {
    fn default() -> Self {
        let mut m = Self::new();

        for cmd in default_cmds().into_iter() {
            m.add_command(cmd);
        }

        return m;
    }
}

/// Run the text typed after `:`.
///
/// The state is only updated when the command succeeds.
pub(crate) fn execute(state: &mut VimState, input: &str) -> CommandResult {
    let cmds = VimCommandMachine::default();
    let mut ctx = CommandContext::from(state.clone());

    debug!(input, "running command");

    cmds.input_cmd(input, &mut ctx)?;
    *state = ctx.state;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(text: &str, cmd: &str) -> VimState {
        let mut state = VimState::new(text);
        execute(&mut state, cmd).unwrap();
        state
    }

    fn exec_err(text: &str, cmd: &str) -> CommandError {
        let mut state = VimState::new(text);
        let err = execute(&mut state, cmd).unwrap_err();
        assert_eq!(state.text(), text);
        err
    }

    fn run(state: &mut VimState, cmd: &str) {
        execute(state, cmd).unwrap();
    }

    #[test]
    fn test_lookup() {
        let cmds = VimCommandMachine::default();

        assert_eq!(cmds.get("s").map(|c| c.name.as_str()), Ok("substitute"));
        assert_eq!(cmds.get("sor").map(|c| c.name.as_str()), Ok("sort"));
        assert_eq!(cmds.get("so").map(|c| c.name.as_str()), Ok("sort"));
        assert_eq!(cmds.get("t").map(|c| c.name.as_str()), Ok("copy"));
        assert_eq!(cmds.get(">>>").map(|c| c.name.as_str()), Ok(">"));
        assert_eq!(cmds.get("v").map(|c| c.name.as_str()), Ok("vglobal"));

        let err = exec_err("abc", "frobnicate");
        assert_eq!(err, CommandError::InvalidCommand("frobnicate".into()));
    }

    #[test]
    fn test_goto() {
        let state = exec("a\n  b\nc", "2");
        assert_eq!((state.cursor_line(), state.cursor_col()), (1, 2));

        let state = exec("a\nb\nc", "$");
        assert_eq!(state.cursor_line(), 2);

        let state = exec("a\nb\nc", "99");
        assert_eq!(state.cursor_line(), 2);

        let state = exec("a\nb\nc", ".+1");
        assert_eq!(state.cursor_line(), 1);

        let state = exec("a\nb\nc", "::");
        assert_eq!(state.cursor_line(), 0);
    }

    #[test]
    fn test_ranges() {
        let mut state = VimState::new("a\nb\nc\nd");
        state.cursor = Cursor::new(2, 0);
        run(&mut state, "1;+1d");
        assert_eq!(state.text(), "c\nd");

        let mut state = VimState::new("a\nb\nc\nd");
        state.cursor = Cursor::new(2, 0);
        run(&mut state, "1,+1d");
        assert_eq!(state.text(), "");

        let state = exec("a\nb\nc", "3,2d");
        assert_eq!(state.text(), "a");

        let state = exec("a\nb\nc", ".-5d");
        assert_eq!(state.text(), "b\nc");

        let err = exec_err("a\nb\nc", "'<,'>d");
        assert_eq!(err, CommandError::InvalidRange);

        let mut state = VimState::new("a\nb\nc");
        state.persist.last_visual = Some((0, 1));
        run(&mut state, "'<,'>d");
        assert_eq!(state.text(), "c");
    }

    #[test]
    fn test_substitute() {
        assert_eq!(exec("foo", "%s/^/bar/").text(), "barfoo");
        assert_eq!(exec("foo", "s/o/0/").text(), "f0o");
        assert_eq!(exec("foo", "s/o/0/g").text(), "f00");
        assert_eq!(exec("a\na", "%s/a/b/").text(), "b\nb");
        assert_eq!(exec("a/b", "s#/#-#").text(), "a-b");
        assert_eq!(exec("a/b", "s/\\//-/").text(), "a-b");
        assert_eq!(exec("abc", "s/\\(a\\)\\(b\\)/\\2\\1/").text(), "bac");
        assert_eq!(exec("abc", "s/b/[&]").text(), "a[b]c");
        assert_eq!(exec("ABC", "s/b/x/i").text(), "AxC");

        let state = exec("abc\nd", "s/b/\\r/");
        assert_eq!(state.lines(), &strs!["a", "c", "d"]);
        assert_eq!(state.cursor_line(), 1);

        let state = exec("a\n  a\nb", "%s/a/x/");
        assert_eq!((state.cursor_line(), state.cursor_col()), (1, 2));
    }

    #[test]
    fn test_substitute_errors() {
        let err = exec_err("abc", "s/x/y/");
        assert_eq!(err, CommandError::PatternNotFound("x".into()));

        let state = exec("abc", "s/x/y/e");
        assert_eq!(state.text(), "abc");

        let err = exec_err("abc", "s/abc");
        assert_eq!(err, CommandError::MissingDelimiter("abc".into()));

        let err = exec_err("abc", "s");
        assert_eq!(err, CommandError::NoPreviousPattern);

        let err = exec_err("abc", "s//x/");
        assert_eq!(err, CommandError::NoPreviousPattern);

        let err = exec_err("abc", "s/a/b/z");
        assert!(matches!(err, CommandError::ParseFailed(_)));
    }

    #[test]
    fn test_substitute_line_limit() {
        let mut config = InterpreterConfig::default();
        config.max_lines(2);

        let mut state = VimState::with_config("abc", config);
        let err = execute(&mut state, "s/b/\\r\\r/").unwrap_err();

        assert_eq!(err, CommandError::Error("Buffer would exceed the 2 line limit".into()));
        assert_eq!(state.text(), "abc");
    }

    #[test]
    fn test_size_limit() {
        let mut config = InterpreterConfig::default();
        config.max_bytes(12);

        let limit = CommandError::Error("Buffer would exceed the 12 byte limit".into());
        let mut state = VimState::with_config("aaa\nb", config);

        execute(&mut state, "s/a/&&/g").unwrap();
        assert_eq!(state.text(), "aaaaaa\nb");

        assert_eq!(execute(&mut state.clone(), "s/a/&&/g"), Err(limit.clone()));
        assert_eq!(execute(&mut state.clone(), "s/.*/&&&&&&&&&&&&&&&&&&&&/"), Err(limit.clone()));
        assert_eq!(execute(&mut state.clone(), "1t."), Err(limit.clone()));

        execute(&mut state, "2t.").unwrap();
        assert_eq!(state.text(), "aaaaaa\nb\nb");

        assert_eq!(execute(&mut state.clone(), "%>"), Err(limit.clone()));

        execute(&mut state, "1s/aaaa//").unwrap();
        execute(&mut state, "%>").unwrap();
        assert_eq!(state.lines(), &strs!["\taa", "\tb", "\tb"]);
    }

    #[test]
    fn test_substitute_repeat() {
        let mut state = VimState::new("a a\na a\na a");
        run(&mut state, "s/a/b/g");
        assert_eq!(state.lines(), &strs!["b b", "a a", "a a"]);

        run(&mut state, "2");
        run(&mut state, "&");
        assert_eq!(state.lines(), &strs!["b b", "b a", "a a"]);

        // A bare :& drops the flags, so :&& has no g to keep.
        run(&mut state, "3&&");
        assert_eq!(state.lines(), &strs!["b b", "b a", "b a"]);

        run(&mut state, "3s/a/b/g");
        run(&mut state, "2&&");
        assert_eq!(state.lines(), &strs!["b b", "b b", "b b"]);

        let mut state = VimState::new("a c c");
        run(&mut state, "s/a/x/");
        state.persist.last_search = Some(("c".into(), MoveDir1D::Next));
        run(&mut state, "~");
        assert_eq!(state.text(), "x x c");

        let err = exec_err("abc", "&");
        assert_eq!(err, CommandError::NoPreviousPattern);
    }

    #[test]
    fn test_substitute_last_search() {
        let mut state = VimState::new("abc");
        state.persist.last_search = Some(("b".into(), MoveDir1D::Previous));
        run(&mut state, "s//x/");
        assert_eq!(state.text(), "axc");
        assert_eq!(state.persist.last_search, Some(("b".into(), MoveDir1D::Previous)));

        let mut state = VimState::new("abc");
        run(&mut state, "s/c/d/");
        assert_eq!(state.persist.last_search, Some(("c".into(), MoveDir1D::Next)));
    }

    #[test]
    fn test_global() {
        assert_eq!(exec("a\nb\nab\nc", "g/b/d").text(), "a\nc");
        assert_eq!(exec("a\nb\nab\nc", "v/b/d").text(), "b\nab");
        assert_eq!(exec("a\nb\nab\nc", "g!/b/d").text(), "b\nab");
        assert_eq!(exec("a\nb\nab\nc", "g/b/s/b/x/").text(), "a\nx\nax\nc");
        assert_eq!(exec("a\nb", "g/./d").text(), "");
        assert_eq!(exec("a\nb", "g/a/").text(), "a\nb");
        assert_eq!(exec("a\nb\nc", "2,3g/./d").text(), "a");
        assert_eq!(exec("a\nb", "g/a/t.").text(), "a\na\nb");
    }

    #[test]
    fn test_global_delete_cursor() {
        let state = exec("a\nb\nab\nc\nd", "g/b/d");
        assert_eq!(state.text(), "a\nc\nd");
        assert_eq!(state.cursor_line(), 1);

        let state = exec("x\nb\n  c", "g/b/de");
        assert_eq!(state.text(), "x\n  c");
        assert_eq!((state.cursor_line(), state.cursor_col()), (1, 2));

        let state = exec("a\nb\nb", "g/b/d");
        assert_eq!(state.cursor_line(), 0);
    }

    #[test]
    fn test_global_large_buffer() {
        let numbers = |n: usize| (0..n).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");

        let state = exec(&numbers(50_000), "g/^/d");
        assert_eq!(state.text(), "");

        let text = numbers(20_000);
        let state = exec(&text, "g/0$/s/$/!/");
        assert_eq!(state.lines()[10], "10!");
        assert_eq!(state.lines()[19_990], "19990!");
        assert_eq!(state.lines()[19_999], "19999");

        let state = exec(&text, "g/5$/.,+1d");
        assert_eq!(state.lines().len(), 16_000);
        assert_eq!(state.lines()[5], "7");
        assert_eq!(state.lines()[15_999], "19999");
    }

    #[test]
    fn test_renumber() {
        let mut marks = vec![Some(2), Some(4), Some(6)];
        let mut shift = 0;
        let mut ordered = true;

        renumber(&mut marks, &mut shift, &mut ordered, LineChange::Replace {
            start: 1,
            old: 2,
            new: 0,
        });
        assert_eq!(marks, vec![None, Some(4), Some(6)]);
        assert_eq!(shift, -2);

        renumber(&mut marks, &mut shift, &mut ordered, LineChange::Replace {
            start: 3,
            old: 0,
            new: 1,
        });
        assert_eq!(marks, vec![None, Some(2), Some(5)]);
        assert_eq!(shift, 0);

        renumber(&mut marks, &mut shift, &mut ordered, LineChange::Move {
            start: 4,
            end: 4,
            dest: 0,
        });
        assert_eq!(marks, vec![None, Some(3), Some(5)]);
        assert!(!ordered);
    }

    #[test]
    fn test_global_moves() {
        assert_eq!(exec("1\n2\n3", "g/^/m0").text(), "3\n2\n1");
        assert_eq!(exec("a1\nb\na2", "g/a/m0").text(), "a2\na1\nb");
        assert_eq!(exec("a\nb\na\nb", "g/a/j").text(), "a b\na b");
    }

    #[test]
    fn test_global_errors() {
        let err = exec_err("a\nb", "g/x/d");
        assert_eq!(err, CommandError::PatternNotFound("x".into()));

        let err = exec_err("a\nb", "g/a/g/b/d");
        assert_eq!(err, CommandError::Recursive);

        let err = exec_err("a\nb", "g");
        assert_eq!(err, CommandError::InvalidArgument);

        // Failures on individual lines don't stop the rest.
        let state = exec("ab\nb\nab", "g/b/s/a/x/");
        assert_eq!(state.text(), "xb\nb\nxb");
    }

    #[test]
    fn test_sort() {
        assert_eq!(exec("banana\napple\ncherry", "sort").text(), "apple\nbanana\ncherry");
        assert_eq!(exec("banana\napple\ncherry", "sor!").text(), "cherry\nbanana\napple");
        assert_eq!(exec("x10\nx9\ny\nx-3", "sort n").text(), "y\nx-3\nx9\nx10");
        assert_eq!(exec("b\na\nb", "sort u").text(), "a\nb");
        assert_eq!(exec("b\nA\na", "sort i").text(), "A\na\nb");
        assert_eq!(exec("B\na\nb", "sort").text(), "B\na\nb");
        assert_eq!(exec("c\nb\na", "2,3sort").text(), "c\na\nb");

        let err = exec_err("b\na", "sort x");
        assert_eq!(err, CommandError::InvalidArgument);
    }

    #[test]
    fn test_delete() {
        let state = exec("a\nb\nc", "d");
        assert_eq!(state.text(), "b\nc");
        assert_eq!(state.registers().get(&crate::prelude::Register::Unnamed).value, "");

        assert_eq!(exec("a\nb\nc", "%d").text(), "");
        assert_eq!(exec("a\nb\nc", "2,3d").text(), "a");
        assert_eq!(exec("a\nb\nc", "d 2").text(), "c");
        assert_eq!(exec("a\nb\nc", "$d").text(), "a\nb");

        let state = exec("a\nb\n  c", "2d");
        assert_eq!((state.cursor_line(), state.cursor_col()), (1, 2));

        let err = exec_err("a\nb", "d 0");
        assert_eq!(err, CommandError::InvalidArgument);
    }

    #[test]
    fn test_join() {
        assert_eq!(exec("a\nb\nc", "j").text(), "a b\nc");
        assert_eq!(exec("a\nb\nc", "%j").text(), "a b c");
        assert_eq!(exec("a\n  b\nc", "j!").text(), "a  b\nc");
        assert_eq!(exec("a\nb\nc", "j 3").text(), "a b c");
        assert_eq!(exec("a\nb\nc", "3j").text(), "a\nb\nc");
    }

    #[test]
    fn test_move_copy() {
        assert_eq!(exec("a\nb\nc", "m$").text(), "b\nc\na");
        assert_eq!(exec("a\nb\nc", "2m0").text(), "b\na\nc");
        assert_eq!(exec("a\nb\nc", "1,2m$").text(), "c\na\nb");
        assert_eq!(exec("a\nb\nc", "m1").text(), "a\nb\nc");
        assert_eq!(exec("a\nb\nc", "t.").text(), "a\na\nb\nc");
        assert_eq!(exec("a\nb\nc", "1,2t$").text(), "a\nb\nc\na\nb");
        assert_eq!(exec("a\nb\nc", "3co0").text(), "c\na\nb\nc");

        let state = exec("a\nb\nc", "m$");
        assert_eq!(state.cursor_line(), 2);

        let err = exec_err("a\nb\nc", "1,3m2");
        assert_eq!(err, CommandError::InvalidRange);

        let err = exec_err("a\nb\nc", "m");
        assert!(matches!(err, CommandError::ParseFailed(_)));
    }

    #[test]
    fn test_shift() {
        assert_eq!(exec("a", ">").text(), "\ta");
        assert_eq!(exec("a", ">>").text(), "\t\ta");
        assert_eq!(exec("\t\ta\n\tb", "%<").text(), "\ta\nb");
        assert_eq!(exec("a\nb\nc", "> 2").text(), "\ta\n\tb\nc");

        let mut state = VimState::new("a");
        run(&mut state, "set et sw=2");
        run(&mut state, ">>>");
        assert_eq!(state.text(), "      a");
    }

    #[test]
    fn test_set() {
        let mut state = VimState::new("");

        run(&mut state, "set ic");
        assert!(state.config().ignorecase);

        run(&mut state, "set noic scs");
        assert!(!state.config().ignorecase);
        assert!(state.config().smartcase);

        run(&mut state, "se ic! invscs");
        assert!(state.config().ignorecase);
        assert!(!state.config().smartcase);

        run(&mut state, "set sw=2 ts=4 et nows");
        assert_eq!(state.config().shiftwidth, 2);
        assert_eq!(state.config().tabstop, 4);
        assert!(state.config().expandtab);
        assert!(!state.config().wrapscan);

        run(&mut state, "set ts? ic?");
        assert_eq!(state.config().tabstop, 4);

        assert_eq!(exec_err("", "set bogus"), CommandError::InvalidArgument);
        assert_eq!(exec_err("", "set ts=0"), CommandError::InvalidArgument);
        assert_eq!(exec_err("", "set ic=1"), CommandError::InvalidArgument);

        // Earlier options aren't kept when a later one fails.
        let mut state = VimState::new("");
        assert!(execute(&mut state, "set ic bogus").is_err());
        assert!(!state.config().ignorecase);
    }

    #[test]
    fn test_ignored() {
        for cmd in ["w", "wq", "q!", "x", "wa", "qa!", "noh", "p", "u", "red", "up", "xa"] {
            let state = exec("a\nb", cmd);
            assert_eq!(state.text(), "a\nb", "{cmd}");
        }
    }

    #[test]
    fn test_remap() {
        let change = LineChange::Replace { start: 2, old: 1, new: 0 };
        assert_eq!(change.remap(1), Some(1));
        assert_eq!(change.remap(2), None);
        assert_eq!(change.remap(3), Some(2));

        let change = LineChange::Replace { start: 2, old: 1, new: 3 };
        assert_eq!(change.remap(2), None);
        assert_eq!(change.remap(3), Some(5));

        let change = LineChange::Move { start: 3, end: 4, dest: 0 };
        assert_eq!(change.remap(0), Some(2));
        assert_eq!(change.remap(3), Some(0));
        assert_eq!(change.remap(4), Some(1));
        assert_eq!(change.remap(5), Some(5));
    }
}
