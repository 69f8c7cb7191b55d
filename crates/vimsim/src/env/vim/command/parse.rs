//! # Ex command grammar
//!
//! ## Overview
//!
//! Parsing for the text typed after `:`. A command is an optional range, a name, an optional
//! `!`, and an argument string that the command itself interprets.
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, space0},
    combinator::{eof, map_res, opt, value},
    error::{ErrorKind, ParseError},
    multi::many0,
    IResult,
};

use crate::commands::{CommandError, ParsedCommand};
use crate::prelude::MoveDir1D;

fn parse_failed(err: nom::Err<nom::error::Error<&str>>) -> CommandError {
    CommandError::ParseFailed(err.to_string())
}

/// Methods for determining one end of a [RangeSpec].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeEndingType {
    /// A line number, counting from 1.
    Absolute(usize),

    /// The whole buffer (`%`).
    All,

    /// The line the cursor is on (`.`).
    Current,

    /// The last line (`$`).
    Last,

    /// The first line of the last Visual selection (`'<`).
    VisualBegin,

    /// The last line of the last Visual selection (`'>`).
    VisualEnd,

    /// No address was given, only offsets or a separator.
    Unspecified,
}

/// Modifications to a [RangeEndingType].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeEndingModifier {
    /// Offset the end of a range by *n* lines.
    Offset(MoveDir1D, usize),
}

/// One end of a [RangeSpec].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeEnding(pub RangeEndingType, pub Vec<RangeEndingModifier>);

/// Where the second address of a range is counted from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeSearchInit {
    /// Relative to the cursor (`,`).
    Cursor,

    /// Relative to the first address (`;`).
    Start,
}

/// The lines a command acts on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeSpec {
    /// A range specification where only one end of the range was given.
    Single(RangeEnding),

    /// A range specification where both ends of the range were given.
    Double(RangeEnding, RangeEnding, RangeSearchInit),
}

/// Argument text following a command name.
#[derive(Debug, Eq, PartialEq)]
pub struct CommandArgument {
    /// Original text of the command argument.
    pub untrimmed: String,

    /// Argument to the command with leading spaces stripped.
    pub text: String,
}

/// Result of parsing command text.
#[derive(Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct CommandDescription {
    /// An optionally specified range of lines before the command.
    pub range: Option<RangeSpec>,

    /// Name by which the command was invoked.
    pub command: String,

    /// Whether the command name was followed by a `!` (bang).
    pub bang: bool,

    /// Argument text to the command.
    pub arg: CommandArgument,
}

impl CommandArgument {
    /// Interpret the argument text as a single address, like the destination of `:move`.
    pub fn address(&self) -> Result<RangeEnding, CommandError> {
        let (input, ending) = parse_range_ending(self.text.trim_end()).map_err(parse_failed)?;
        let _ = eof(input).map_err(parse_failed)?;

        Ok(ending)
    }

    /// Interpret the argument text as an optional register name followed by an optional count,
    /// as `:delete` takes them.
    pub fn register_count(&self) -> Result<(Option<char>, Option<usize>), CommandError> {
        let (input, reg) = opt(parse_register)(self.text.as_str()).map_err(parse_failed)?;
        let (input, _) = space0(input).map_err(parse_failed)?;
        let (input, count) = opt(parse_number)(input).map_err(parse_failed)?;
        let (input, _) = space0(input).map_err(parse_failed)?;
        let _ = eof(input).map_err(parse_failed)?;

        Ok((reg, count))
    }

    /// Interpret the argument text as an optional count.
    pub fn count(&self) -> Result<Option<usize>, CommandError> {
        match self.register_count()? {
            (None, count) => Ok(count),
            (Some(_), _) => Err(CommandError::InvalidArgument),
        }
    }
}

/// The pieces of a `:substitute` or `:global` argument.
#[derive(Debug, Eq, PartialEq)]
pub struct Delimited {
    /// The pattern, with escaped delimiters unescaped.
    pub pattern: String,

    /// The text after the pattern's closing delimiter, or `None` if it wasn't closed.
    pub rest: Option<String>,
}

/// Whether `c` may separate the parts of a `:s` or `:g` command.
pub fn is_delimiter(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !"\\\"|".contains(c)
}

/// Split off text up to the first unescaped `delim`.
///
/// An escaped delimiter becomes the delimiter itself. Other escapes are kept, since they mean
/// something to the regular expression or the replacement.
pub fn split_delimited(text: &str, delim: char) -> (String, Option<&str>) {
    let mut out = String::new();
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        if c == delim {
            return (out, Some(&text[i + c.len_utf8()..]));
        }

        if c == '\\' {
            match chars.next() {
                Some((_, n)) if n == delim => out.push(n),
                Some((_, n)) => {
                    out.push('\\');
                    out.push(n);
                },
                None => out.push('\\'),
            }

            continue;
        }

        out.push(c);
    }

    (out, None)
}

/// Parse the `/pattern/rest` form used by `:s` and `:g`, where `/` can be any delimiter.
pub fn parse_delimited(text: &str) -> Result<Delimited, CommandError> {
    let mut chars = text.chars();

    let delim = match chars.next() {
        Some(c) if is_delimiter(c) => c,
        _ => return Err(CommandError::InvalidArgument),
    };

    let (pattern, rest) = split_delimited(chars.as_str(), delim);
    let rest = rest.map(str::to_string);

    Ok(Delimited { pattern, rest })
}

/// Flags and count following a `:substitute`.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct SubFlags {
    /// Keep the flags of the previous substitution (`&`).
    pub keep: bool,

    /// Replace every match on a line (`g`).
    pub global: bool,

    /// Force case sensitivity (`I`) or insensitivity (`i`).
    pub case: Option<bool>,

    /// Don't fail when nothing matches (`e`).
    pub no_error: bool,

    /// Substitute in this many lines, starting at the end of the range.
    pub count: Option<usize>,
}

impl SubFlags {
    /// The flags as Vim would print them, without the count.
    pub fn to_flag_string(&self) -> String {
        let mut s = String::new();

        if self.global {
            s.push('g');
        }

        match self.case {
            Some(true) => s.push('i'),
            Some(false) => s.push('I'),
            None => {},
        }

        if self.no_error {
            s.push('e');
        }

        s
    }
}

fn parse_flag_chars(input: &str) -> IResult<&str, &str> {
    take_while(|c| "&cegiInp#lr".contains(c))(input)
}

/// Parse the flags and optional count that end a `:s` command.
pub fn parse_sub_flags(text: &str) -> Result<SubFlags, CommandError> {
    let (input, _) = space0(text).map_err(parse_failed)?;
    let (input, chars) = parse_flag_chars(input).map_err(parse_failed)?;
    let (input, _) = space0(input).map_err(parse_failed)?;
    let (input, count) = opt(parse_number)(input).map_err(parse_failed)?;
    let (input, _) = space0(input).map_err(parse_failed)?;
    let _ = eof(input).map_err(parse_failed)?;

    let mut flags = SubFlags { keep: chars.starts_with('&'), count, ..SubFlags::default() };

    for c in chars.chars() {
        match c {
            'g' => flags.global = !flags.global,
            'i' => flags.case = Some(true),
            'I' => flags.case = Some(false),
            'e' => flags.no_error = true,
            '&' if flags.keep => {},
            '&' => return Err(CommandError::InvalidArgument),
            _ => {},
        }
    }

    Ok(flags)
}

fn parse_number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, usize::from_str)(input)
}

fn parse_register(input: &str) -> IResult<&str, char> {
    let (input, c) = nom::character::complete::satisfy(|c| {
        !c.is_ascii_digit() && !c.is_whitespace() && crate::prelude::Register::from_char(c).is_some()
    })(input)?;

    Ok((input, c))
}

fn parse_range_offset(input: &str) -> IResult<&str, MoveDir1D> {
    alt((value(MoveDir1D::Next, tag("+")), value(MoveDir1D::Previous, tag("-"))))(input)
}

fn parse_range_modifier(input: &str) -> IResult<&str, RangeEndingModifier> {
    let (input, sign) = parse_range_offset(input)?;
    let (input, n) = digit0(input)?;
    let n = if n.is_empty() {
        1
    } else {
        n.parse::<usize>().unwrap_or(usize::MAX)
    };

    Ok((input, RangeEndingModifier::Offset(sign, n)))
}

fn parse_range_number(input: &str) -> IResult<&str, RangeEndingType> {
    let (input, n) = digit1(input)?;
    let n = n.parse::<usize>().unwrap_or(usize::MAX);

    Ok((input, RangeEndingType::Absolute(n)))
}

fn parse_range_tick_mark(input: &str) -> IResult<&str, RangeEndingType> {
    let (input, _) = char('\'')(input)?;

    alt((
        value(RangeEndingType::VisualBegin, tag("<")),
        value(RangeEndingType::VisualEnd, tag(">")),
    ))(input)
}

fn parse_range_atom(input: &str) -> IResult<&str, RangeEndingType> {
    alt((
        parse_range_number,
        value(RangeEndingType::Current, tag(".")),
        value(RangeEndingType::All, tag("%")),
        value(RangeEndingType::Last, tag("$")),
        parse_range_tick_mark,
    ))(input)
}

fn parse_range_ending(original: &str) -> IResult<&str, RangeEnding> {
    let (input, ltype) = opt(parse_range_atom)(original)?;
    let (input, lmods) = many0(parse_range_modifier)(input)?;

    if ltype.is_none() && lmods.is_empty() {
        let err = ParseError::from_error_kind(original, ErrorKind::Alt);
        return Err(nom::Err::Error(err));
    }

    let ltype = ltype.unwrap_or(RangeEndingType::Unspecified);

    Ok((input, RangeEnding(ltype, lmods)))
}

fn parse_range_sep(input: &str) -> IResult<&str, RangeSearchInit> {
    alt((value(RangeSearchInit::Cursor, tag(",")), value(RangeSearchInit::Start, tag(";"))))(input)
}

fn parse_range(original: &str) -> IResult<&str, RangeSpec> {
    let (input, ltype) = opt(parse_range_atom)(original)?;
    let (input, lmods) = many0(parse_range_modifier)(input)?;
    let (input, sep) = opt(parse_range_sep)(input)?;

    match (ltype, sep) {
        (None, None) => {
            if lmods.is_empty() {
                let err = ParseError::from_error_kind(original, ErrorKind::Alt);
                let err = nom::Err::Error(err);
                Err(err)
            } else {
                let ltype = RangeEndingType::Unspecified;
                let left = RangeEnding(ltype, lmods);

                Ok((input, RangeSpec::Single(left)))
            }
        },
        (Some(ltype), None) => {
            let left = RangeEnding(ltype, lmods);

            Ok((input, RangeSpec::Single(left)))
        },
        (ltype, Some(sep)) => {
            let (input, rtype) = opt(parse_range_atom)(input)?;
            let (input, rmods) = many0(parse_range_modifier)(input)?;

            let ltype = ltype.unwrap_or(RangeEndingType::Unspecified);
            let left = RangeEnding(ltype, lmods);

            let rtype = rtype.unwrap_or(RangeEndingType::Unspecified);
            let right = RangeEnding(rtype, rmods);

            Ok((input, RangeSpec::Double(left, right, sep)))
        },
    }
}

fn parse_bang(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('!')(input)?;

    Ok((input, "!"))
}

fn parse_cmd_empty(input: &str) -> IResult<&str, &str> {
    let (input, _) = alt((eof, tag("\n")))(input)?;

    Ok((input, ""))
}

fn parse_cmd_string(input: &str) -> IResult<&str, &str> {
    alt((
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while1(|c| c == '<'),
        take_while1(|c| c == '>'),
        tag("&&"),
        tag("&"),
        tag("~"),
    ))(input)
}

fn parse_cmd_name(input: &str) -> IResult<&str, String> {
    let (input, name) = alt((parse_cmd_string, parse_cmd_empty))(input)?;

    Ok((input, name.to_string()))
}

fn parse_cmd_argument(input: &str) -> IResult<&str, CommandArgument> {
    let (trimmed, spaces) = space0(input)?;
    let (input, arg) = take_while(|c| c != '\n')(trimmed)?;

    let untrimmed = spaces.to_string() + arg;
    let text = arg.to_string();

    Ok((input, CommandArgument { untrimmed, text }))
}

fn parse_cmd_descr(input: &str) -> IResult<&str, CommandDescription> {
    let (input, _) = space0(input)?;
    let (input, _) = many0(char(':'))(input)?;
    let (input, _) = space0(input)?;
    let (input, range) = opt(parse_range)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_cmd_name(input)?;
    let (input, bang) = opt(parse_bang)(input)?;
    let (input, arg) = parse_cmd_argument(input)?;
    let (input, _) = opt(char('\n'))(input)?;

    let cmd = CommandDescription { range, command, bang: bang.is_some(), arg };

    Ok((input, cmd))
}

fn parse(input: &str) -> IResult<&str, CommandDescription> {
    let (input, descr) = parse_cmd_descr(input)?;
    let (input, _) = eof(input)?;

    Ok((input, descr))
}

impl ParsedCommand for CommandDescription {
    fn name(&self) -> String {
        return self.command.clone();
    }
}

impl FromStr for CommandDescription {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse(s) {
            Ok((_, cmd)) => Ok(cmd),
            Err(e) => Err(e.to_string()),
        }
    }
}
