//! # Vim regular expressions
//!
//! ## Overview
//!
//! Patterns typed after `/`, `?`, `:s` and `:g` use Vim's `magic` syntax, where grouping and
//! alternation need a backslash (`\(a\|b\)`) and `+`, `?` and `{` are literal. This module
//! rewrites them into the syntax of the [regex] crate, and expands the specials that can appear
//! in a substitution's replacement text.
use regex::{Captures, Regex, RegexBuilder};

use crate::commands::CommandError;
use crate::config::InterpreterConfig;

struct Translation {
    pattern: String,
    ignore_case: Option<bool>,
}

/// Parse the inside of a `\{...}` multi, starting just after the `{`.
///
/// Returns the regex quantifier and the index just past the closing brace.
fn brace_multi(chars: &[char], mut i: usize) -> Option<(String, usize)> {
    let lazy = chars.get(i) == Some(&'-');

    if lazy {
        i += 1;
    }

    let mut body = String::new();

    loop {
        match chars.get(i)? {
            '}' => {
                i += 1;
                break;
            },
            '\\' if chars.get(i + 1) == Some(&'}') => {
                i += 2;
                break;
            },
            c @ ('0'..='9' | ',') => {
                body.push(*c);
                i += 1;
            },
            _ => return None,
        }
    }

    let quant = match body.split_once(',') {
        None if body.is_empty() => "*".to_string(),
        None => format!("{{{body}}}"),
        Some(("", "")) => "*".to_string(),
        Some(("", max)) => format!("{{0,{max}}}"),
        Some((min, max)) => format!("{{{min},{max}}}"),
    };

    let quant = if lazy { quant + "?" } else { quant };

    Some((quant, i))
}

/// Copy a `[...]` collection, starting at the `[`.
///
/// Returns the translated collection and the index just past the closing `]`, or `None` when
/// the collection is never closed, in which case the `[` is literal.
fn collection(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut out = String::from("[");
    let mut i = start + 1;

    if chars.get(i) == Some(&'^') {
        out.push('^');
        i += 1;
    }

    if chars.get(i) == Some(&']') {
        out.push_str("\\]");
        i += 1;
    }

    loop {
        match chars.get(i)? {
            ']' => {
                out.push(']');
                return Some((out, i + 1));
            },
            '\\' => {
                match chars.get(i + 1)? {
                    'e' => out.push_str("\\x1b"),
                    c => {
                        out.push('\\');
                        out.push(*c);
                    },
                }

                i += 2;
            },
            '[' if chars.get(i + 1) == Some(&':') => {
                let end = (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == ':' && chars[j + 1] == ']')?;

                out.extend(&chars[i..end + 2]);
                i = end + 2;
            },
            c @ ('[' | '&' | '~') => {
                out.push('\\');
                out.push(*c);
                i += 1;
            },
            c => {
                out.push(*c);
                i += 1;
            },
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];

    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Whether position `j` ends the current branch, which makes a `$` before it an anchor.
fn ends_branch(chars: &[char], j: usize, very_magic: bool) -> bool {
    match chars.get(j) {
        None => true,
        Some('\\') => matches!(chars.get(j + 1), Some('|') | Some(')')),
        Some('|') | Some(')') => very_magic,
        _ => false,
    }
}

fn translate(pattern: &str) -> Result<Translation, CommandError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut ignore_case = None;
    let mut very_magic = false;
    let mut branch_start = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let at_start = branch_start;
        branch_start = false;

        /*
         * In very magic mode, the characters that need a backslash in magic mode are special
         * on their own, and a backslash makes them literal instead.
         */
        let (n, escaped) = if c == '\\' {
            match chars.get(i + 1) {
                Some(&n) => (n, true),
                None => {
                    out.push_str("\\\\");
                    break;
                },
            }
        } else {
            (c, false)
        };

        let magic_op = escaped != very_magic;
        let step = if escaped { 2 } else { 1 };

        match n {
            '(' | ')' | '|' | '+' | '?' | '=' | '{' | '<' | '>' if magic_op => {
                match n {
                    '(' => {
                        out.push('(');
                        branch_start = true;
                    },
                    ')' => out.push(')'),
                    '|' => {
                        out.push('|');
                        branch_start = true;
                    },
                    '+' => out.push('+'),
                    '?' | '=' => out.push('?'),
                    '<' | '>' => out.push_str("\\b"),
                    _ => {
                        let Some((quant, next)) = brace_multi(&chars, i + step) else {
                            let msg = format!("Invalid pattern: {pattern}");
                            return Err(CommandError::Error(msg));
                        };

                        out.push_str(&quant);
                        i = next;
                        continue;
                    },
                }

                i += step;
            },
            '%' if magic_op && chars.get(i + step) == Some(&'(') => {
                out.push_str("(?:");
                branch_start = true;
                i += step + 1;
            },
            _ if !escaped => {
                match c {
                    '^' if at_start => {
                        out.push('^');
                        branch_start = true;
                    },
                    '$' if ends_branch(&chars, i + 1, very_magic) => out.push('$'),
                    '*' if at_start => out.push_str("\\*"),
                    '.' | '*' => out.push(c),
                    '[' => {
                        if let Some((class, next)) = collection(&chars, i) {
                            out.push_str(&class);
                            i = next;
                            continue;
                        }

                        out.push_str("\\[");
                    },
                    c => push_literal(&mut out, c),
                }

                i += 1;
            },
            'v' => {
                very_magic = true;
                branch_start = at_start;
                i += 2;
            },
            'm' | 'M' | 'V' => {
                very_magic = false;
                branch_start = at_start;
                i += 2;
            },
            'c' | 'C' => {
                ignore_case = Some(n == 'c');
                branch_start = at_start;
                i += 2;
            },
            'n' => {
                out.push_str("\\n");
                i += 2;
            },
            't' => {
                out.push_str("\\t");
                i += 2;
            },
            'r' => {
                out.push_str("\\r");
                i += 2;
            },
            'e' => {
                out.push_str("\\x1b");
                i += 2;
            },
            's' | 'S' | 'd' | 'D' | 'w' | 'W' => {
                out.push('\\');
                out.push(n);
                i += 2;
            },
            'a' | 'A' | 'l' | 'L' | 'u' | 'U' | 'x' | 'X' | 'h' | 'H' => {
                let class = match n {
                    'a' => "[A-Za-z]",
                    'A' => "[^A-Za-z]",
                    'l' => "[a-z]",
                    'L' => "[^a-z]",
                    'u' => "[A-Z]",
                    'U' => "[^A-Z]",
                    'x' => "[0-9A-Fa-f]",
                    'X' => "[^0-9A-Fa-f]",
                    'h' => "[A-Za-z_]",
                    _ => "[^A-Za-z_]",
                };

                out.push_str(class);
                i += 2;
            },
            '1'..='9' => {
                return Err(CommandError::Error(format!("Backreferences are not supported: {pattern}")));
            },
            n => {
                push_literal(&mut out, n);
                i += 2;
            },
        }
    }

    Ok(Translation { pattern: out, ignore_case })
}

fn has_uppercase(pattern: &str) -> bool {
    let mut escaped = false;

    for c in pattern.chars() {
        if escaped {
            escaped = false;
            continue;
        }

        if c == '\\' {
            escaped = true;
        } else if c.is_uppercase() {
            return true;
        }
    }

    false
}

/// Compile a Vim pattern.
///
/// `case` overrides the case sensitivity chosen by the `ignorecase` and `smartcase` settings,
/// as the `i` and `I` flags of `:s` do. A `\c` or `\C` inside the pattern overrides both.
pub(crate) fn compile(
    pattern: &str,
    config: &InterpreterConfig,
    case: Option<bool>,
) -> Result<Regex, CommandError> {
    let translation = translate(pattern)?;

    let ignore = translation.ignore_case.or(case).unwrap_or_else(|| {
        config.ignorecase && !(config.smartcase && has_uppercase(pattern))
    });

    let regex = RegexBuilder::new(&translation.pattern).case_insensitive(ignore).build()?;

    Ok(regex)
}

/// Escape a string so that it matches literally as a Vim pattern.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if "\\/.*$^~[]".contains(c) {
            out.push('\\');
        }

        out.push(c);
    }

    out
}

#[derive(Clone, Copy, PartialEq)]
enum CaseMode {
    Keep,
    Upper,
    Lower,
}

struct CaseWriter {
    out: String,
    one: Option<CaseMode>,
    all: CaseMode,
}

impl CaseWriter {
    fn push(&mut self, c: char) {
        let mode = self.one.take().unwrap_or(self.all);

        match mode {
            CaseMode::Keep => self.out.push(c),
            CaseMode::Upper => self.out.extend(c.to_uppercase()),
            CaseMode::Lower => self.out.extend(c.to_lowercase()),
        }
    }

    fn push_str(&mut self, s: &str) {
        s.chars().for_each(|c| self.push(c));
    }
}

/// Expand the replacement text of a `:s` command for one match.
///
/// `&` and `\0` are the whole match, `\1` to `\9` are groups, `\r` and `\n` break the line,
/// `\t` is a tab, and `\u`, `\l`, `\U`, `\L`, `\e` and `\E` change the case of what follows.
pub(crate) fn expand_replacement(replacement: &str, caps: &Captures<'_>) -> String {
    let mut w = CaseWriter { out: String::new(), one: None, all: CaseMode::Keep };
    let mut chars = replacement.chars();
    let group = |n: usize| caps.get(n).map(|m| m.as_str()).unwrap_or("");

    while let Some(c) = chars.next() {
        match c {
            '&' => w.push_str(group(0)),
            '\\' => {
                match chars.next() {
                    Some(d @ '0'..='9') => {
                        let n = d.to_digit(10).unwrap_or(0) as usize;
                        w.push_str(group(n));
                    },
                    Some('n') | Some('r') => w.out.push('\n'),
                    Some('t') => w.push('\t'),
                    Some('u') => w.one = Some(CaseMode::Upper),
                    Some('l') => w.one = Some(CaseMode::Lower),
                    Some('U') => w.all = CaseMode::Upper,
                    Some('L') => w.all = CaseMode::Lower,
                    Some('e') | Some('E') => w.all = CaseMode::Keep,
                    Some(other) => w.push(other),
                    None => w.push('\\'),
                }
            },
            c => w.push(c),
        }
    }

    w.out
}

/// The length of [expand_replacement]'s result, not counting changes of case.
pub(crate) fn replacement_len(replacement: &str, caps: &Captures<'_>) -> usize {
    let group = |n: usize| caps.get(n).map_or(0, |m| m.len());
    let mut chars = replacement.chars();
    let mut len = 0usize;

    while let Some(c) = chars.next() {
        let n = match c {
            '&' => group(0),
            '\\' => {
                match chars.next() {
                    Some(d @ '0'..='9') => group(d.to_digit(10).unwrap_or(0) as usize),
                    Some(other) => other.len_utf8(),
                    None => 1,
                }
            },
            c => c.len_utf8(),
        };

        len = len.saturating_add(n);
    }

    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(pattern: &str) -> String {
        translate(pattern).unwrap().pattern
    }

    fn matches(pattern: &str, text: &str) -> bool {
        compile(pattern, &InterpreterConfig::default(), None).unwrap().is_match(text)
    }

    #[test]
    fn test_translate_magic() {
        assert_eq!(tr("^foo$"), "^foo$");
        assert_eq!(tr("a\\(b\\|c\\)"), "a(b|c)");
        assert_eq!(tr("(a)+?"), "\\(a\\)\\+\\?");
        assert_eq!(tr("a\\+b\\?c\\="), "a+b?c?");
        assert_eq!(tr("a\\{2,3}"), "a{2,3}");
        assert_eq!(tr("a\\{-}"), "a*?");
        assert_eq!(tr("a\\{,4\\}"), "a{0,4}");
        assert_eq!(tr("\\<foo\\>"), "\\bfoo\\b");
        assert_eq!(tr("a.*b"), "a.*b");
        assert_eq!(tr("*a"), "\\*a");
        assert_eq!(tr("a^b$c"), "a\\^b\\$c");
        assert_eq!(tr("x\\|^y"), "x|^y");
        assert_eq!(tr("\\/\\."), "/\\.");
        assert_eq!(tr("\\%(a\\)"), "(?:a)");
    }

    #[test]
    fn test_translate_very_magic() {
        assert_eq!(tr("\\v(a|b)+"), "(a|b)+");
        assert_eq!(tr("\\v<x>"), "\\bx\\b");
        assert_eq!(tr("\\v\\(a\\)"), "\\(a\\)");
        assert_eq!(tr("\\v^a{2}$"), "^a{2}$");
    }

    #[test]
    fn test_collections() {
        assert_eq!(tr("[abc]"), "[abc]");
        assert_eq!(tr("[^]x]"), "[^\\]x]");
        assert_eq!(tr("[[:alpha:]_]"), "[[:alpha:]_]");
        assert_eq!(tr("[a&&b]"), "[a\\&\\&b]");
        assert_eq!(tr("a[b"), "a\\[b");
    }

    #[test]
    fn test_classes() {
        assert!(matches("\\d\\+", "abc123"));
        assert!(matches("^\\s*$", "   "));
        assert!(matches("\\u\\l", "xAb"));
        assert!(!matches("\\u\\l", "xab"));
        assert!(matches("\\h\\w*", "_foo1"));
        assert!(matches("a\\tb", "a\tb"));
    }

    #[test]
    fn test_case() {
        let mut config = InterpreterConfig::default();

        assert!(!compile("foo", &config, None).unwrap().is_match("FOO"));
        assert!(compile("foo\\c", &config, None).unwrap().is_match("FOO"));
        assert!(compile("foo", &config, Some(true)).unwrap().is_match("FOO"));

        config.ignorecase(true);
        assert!(compile("foo", &config, None).unwrap().is_match("FOO"));
        assert!(!compile("\\Cfoo", &config, None).unwrap().is_match("FOO"));

        config.smartcase(true);
        assert!(!compile("Foo", &config, None).unwrap().is_match("FOO"));
        assert!(compile("\\Sfoo", &config, None).unwrap().is_match("XFOO"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            compile("\\(a", &InterpreterConfig::default(), None),
            Err(CommandError::InvalidRegex(_))
        ));
        assert!(matches!(
            compile("\\(a\\)\\1", &InterpreterConfig::default(), None),
            Err(CommandError::Error(_))
        ));
        assert!(matches!(
            compile("a\\{x}", &InterpreterConfig::default(), None),
            Err(CommandError::Error(_))
        ));
    }

    #[test]
    fn test_escape() {
        let pattern = escape("a.b*c/[d]");

        assert_eq!(pattern, "a\\.b\\*c\\/\\[d\\]");
        assert!(matches(&pattern, "xa.b*c/[d]"));
        assert!(!matches(&pattern, "aXb*c/[d]"));
    }

    #[test]
    fn test_expand_replacement() {
        let re = Regex::new("(\\w+) (\\w+)").unwrap();
        let caps = re.captures("hello world").unwrap();

        assert_eq!(expand_replacement("\\2 \\1", &caps), "world hello");
        assert_eq!(expand_replacement("[&]", &caps), "[hello world]");
        assert_eq!(expand_replacement("\\&\\\\", &caps), "&\\");
        assert_eq!(expand_replacement("a\\rb\\nc\\td", &caps), "a\nb\nc\td");
        assert_eq!(expand_replacement("\\u\\1", &caps), "Hello");
        assert_eq!(expand_replacement("\\U\\1\\e \\2", &caps), "HELLO world");
        assert_eq!(expand_replacement("\\L\\u\\0", &caps), "Hello world");
        assert_eq!(expand_replacement("\\9", &caps), "");
    }
}
