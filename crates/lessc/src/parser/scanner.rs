//! Cursor over comment-free source text.
//!
//! Every primitive either succeeds and advances the cursor, or fails and
//! leaves it untouched. Grammar rules save the cursor with [`Scanner::seek`]
//! before trying an alternative and put it back with [`Scanner::restore`]
//! when the alternative does not pan out; that is the whole backtracking
//! mechanism.
//!
//! Patterns are plain nom parsers:
//!
//! ```
//! use lessc::parser::Scanner;
//! use nom::character::complete::digit1;
//!
//! let mut s = Scanner::new("12 px");
//! assert_eq!(s.scan(digit1, true), Some("12"));
//! assert!(s.literal("px", false));
//! assert!(s.is_empty());
//! ```

use nom::IResult;

pub struct Scanner {
    buffer: String,
    pos: usize,
}

impl Scanner {
    /// Strips comments from `source` and positions the cursor on the first
    /// non-whitespace character.
    pub fn new(source: &str) -> Self {
        let mut scanner = Self {
            buffer: strip_comments(source),
            pos: 0,
        };
        scanner.skip_whitespace();
        scanner
    }

    pub fn seek(&self) -> usize {
        self.pos
    }

    pub fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &str {
        &self.buffer[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consumes `text` if the input starts with it.
    pub fn literal(&mut self, text: &str, eat_whitespace: bool) -> bool {
        if !self.rest().starts_with(text) {
            return false;
        }
        self.pos += text.len();
        if eat_whitespace {
            self.skip_whitespace();
        }
        true
    }

    /// Runs `parser` at the cursor, consuming what it matched.
    pub fn scan<'s, O, P>(&'s mut self, mut parser: P, eat_whitespace: bool) -> Option<O>
    where
        P: FnMut(&'s str) -> IResult<&'s str, O>,
    {
        let input: &'s str = &self.buffer[self.pos..];
        let (rest, out) = parser(input).ok()?;
        self.pos += input.len() - rest.len();
        if eat_whitespace {
            self.pos += rest.len() - rest.trim_start().len();
        }
        Some(out)
    }

    /// Whether `parser` would match at the cursor. Never consumes.
    pub fn peek<'s, O, P>(&'s self, mut parser: P) -> bool
    where
        P: FnMut(&'s str) -> IResult<&'s str, O>,
    {
        parser(&self.buffer[self.pos..]).is_ok()
    }

    /// Consumes everything up to and including `delim`, returning the text
    /// before it (or including it, with `include_delim`).
    pub fn to(&mut self, delim: &str, include_delim: bool, eat_whitespace: bool) -> Option<String> {
        let idx = self.rest().find(delim)?;
        let end = idx + delim.len();
        let text = if include_delim {
            &self.rest()[..end]
        } else {
            &self.rest()[..idx]
        };
        let text = text.to_string();
        self.pos += end;
        if eat_whitespace {
            self.skip_whitespace();
        }
        Some(text)
    }

    /// Whether the character just before the cursor is whitespace.
    pub fn preceded_by_whitespace(&self) -> bool {
        self.buffer[..self.pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace)
    }

    /// 1-based line of the cursor.
    pub fn line(&self) -> usize {
        self.buffer[..self.pos].matches('\n').count() + 1
    }

    /// Text from the cursor to the end of its line.
    pub fn line_text(&self) -> &str {
        let rest = self.rest();
        rest.split('\n').next().unwrap_or(rest).trim_end()
    }
}

/// Removes `//` and `/* */` comments. Quoted strings and `url(...)` are
/// copied untouched; newlines inside block comments are kept so that line
/// numbers survive.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push(c);
                let mut escaped = false;
                for (_, inner) in chars.by_ref() {
                    out.push(inner);
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == c {
                        break;
                    }
                }
            }
            'u' if source[i..].starts_with("url(") => {
                out.push(c);
                for (_, inner) in chars.by_ref() {
                    out.push(inner);
                    if inner == ')' {
                        break;
                    }
                }
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                chars.next();
                let mut prev = '\0';
                for (_, inner) in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                while chars.next_if(|&(_, next)| next != '\n').is_some() {}
            }
            _ => out.push(c),
        }
    }

    out
}
