//! Value and expression grammar.
//!
//! The lexical pieces (`parse_*`) are nom parsers over `&str`; the grammar
//! functions drive them through a [`Scanner`] and return `None`, with the
//! cursor restored, when nothing matched.
//!
//! ```text
//! property-value  = expression-list ("," expression-list)*
//! expression-list = expression+
//! expression      = value (op value)*            precedence climbing
//! value           = "(" expression ")" | number unit? | "-@" name | accessor
//!                 | hex-color | "~" string | function | string | keyword
//!                 | "@" name
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_while},
    character::complete::{alpha1, anychar, char, digit1, hex_digit1, one_of, satisfy},
    combinator::{map, map_res, opt, recognize, verify},
    error::{Error, ErrorKind},
    sequence::{delimited, pair, preceded, tuple},
};

use super::scanner::Scanner;
use super::selectors;
use crate::compiler::evaluate;
use crate::types::value::UNITS;
use crate::types::{BinOp, Color, ListDelim, Value};

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn fail<T>(input: &str, kind: ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(Error::new(input, kind)))
}

/// Identifier characters only: `foo-bar_2`.
pub fn parse_ident(input: &str) -> IResult<&str, &str> {
    nom::bytes::complete::take_while1(is_ident_char)(input)
}

/// A keyword: an identifier that does not start with a digit, optionally
/// vendor prefixed with `-`.
pub fn parse_keyword(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    )))(input)
}

/// `@name`, returning the name without its sigil.
pub fn parse_variable(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), parse_ident)(input)
}

pub fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit1)))),
                recognize(pair(char('.'), digit1)),
            )),
        )),
        str::parse::<f64>,
    )(input)
}

/// One of [`UNITS`]. The whole alphabetic run must be a unit, so `1solid` is
/// not `1s` followed by `olid`.
pub fn parse_unit(input: &str) -> IResult<&str, &str> {
    alt((tag("%"), verify(alpha1, |unit: &str| UNITS.contains(&unit))))(input)
}

/// `#rgb` or `#rrggbb`, not followed by an identifier character.
pub fn parse_hex_color(input: &str) -> IResult<&str, Color> {
    let (rest, digits) = preceded(char('#'), hex_digit1)(input)?;
    if rest.starts_with(is_ident_char) {
        return fail(input, ErrorKind::HexDigit);
    }
    match Color::from_hex(digits) {
        Some(color) => Ok((rest, color)),
        None => fail(input, ErrorKind::HexDigit),
    }
}

/// Inner text of a string delimited by `delim`, backslash escapes kept.
fn quoted_text<'a>(delim: char) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    let stop = if delim == '"' { "\\\"" } else { "\\'" };
    map(
        delimited(
            char(delim),
            opt(escaped(is_not(stop), '\\', anychar)),
            char(delim),
        ),
        Option::unwrap_or_default,
    )
}

/// A `"` or `'` delimited string with backslash escapes, returning the
/// delimiter and the raw inner text.
pub fn parse_quoted(input: &str) -> IResult<&str, (char, &str)> {
    alt((
        map(quoted_text('"'), |text| ('"', text)),
        map(quoted_text('\''), |text| ('\'', text)),
    ))(input)
}

/// Comma separated expression lists.
pub fn property_value(s: &mut Scanner) -> Option<Value> {
    let mut items = vec![expression_list(s, false)?];
    loop {
        let save = s.seek();
        if s.literal(",", true) {
            if let Some(item) = expression_list(s, false) {
                items.push(item);
                continue;
            }
        }
        s.restore(save);
        break;
    }
    Some(Value::compress(ListDelim::Comma, items))
}

/// Whitespace separated expressions.
pub fn expression_list(s: &mut Scanner, in_parens: bool) -> Option<Value> {
    let mut items = vec![expression(s, in_parens)?];
    while let Some(item) = expression(s, in_parens) {
        items.push(item);
    }
    Some(Value::compress(ListDelim::Space, items))
}

pub fn expression(s: &mut Scanner, in_parens: bool) -> Option<Value> {
    let lhs = value(s)?;
    Some(climb(s, lhs, 0, in_parens))
}

fn climb(s: &mut Scanner, mut lhs: Value, min_precedence: u8, in_parens: bool) -> Value {
    while let Some(op) =
        peek_operator(s, in_parens).filter(|op| op.precedence() >= min_precedence)
    {
        let save = s.seek();
        s.literal(&op.symbol().to_string(), true);
        let Some(mut rhs) = value(s) else {
            s.restore(save);
            break;
        };
        while let Some(next) =
            peek_operator(s, in_parens).filter(|next| next.precedence() > op.precedence())
        {
            // a dangling operator is left for the caller to reject
            let before = s.seek();
            rhs = climb(s, rhs, next.precedence(), in_parens);
            if s.seek() == before {
                break;
            }
        }
        lhs = fold(op, lhs, rhs);
    }
    lhs
}

/// The operator at the cursor, if it is binary here. Outside parentheses an
/// operator preceded by whitespace needs whitespace after it too: `10 -5` is a
/// list of two numbers.
fn peek_operator(s: &Scanner, in_parens: bool) -> Option<BinOp> {
    let mut chars = s.rest().chars();
    let op = BinOp::from_char(chars.next()?)?;
    if !in_parens && s.preceded_by_whitespace() && !chars.next().is_some_and(char::is_whitespace) {
        return None;
    }
    Some(op)
}

/// Folds concrete operands now; anything else stays a delayed expression.
fn fold(op: BinOp, left: Value, right: Value) -> Value {
    if !left.defers_arithmetic() && !right.defers_arithmetic() {
        if let Ok(value) = evaluate(op, &left, &right) {
            return value;
        }
    }
    Value::Expression {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// A single value, trying each form in order.
pub fn value(s: &mut Scanner) -> Option<Value> {
    let start = s.seek();

    if s.literal("(", true) {
        if let Some(inner) = expression(s, true) {
            if s.literal(")", true) {
                return Some(inner);
            }
        }
        s.restore(start);
    }

    if let Some((value, unit)) = s.scan(pair(parse_number, opt(parse_unit)), true) {
        return Some(Value::with_unit(value, unit.unwrap_or_default()));
    }

    if let Some(name) = s.scan(preceded(char('-'), parse_variable), true) {
        return Some(Value::Negative(Box::new(Value::Variable(name.to_string()))));
    }

    if let Some(lookup) = selectors::accessor(s) {
        return Some(lookup);
    }

    if let Some(color) = s.scan(parse_hex_color, true) {
        return Some(Value::Color(color));
    }

    if let Some((_, text)) = s.scan(preceded(char('~'), parse_quoted), true) {
        return Some(Value::keyword(text));
    }

    if let Some(call) = function(s) {
        return Some(call);
    }

    if let Some((delim, text)) = s.scan(parse_quoted, true) {
        return Some(Value::String {
            delim,
            text: text.to_string(),
        });
    }

    if let Some(keyword) = s.scan(parse_keyword, true) {
        return Some(Value::keyword(keyword));
    }

    if let Some(name) = s.scan(parse_variable, true) {
        return Some(Value::Variable(name.to_string()));
    }

    None
}

/// `name(arg, ...)`. `url(...)` is captured verbatim as a keyword.
fn function(s: &mut Scanner) -> Option<Value> {
    let start = s.seek();
    let name = s.scan(parse_keyword, false)?.to_string();
    if !s.literal("(", true) {
        s.restore(start);
        return None;
    }

    if name == "url" {
        return match s.to(")", false, true) {
            Some(inner) => Some(Value::keyword(format!("url({})", inner.trim()))),
            None => {
                s.restore(start);
                None
            }
        };
    }

    let mut args = Vec::new();
    if !s.literal(")", true) {
        loop {
            let Some(arg) = expression_list(s, false) else {
                s.restore(start);
                return None;
            };
            args.push(arg);
            if s.literal(",", true) {
                continue;
            }
            if s.literal(")", true) {
                break;
            }
            s.restore(start);
            return None;
        }
    }

    Some(Value::Function { name, args })
}
