//! Selector-side grammar: block tags, mixin paths, parameter lists and
//! accessors.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace0, none_of, one_of},
    combinator::{opt, recognize},
    sequence::{pair, preceded, tuple},
};

use super::scanner::Scanner;
use super::values::{expression_list, parse_ident, parse_quoted, parse_variable};
use crate::types::{ArgDef, Value};

/// A raw selector up to the next `,`, `;`, `{` or `}`. Tags never start with
/// a digit; those are keyframe steps.
pub fn parse_tag(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        none_of(",;{}0123456789"),
        take_while(|c: char| !matches!(c, ',' | ';' | '{' | '}')),
    ))(input)
}

/// `.name`, `#name`, `$name` or a bare identifier.
pub fn parse_simple_tag(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(one_of(".#$")), parse_ident))(input)
}

/// A keyframe step: `from`, `to` or a percentage.
pub fn parse_keyframe_step(input: &str) -> IResult<&str, &str> {
    alt((
        tag("from"),
        tag("to"),
        recognize(tuple((digit1, opt(pair(char('.'), digit1)), char('%')))),
    ))(input)
}

/// Collapses runs of whitespace inside a selector.
fn normalize(tag: &str) -> String {
    tag.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `tag ("," tag)*`
pub fn tag_list(s: &mut Scanner) -> Option<Vec<String>> {
    let start = s.seek();
    let mut tags = vec![normalize(s.scan(parse_tag, true)?)];
    while s.literal(",", true) {
        match s.scan(parse_tag, true) {
            Some(tag) => tags.push(normalize(tag)),
            None => {
                s.restore(start);
                return None;
            }
        }
    }
    Some(tags)
}

/// Comma separated keyframe steps.
pub fn keyframe_steps(s: &mut Scanner) -> Option<Vec<String>> {
    let start = s.seek();
    let mut steps = vec![s.scan(parse_keyframe_step, true)?.to_string()];
    while s.literal(",", true) {
        match s.scan(parse_keyframe_step, true) {
            Some(step) => steps.push(step.to_string()),
            None => {
                s.restore(start);
                return None;
            }
        }
    }
    Some(steps)
}

/// A mixin path: simple tags separated by `>` or whitespace. Adjacent tags
/// (`.a.b`) form a path too.
pub fn mixin_path(s: &mut Scanner) -> Option<Vec<String>> {
    let mut path = vec![s.scan(parse_simple_tag, true)?.to_string()];
    loop {
        let save = s.seek();
        s.literal(">", true);
        match s.scan(parse_simple_tag, true) {
            Some(tag) => path.push(tag.to_string()),
            None => {
                s.restore(save);
                break;
            }
        }
    }
    Some(path)
}

/// `( arg-def ([,;] arg-def)* )`, possibly empty.
pub fn arg_defs(s: &mut Scanner) -> Option<Vec<ArgDef>> {
    let start = s.seek();
    if !s.literal("(", true) {
        return None;
    }
    let mut defs = Vec::new();
    if s.literal(")", true) {
        return Some(defs);
    }
    loop {
        let Some(name) = s.scan(parse_variable, true).map(str::to_string) else {
            s.restore(start);
            return None;
        };
        let default = if s.literal(":", true) {
            match expression_list(s, false) {
                Some(value) => Some(value),
                None => {
                    s.restore(start);
                    return None;
                }
            }
        } else {
            None
        };
        defs.push(ArgDef { name, default });

        if s.literal(",", true) || s.literal(";", true) {
            continue;
        }
        if s.literal(")", true) {
            return Some(defs);
        }
        s.restore(start);
        return None;
    }
}

/// `( args )` of a mixin call: expression lists separated by `,` or `;`.
pub fn call_args(s: &mut Scanner) -> Option<Vec<Value>> {
    let start = s.seek();
    if !s.literal("(", true) {
        return None;
    }
    let mut args = Vec::new();
    if s.literal(")", true) {
        return Some(args);
    }
    loop {
        let Some(arg) = expression_list(s, false) else {
            s.restore(start);
            return None;
        };
        args.push(arg);
        if s.literal(",", true) || s.literal(";", true) {
            continue;
        }
        if s.literal(")", true) {
            return Some(args);
        }
        s.restore(start);
        return None;
    }
}

/// `#ns > .mixin['@var']`. Path tags are joined by `>` only, so a space list
/// such as `solid #ns['@c']` is not mistaken for a two-tag path.
pub fn accessor(s: &mut Scanner) -> Option<Value> {
    let start = s.seek();
    let mut path = Vec::new();
    loop {
        match s.scan(parse_simple_tag, false) {
            Some(tag) => path.push(tag.to_string()),
            None => {
                s.restore(start);
                return None;
            }
        }
        if s.scan(preceded(multispace0, char('>')), true).is_none() {
            break;
        }
    }

    if !s.literal("[", true) {
        s.restore(start);
        return None;
    }
    let member = if let Some((_, text)) = s.scan(parse_quoted, true) {
        text.to_string()
    } else if let Some(name) = s.scan(parse_variable, true) {
        format!("@{name}")
    } else {
        s.restore(start);
        return None;
    };
    if !s.literal("]", true) {
        s.restore(start);
        return None;
    }

    Some(Value::Lookup { path, member })
}
