//! The value model shared by the parser and the reducer.
//!
//! A [`Value`] is either *concrete* (numbers, colors, keywords, strings and
//! lists of concrete values) or *delayed*: variables, expressions, function
//! calls, negations and accessor lookups whose result depends on the scope
//! they are reduced in. Delayed values never reach the formatter.

use std::fmt;

use super::color::Color;

/// Units recognised after a number.
pub const UNITS: &[&str] = &[
    "vmin", "vmax", "grad", "turn", "rem", "rad", "deg", "dpi", "px", "in", "cm", "mm", "em",
    "ex", "pt", "pc", "ms", "vh", "vw", "fr", "ch", "%", "s",
];

/// Arithmetic operators, with precedence used by the expression parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '%' => Some(Self::Rem),
            _ => None,
        }
    }

    /// `+`/`-` bind at 0, `*`/`/`/`%` at 1.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 0,
            Self::Mul | Self::Div | Self::Rem => 1,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Rem => '%',
        }
    }

    /// Applies the operator to two plain numbers. Division and remainder by
    /// zero yield `None`.
    pub fn apply(self, left: f64, right: f64) -> Option<f64> {
        match self {
            Self::Add => Some(left + right),
            Self::Sub => Some(left - right),
            Self::Mul => Some(left * right),
            Self::Div if right == 0.0 => None,
            Self::Div => Some(left / right),
            Self::Rem if right == 0.0 => None,
            Self::Rem => Some(left % right),
        }
    }
}

/// Separator of a [`Value::List`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListDelim {
    /// `a b c`
    Space,
    /// `a, b, c`
    Comma,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A number; `unit` is empty for a bare number.
    Number { value: f64, unit: String },
    Color(Color),
    Keyword(String),
    /// A quoted string. `text` excludes the delimiters.
    String { delim: char, text: String },
    List { delim: ListDelim, items: Vec<Value> },
    /// `name(args)`; `args` holds one value per comma separated argument.
    Function { name: String, args: Vec<Value> },
    /// `@name`, stored without the sigil.
    Variable(String),
    Expression {
        op: BinOp,
        left: Box<Value>,
        right: Box<Value>,
    },
    Negative(Box<Value>),
    /// `path['member']`; `member` keeps its `@` when it names a variable.
    Lookup { path: Vec<String>, member: String },
}

impl Value {
    pub fn number(value: f64) -> Self {
        Self::Number {
            value,
            unit: String::new(),
        }
    }

    pub fn with_unit(value: f64, unit: &str) -> Self {
        Self::Number {
            value,
            unit: unit.to_string(),
        }
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        Self::Keyword(text.into())
    }

    /// Wraps `items` in a list unless there is exactly one.
    pub fn compress(delim: ListDelim, mut items: Vec<Value>) -> Self {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Self::List { delim, items }
        }
    }

    /// Whether this value must be reduced before it can be serialized.
    pub fn is_delayed(&self) -> bool {
        match self {
            Self::Variable(_)
            | Self::Expression { .. }
            | Self::Function { .. }
            | Self::Negative(_)
            | Self::Lookup { .. } => true,
            Self::List { items, .. } => items.iter().any(Value::is_delayed),
            Self::Number { .. } | Self::Color(_) | Self::Keyword(_) | Self::String { .. } => false,
        }
    }

    /// Whether the parser must keep an operation on this operand delayed.
    /// Lists are never folded.
    pub fn defers_arithmetic(&self) -> bool {
        matches!(self, Self::List { .. }) || self.is_delayed()
    }

    /// The text of a string or keyword without quotes.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Keyword(text) | Self::String { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Keyword(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Keyword(text)
    }
}

impl From<Color> for Value {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

/// Renders a number without trailing zeros, rounded to eight decimals.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1e8).round() / 1e8;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    let text = format!("{rounded:.8}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Source-like rendering, used for passthrough function calls and for
/// string concatenation. Formatter-specific output lives in `format.rs`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { value, unit } => write!(f, "{}{unit}", format_number(*value)),
            Self::Color(color) => write!(f, "{color}"),
            Self::Keyword(text) => f.write_str(text),
            Self::String { delim, text } => write!(f, "{delim}{text}{delim}"),
            Self::List { delim, items } => {
                let sep = match delim {
                    ListDelim::Space => " ",
                    ListDelim::Comma => ", ",
                };
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Variable(name) => write!(f, "@{name}"),
            Self::Expression { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Self::Negative(inner) => write!(f, "-{inner}"),
            Self::Lookup { path, member } => write!(f, "{}['{member}']", path.join(" > ")),
        }
    }
}
