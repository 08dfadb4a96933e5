//! CSS output.
//!
//! The compiler produces a tree of [`CssNode`]s holding fully reduced values;
//! a [`Formatter`] serializes that tree. Formatters only decide whitespace,
//! separators and color spelling, never content.
//!
//! ```
//! use lessc::{Compiler, Formatter};
//!
//! let mut compiler = Compiler::new();
//! compiler.set_formatter("compressed".parse().unwrap());
//! let css = compiler.compile("a { color: #ffffff; margin: 0 auto; }").unwrap();
//! assert_eq!(css, "a{color:#fff;margin:0 auto;}");
//! ```

use std::fmt::Write;
use std::str::FromStr;

use thiserror::Error;

use crate::types::value::format_number;
use crate::types::{ListDelim, Value};

/// One piece of generated CSS.
#[derive(Clone, Debug, PartialEq)]
pub enum CssNode {
    /// `name:value;`
    Property { name: String, value: Value },
    /// A line copied to the output as is.
    Line(String),
    /// `selectors { body }`; the body holds properties and lines.
    Rule {
        selectors: Vec<String>,
        body: Vec<CssNode>,
    },
    /// `@media ... { children }` and other at-rule groups.
    Group { header: String, children: Vec<CssNode> },
}

/// Output style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Formatter {
    /// `prop:value;`, one-property rules on a single line.
    #[default]
    Classic,
    /// `prop: value;`, one selector per line, rules always multi-line.
    LessJs,
    /// No optional whitespace at all.
    Compressed,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown formatter `{0}`")]
pub struct UnknownFormatter(pub String);

impl FromStr for Formatter {
    type Err = UnknownFormatter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" | "default" => Ok(Self::Classic),
            "lessjs" | "less.js" | "pretty" => Ok(Self::LessJs),
            "compressed" => Ok(Self::Compressed),
            _ => Err(UnknownFormatter(s.to_string())),
        }
    }
}

const INDENT: &str = "  ";

impl Formatter {
    /// Serializes a document.
    pub fn format(&self, nodes: &[CssNode]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.node(&mut out, node, 0);
        }
        out
    }

    fn node(&self, out: &mut String, node: &CssNode, depth: usize) {
        match node {
            CssNode::Property { .. } | CssNode::Line(_) => {
                self.indent(out, depth);
                out.push_str(&self.line(node));
                self.newline(out);
            }
            CssNode::Rule { selectors, body } => self.rule(out, selectors, body, depth),
            CssNode::Group { header, children } => {
                self.indent(out, depth);
                out.push_str(header);
                out.push_str(if *self == Self::Compressed { "{" } else { " {" });
                self.newline(out);
                for child in children {
                    self.node(out, child, depth + 1);
                }
                self.indent(out, depth);
                out.push('}');
                self.newline(out);
            }
        }
    }

    fn rule(&self, out: &mut String, selectors: &[String], body: &[CssNode], depth: usize) {
        match self {
            Self::Compressed => {
                out.push_str(&selectors.join(","));
                out.push('{');
                for line in body {
                    out.push_str(&self.line(line));
                }
                out.push('}');
            }
            Self::Classic if body.len() == 1 => {
                self.indent(out, depth);
                let _ = writeln!(out, "{} {{ {} }}", selectors.join(", "), self.line(&body[0]));
            }
            Self::Classic | Self::LessJs => {
                self.indent(out, depth);
                if *self == Self::LessJs {
                    let pad = INDENT.repeat(depth);
                    out.push_str(&selectors.join(&format!(", \n{pad}")));
                } else {
                    out.push_str(&selectors.join(", "));
                }
                out.push_str(" {\n");
                for line in body {
                    self.indent(out, depth + 1);
                    out.push_str(&self.line(line));
                    out.push('\n');
                }
                self.indent(out, depth);
                out.push_str("}\n");
            }
        }
    }

    /// A property or raw line without indentation.
    fn line(&self, node: &CssNode) -> String {
        match node {
            CssNode::Property { name, value } => match self {
                Self::LessJs => format!("{name}: {};", self.value(value)),
                Self::Classic | Self::Compressed => format!("{name}:{};", self.value(value)),
            },
            CssNode::Line(text) => text.clone(),
            // rule bodies never hold nested rules or groups
            CssNode::Rule { .. } | CssNode::Group { .. } => String::new(),
        }
    }

    fn indent(&self, out: &mut String, depth: usize) {
        if *self != Self::Compressed {
            for _ in 0..depth {
                out.push_str(INDENT);
            }
        }
    }

    fn newline(&self, out: &mut String) {
        if *self != Self::Compressed {
            out.push('\n');
        }
    }

    /// Renders a reduced value.
    pub fn value(&self, value: &Value) -> String {
        match value {
            Value::Number { value, unit } => format!("{}{unit}", format_number(*value)),
            Value::Color(color) => {
                let color = color.fixed();
                if *self == Self::Compressed && color.a.is_none() && color.is_shortenable() {
                    format!(
                        "#{:x}{:x}{:x}",
                        color.r as u32 / 17,
                        color.g as u32 / 17,
                        color.b as u32 / 17
                    )
                } else {
                    color.to_string()
                }
            }
            Value::List { delim, items } => {
                let sep = match (delim, self) {
                    (ListDelim::Space, _) => " ",
                    (ListDelim::Comma, Self::Compressed) => ",",
                    (ListDelim::Comma, _) => ", ",
                };
                items
                    .iter()
                    .map(|item| self.value(item))
                    .collect::<Vec<_>>()
                    .join(sep)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn sample() -> Vec<CssNode> {
        let prop = |name: &str, value: Value| CssNode::Property {
            name: name.into(),
            value,
        };
        vec![
            CssNode::Rule {
                selectors: vec!["div".into(), "pre".into()],
                body: vec![prop("color", Value::Color(Color::rgb(0.0, 0.0, 255.0)))],
            },
            CssNode::Rule {
                selectors: vec!["a".into()],
                body: vec![
                    prop(
                        "margin",
                        Value::compress(ListDelim::Space, vec![Value::number(0.0), "auto".into()]),
                    ),
                    prop(
                        "font-family",
                        Value::compress(ListDelim::Comma, vec!["a".into(), "b".into()]),
                    ),
                ],
            },
        ]
    }

    #[test]
    fn test_classic() {
        assert_eq!(
            Formatter::Classic.format(&sample()),
            "div, pre { color:#0000ff; }\na {\n  margin:0 auto;\n  font-family:a, b;\n}\n"
        );
    }

    #[test]
    fn test_lessjs() {
        assert_eq!(
            Formatter::LessJs.format(&sample()),
            "div, \npre {\n  color: #0000ff;\n}\na {\n  margin: 0 auto;\n  font-family: a, b;\n}\n"
        );
    }

    #[test]
    fn test_compressed() {
        assert_eq!(
            Formatter::Compressed.format(&sample()),
            "div,pre{color:#00f;}a{margin:0 auto;font-family:a,b;}"
        );
    }

    #[test]
    fn test_group_indents_children() {
        let nodes = vec![CssNode::Group {
            header: "@media print".into(),
            children: vec![CssNode::Rule {
                selectors: vec!["a".into()],
                body: vec![CssNode::Line("b:c;".into())],
            }],
        }];
        assert_eq!(
            Formatter::Classic.format(&nodes),
            "@media print {\n  a { b:c; }\n}\n"
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("LessJs".parse::<Formatter>(), Ok(Formatter::LessJs));
        assert_eq!("compressed".parse::<Formatter>(), Ok(Formatter::Compressed));
        assert_eq!(
            "fancy".parse::<Formatter>(),
            Err(UnknownFormatter("fancy".into()))
        );
    }
}
