//! Stylesheet parsing.
//!
//! This module turns source text into a [`Stylesheet`] block tree:
//!
//! - [`Parser`]: the chunk loop, block stack and `@import` handling
//! - [`scanner`]: comment stripping and the backtracking cursor
//! - [`values`]: numbers, colors, strings, functions and expressions
//! - [`selectors`]: block tags, mixin paths, parameters and accessors
//!
//! The parser only builds structure. The single piece of evaluation it does is
//! folding arithmetic whose operands are already concrete.
//!
//! ## Example
//!
//! ```rust
//! use lessc::parser::parse;
//! use lessc::types::{Prop, Value};
//!
//! let sheet = parse("@w: 10px * 2; div { width: @w; }").unwrap();
//! let root = sheet.root();
//!
//! assert_eq!(
//!     root.props[0],
//!     Prop::Assign { name: "@w".into(), value: Value::with_unit(20.0, "px") }
//! );
//! assert!(root.children.contains_key("div"));
//! ```

pub mod scanner;
pub mod selectors;
pub mod values;

pub use scanner::Scanner;

use std::path::PathBuf;

use nom::{
    IResult,
    bytes::complete::{tag, take_till, take_till1},
    character::complete::{alpha1, char, satisfy},
    combinator::{not, opt, recognize},
    sequence::{terminated, tuple},
};

use crate::error::{CompileError, Result};
use crate::import::ImportResolver;
use crate::types::{ArgDef, Block, BlockId, ListDelim, Prop, Special, Stylesheet, Value};

/// Line emitted in place of every `@import` when imports are disabled.
pub const IMPORT_DISABLED: &str = "/* import disabled */";

/// How `@import` statements are handled.
#[derive(Clone, Copy)]
pub enum ImportMode<'a> {
    /// Every import is left in the output as written.
    Passthrough,
    /// Every import is replaced by [`IMPORT_DISABLED`]; nothing is resolved.
    Disabled,
    /// Imports are resolved and parsed in place. `.css` imports, imports with
    /// a media query and imports the resolver cannot find pass through.
    Resolve(&'a dyn ImportResolver),
}

/// Parses `source` with imports passed through untouched.
pub fn parse(source: &str) -> Result<Stylesheet> {
    let mut parser = Parser::new(ImportMode::Passthrough);
    parser.parse_source(source, None)?;
    Ok(parser.finish().0)
}

/// Parses a standalone property value, as used for injected variables.
pub fn parse_value(raw: &str) -> Result<Value> {
    let mut s = Scanner::new(raw);
    match values::property_value(&mut s) {
        Some(value) if s.is_empty() => Ok(value),
        _ => Err(CompileError::Syntax {
            line: 1,
            text: raw.to_string(),
            file: None,
        }),
    }
}

/// Builds a [`Stylesheet`] from one or more sources. Imported sources are
/// parsed into the block that was open at the `@import`.
pub struct Parser<'a> {
    sheet: Stylesheet,
    stack: Vec<BlockId>,
    imports: ImportMode<'a>,
    imported: Vec<PathBuf>,
    file: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(imports: ImportMode<'a>) -> Self {
        Self {
            sheet: Stylesheet::new(),
            stack: vec![Stylesheet::ROOT],
            imports,
            imported: Vec::new(),
            file: None,
        }
    }

    /// Parses `source` into the currently open block. Blocks opened by this
    /// source must also be closed by it.
    pub fn parse_source(&mut self, source: &str, file: Option<String>) -> Result<()> {
        let outer_file = std::mem::replace(&mut self.file, file);
        let floor = self.stack.len();
        let mut s = Scanner::new(source);

        while !s.is_empty() {
            if !self.chunk(&mut s, floor)? {
                return Err(CompileError::Syntax {
                    line: s.line(),
                    text: s.line_text().to_string(),
                    file: self.file.clone(),
                });
            }
        }

        if self.stack.len() > floor {
            return Err(CompileError::UnclosedBlock {
                file: self.file.clone(),
            });
        }

        self.file = outer_file;
        Ok(())
    }

    /// The finished tree and every file pulled in by imports.
    pub fn finish(self) -> (Stylesheet, Vec<PathBuf>) {
        (self.sheet, self.imported)
    }

    fn current(&self) -> BlockId {
        self.stack.last().copied().unwrap_or(Stylesheet::ROOT)
    }

    fn push(&mut self, prop: Prop) {
        let current = self.current();
        self.sheet.get_mut(current).props.push(prop);
    }

    fn open(&mut self, tags: Vec<String>, special: Special, args: Option<Vec<ArgDef>>) {
        log::trace!("open block {tags:?}");
        let block = Block {
            tags,
            special,
            args,
            ..Default::default()
        };
        let id = self.sheet.open(self.current(), block);
        self.stack.push(id);
    }

    /// Consumes one construct. `Ok(false)` means nothing matched.
    fn chunk(&mut self, s: &mut Scanner, floor: usize) -> Result<bool> {
        if let Some(prop) = attempt(s, property) {
            self.push(prop);
            return Ok(true);
        }

        if self.current() == Stylesheet::ROOT && self.at_rule(s) {
            return Ok(true);
        }

        if matches!(self.sheet.get(self.current()).special, Special::Keyframes { .. }) {
            if let Some(steps) = attempt(s, keyframe_step) {
                self.open(steps, Special::KeyframeStep, None);
                return Ok(true);
            }
        }

        if let Some(prop) = attempt(s, variable) {
            self.push(prop);
            return Ok(true);
        }

        if self.import(s)? {
            return Ok(true);
        }

        if let Some((tag, args)) = attempt(s, parametric_mixin) {
            self.open(vec![tag], Special::None, Some(args));
            return Ok(true);
        }

        if let Some(tags) = attempt(s, block_open) {
            self.open(tags, Special::None, None);
            return Ok(true);
        }

        if s.rest().starts_with('}') && self.stack.len() > floor {
            s.literal("}", true);
            if let Some(id) = self.stack.pop() {
                self.sheet.close(id);
            }
            return Ok(true);
        }

        if let Some(prop) = attempt(s, mixin_invocation) {
            self.push(prop);
            return Ok(true);
        }

        Ok(s.literal(";", true))
    }

    fn at_rule(&mut self, s: &mut Scanner) -> bool {
        let font_face = |s: &mut Scanner| {
            s.scan(at_keyword("@font-face"), true)?;
            s.literal("{", true).then_some(())
        };
        if attempt(s, font_face).is_some() {
            self.open(vec!["@font-face".into()], Special::FontFace, None);
            return true;
        }

        if let Some(value) = attempt(s, charset) {
            self.push(Prop::Charset(value));
            return true;
        }

        if let Some(query) = attempt(s, media) {
            self.open(vec!["@media".into()], Special::Media(query), None);
            return true;
        }

        if let Some((prefix, name)) = attempt(s, keyframes) {
            let tag = format!("@{prefix}keyframes");
            self.open(vec![tag], Special::Keyframes { prefix, name }, None);
            return true;
        }

        false
    }

    fn import(&mut self, s: &mut Scanner) -> Result<bool> {
        let Some(import) = attempt(s, import_statement) else {
            return Ok(false);
        };

        match self.imports {
            ImportMode::Disabled => self.push(Prop::Raw(IMPORT_DISABLED.to_string())),
            ImportMode::Passthrough => self.push(Prop::Import(import.statement())),
            ImportMode::Resolve(_) if import.path.ends_with(".css") || !import.media.is_empty() => {
                log::debug!("passing through import of {}", import.path);
                self.push(Prop::Import(import.statement()));
            }
            ImportMode::Resolve(resolver) => match resolver.resolve(&import.path)? {
                Some((path, text)) => {
                    log::debug!("importing {} from {}", import.path, path.display());
                    let file = path.display().to_string();
                    self.imported.push(path);
                    self.parse_source(&text, Some(file))?;
                }
                None => {
                    log::debug!("import {} not found, passing through", import.path);
                    self.push(Prop::Import(import.statement()));
                }
            },
        }

        Ok(true)
    }
}

/// Runs `rule`, putting the cursor back when it does not match.
fn attempt<T>(s: &mut Scanner, rule: impl FnOnce(&mut Scanner) -> Option<T>) -> Option<T> {
    let start = s.seek();
    let result = rule(s);
    if result.is_none() {
        s.restore(start);
    }
    result
}

/// `;`, a `}` that is left for the block close, or end of input.
fn end(s: &mut Scanner) -> Option<()> {
    (s.literal(";", true) || s.rest().starts_with('}') || s.is_empty()).then_some(())
}

fn property(s: &mut Scanner) -> Option<Prop> {
    let important = s.literal("!", false);
    let name = s.scan(values::parse_keyword, true)?.to_string();
    s.literal(":", true).then_some(())?;
    let mut value = values::property_value(s)?;
    if s.literal("!important", true) || important {
        value = with_important(value);
    }
    end(s)?;
    Some(Prop::Assign { name, value })
}

fn with_important(value: Value) -> Value {
    let important = Value::keyword("!important");
    match value {
        Value::List {
            delim: ListDelim::Space,
            mut items,
        } => {
            items.push(important);
            Value::List {
                delim: ListDelim::Space,
                items,
            }
        }
        other => Value::List {
            delim: ListDelim::Space,
            items: vec![other, important],
        },
    }
}

fn variable(s: &mut Scanner) -> Option<Prop> {
    let name = format!("@{}", s.scan(values::parse_variable, true)?);
    s.literal(":", true).then_some(())?;
    let value = values::property_value(s)?;
    end(s)?;
    Some(Prop::Assign { name, value })
}

/// `name` as a whole word, so `@media` does not match the variable `@media-x`.
fn at_keyword<'i>(name: &'static str) -> impl FnMut(&'i str) -> IResult<&'i str, &'i str> {
    terminated(tag(name), not(satisfy(values::is_ident_char)))
}

fn charset(s: &mut Scanner) -> Option<Value> {
    s.scan(at_keyword("@charset"), true)?;
    let value = values::property_value(s)?;
    end(s)?;
    Some(value)
}

fn media(s: &mut Scanner) -> Option<String> {
    s.scan(at_keyword("@media"), true)?;
    let query = s.to("{", false, true)?.trim().to_string();
    (!query.is_empty()).then_some(query)
}

/// `@keyframes name {` or `@-vendor-keyframes name {`.
fn keyframes(s: &mut Scanner) -> Option<(String, Value)> {
    let opener = s.scan(
        recognize(tuple((
            char('@'),
            opt(tuple((char('-'), alpha1, char('-')))),
            at_keyword("keyframes"),
        ))),
        true,
    )?;
    let prefix = opener[1..opener.len() - "keyframes".len()].to_string();
    let name = values::value(s)?;
    s.literal("{", true).then_some(())?;
    Some((prefix, name))
}

fn keyframe_step(s: &mut Scanner) -> Option<Vec<String>> {
    let steps = selectors::keyframe_steps(s)?;
    s.literal("{", true).then_some(steps)
}

fn parametric_mixin(s: &mut Scanner) -> Option<(String, Vec<ArgDef>)> {
    let tag = s.scan(selectors::parse_simple_tag, true)?.to_string();
    let args = selectors::arg_defs(s)?;
    s.literal("{", true).then_some((tag, args))
}

fn block_open(s: &mut Scanner) -> Option<Vec<String>> {
    let tags = selectors::tag_list(s)?;
    s.literal("{", true).then_some(tags)
}

fn mixin_invocation(s: &mut Scanner) -> Option<Prop> {
    let path = selectors::mixin_path(s)?;
    let args = if s.rest().starts_with('(') {
        selectors::call_args(s)?
    } else {
        Vec::new()
    };
    end(s)?;
    Some(Prop::Mixin { path, args })
}

struct ImportStatement {
    /// The target as written: `url(...)`, a quoted string or a bare word.
    raw: String,
    /// The target path without quotes or `url()`.
    path: String,
    media: String,
}

impl ImportStatement {
    fn statement(&self) -> String {
        if self.media.is_empty() {
            format!("@import {};", self.raw)
        } else {
            format!("@import {} {};", self.raw, self.media)
        }
    }
}

fn import_statement(s: &mut Scanner) -> Option<ImportStatement> {
    s.scan(at_keyword("@import"), true)?;

    let (raw, path) = if s.literal("url(", true) {
        let inner = s.to(")", false, true)?;
        let inner = inner.trim();
        let path = inner.trim_matches(|c| c == '"' || c == '\'').to_string();
        (format!("url({inner})"), path)
    } else if let Some((delim, text)) = s.scan(values::parse_quoted, true) {
        (format!("{delim}{text}{delim}"), text.to_string())
    } else {
        let word = s.scan(take_till1(|c: char| c.is_whitespace() || c == ';' || c == '}'), true)?;
        (word.to_string(), word.to_string())
    };

    let media = s
        .scan(take_till(|c: char| c == ';' || c == '\n' || c == '}'), false)
        .unwrap_or_default()
        .trim()
        .to_string();
    end(s)?;

    Some(ImportStatement { raw, path, media })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse_ok(source: &str) -> Stylesheet {
        parse(source).expect("parse")
    }

    fn assigns(block: &Block) -> Vec<(&str, String)> {
        block
            .props
            .iter()
            .filter_map(|p| match p {
                Prop::Assign { name, value } => Some((name.as_str(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_properties_and_important() {
        let sheet = parse_ok("a { color: red; !margin: 0; padding: 1px 2px !important }");
        let a = sheet.get(sheet.root().children["a"]);
        assert_eq!(
            assigns(a),
            vec![
                ("color", "red".to_string()),
                ("margin", "0 !important".to_string()),
                ("padding", "1px 2px !important".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_blocks_and_children() {
        let sheet = parse_ok("div, pre { span, .big { height: 20px; } }");
        let outer = sheet.root().children["div"];
        assert_eq!(sheet.root().children["pre"], outer);
        let inner = &sheet.get(outer).children;
        assert!(inner.contains_key("span"));
        assert!(inner.contains_key(".big"));
        assert_eq!(sheet.get(outer).props.len(), 1);
    }

    #[test]
    fn test_parametric_and_hidden_blocks() {
        let sheet = parse_ok(".m(@a; @b: 2) { r: @a; } $hidden { x: 1; } .sel { .m(1); }");
        let root = sheet.root();
        let m = sheet.get(root.children[".m"]);
        assert_eq!(m.args.as_ref().map(Vec::len), Some(2));
        assert!(root.children.contains_key("$hidden"));
        // only .sel is emitted
        assert_eq!(root.props.len(), 1);

        let sel = sheet.get(root.children[".sel"]);
        assert_eq!(
            sel.props,
            vec![Prop::Mixin {
                path: vec![".m".into()],
                args: vec![Value::number(1.0)]
            }]
        );
    }

    #[test]
    fn test_at_rules() {
        let sheet = parse_ok(
            "@charset \"utf-8\";\n@media screen and (max-width: 100px) { a { b: c; } }\n\
             @-webkit-keyframes spin { from { x: 0; } 50%, to { x: 1; } }\n\
             @font-face { font-family: X; }",
        );
        let root = sheet.root();
        assert!(matches!(root.props[0], Prop::Charset(_)));

        let Prop::Block(media) = root.props[1] else {
            panic!("expected media block");
        };
        assert_eq!(
            sheet.get(media).special,
            Special::Media("screen and (max-width: 100px)".into())
        );

        let Prop::Block(frames) = root.props[2] else {
            panic!("expected keyframes block");
        };
        let frames = sheet.get(frames);
        assert_eq!(
            frames.special,
            Special::Keyframes {
                prefix: "-webkit-".into(),
                name: Value::keyword("spin")
            }
        );
        assert_eq!(frames.props.len(), 2);
        assert!(frames.children.contains_key("50%"));

        let Prop::Block(font) = root.props[3] else {
            panic!("expected font-face block");
        };
        assert_eq!(sheet.get(font).special, Special::FontFace);
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = parse("a { b: c; }\n\n???\n").unwrap_err();
        match err {
            CompileError::Syntax { line, text, .. } => {
                assert_eq!(line, 3);
                assert_eq!(text, "???");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            parse(".a { color: red;"),
            Err(CompileError::UnclosedBlock { .. })
        ));
        assert!(matches!(parse("a: b; }"), Err(CompileError::Syntax { .. })));
    }

    #[test]
    fn test_import_modes() {
        let sheet = parse_ok("@import \"a.less\";\n@import url(b.css) screen;");
        assert_eq!(
            sheet.root().props,
            vec![
                Prop::Import("@import \"a.less\";".into()),
                Prop::Import("@import url(b.css) screen;".into()),
            ]
        );

        let mut parser = Parser::new(ImportMode::Disabled);
        parser.parse_source("@import 'a';", None).unwrap();
        assert_eq!(
            parser.finish().0.root().props,
            vec![Prop::Raw(IMPORT_DISABLED.into())]
        );
    }

    #[test]
    fn test_import_parses_in_place() {
        let mut files = HashMap::new();
        files.insert("mixins.less".to_string(), ".m { color: red; }".to_string());
        let mut parser = Parser::new(ImportMode::Resolve(&files));
        parser
            .parse_source(".wrap { @import \"mixins\"; }", None)
            .unwrap();
        let (sheet, imported) = parser.finish();

        assert_eq!(imported, vec![PathBuf::from("mixins.less")]);
        let wrap = sheet.get(sheet.root().children[".wrap"]);
        assert!(wrap.children.contains_key(".m"));
    }

    #[test]
    fn test_imported_syntax_error_names_file() {
        let mut files = HashMap::new();
        files.insert("bad.less".to_string(), "a {\n  ???\n}".to_string());
        let mut parser = Parser::new(ImportMode::Resolve(&files));
        let err = parser.parse_source("@import 'bad.less';", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error: failed to parse line 2 of bad.less: `???`"
        );
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("960px").unwrap(), Value::with_unit(960.0, "px"));
        assert!(parse_value("1px }").is_err());
    }
}
