//! Code generation.
//!
//! [`Compiler`] drives a compile: it parses the source (resolving imports),
//! walks the block tree with a [`Scope`], reduces every property value,
//! multiplies nested selectors and inlines mixins, then hands the resulting
//! [`CssNode`] tree to the configured [`Formatter`].
//!
//! ## Example
//!
//! ```rust
//! use lessc::Compiler;
//!
//! let mut compiler = Compiler::new();
//! let css = compiler
//!     .compile_with_vars(
//!         ".magic { color: @color; width: @base - 200; }",
//!         &[("color", "red"), ("base", "960px")],
//!     )
//!     .unwrap();
//! assert_eq!(css, ".magic {\n  color:red;\n  width:760px;\n}\n");
//! ```

pub mod functions;
mod mixins;
pub mod reduce;
pub mod scope;

pub use functions::FunctionRegistry;
pub use reduce::evaluate;
pub use scope::Scope;

use std::path::PathBuf;

use crate::error::Result;
use crate::format::{CssNode, Formatter};
use crate::import::{FsImporter, ImportResolver};
use crate::parser::{parse_value, ImportMode, Parser};
use crate::types::{Block, BlockId, Prop, Special, Stylesheet, Value};

/// A configured compiler. Settings persist across calls to
/// [`Compiler::compile`]; nothing else does.
pub struct Compiler {
    formatter: Formatter,
    import_dirs: Vec<PathBuf>,
    importer: Option<Box<dyn ImportResolver>>,
    import_disabled: bool,
    file_name: Option<String>,
    functions: FunctionRegistry,
    imported_files: Vec<PathBuf>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            formatter: Formatter::default(),
            import_dirs: Vec::new(),
            importer: None,
            import_disabled: false,
            file_name: None,
            functions: FunctionRegistry::default(),
            imported_files: Vec::new(),
        }
    }

    pub fn formatter(&self) -> Formatter {
        self.formatter
    }

    pub fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }

    /// Directories searched by the filesystem importer.
    pub fn import_dirs(&self) -> &[PathBuf] {
        &self.import_dirs
    }

    pub fn set_import_dirs<I, P>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.import_dirs = dirs.into_iter().map(Into::into).collect();
    }

    pub fn add_import_dir(&mut self, dir: impl Into<PathBuf>) {
        self.import_dirs.push(dir.into());
    }

    /// Replaces the filesystem importer; import dirs are then ignored.
    pub fn set_importer(&mut self, importer: Box<dyn ImportResolver>) {
        self.importer = Some(importer);
    }

    /// When disabled, every `@import` becomes `/* import disabled */` and no
    /// importer is consulted.
    pub fn set_import_disabled(&mut self, disabled: bool) {
        self.import_disabled = disabled;
    }

    /// Name reported in syntax errors.
    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = Some(name.into());
    }

    /// Makes `name(...)` call `f`. See [`FunctionRegistry::register`].
    pub fn register_function<F, R>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value) -> R + 'static,
        R: Into<Value>,
    {
        self.functions.register(name, f);
    }

    /// Removes a registered or built-in function; calls to it are then
    /// written out unchanged.
    pub fn unregister_function(&mut self, name: &str) {
        self.functions.unregister(name);
    }

    /// Files pulled in by imports during the last compile.
    pub fn imported_files(&self) -> &[PathBuf] {
        &self.imported_files
    }

    pub fn compile(&mut self, source: &str) -> Result<String> {
        self.compile_with_vars(source, &[])
    }

    /// Compiles with extra root variables, given without `@` (a leading `@`
    /// is accepted) and parsed as property values.
    pub fn compile_with_vars(&mut self, source: &str, vars: &[(&str, &str)]) -> Result<String> {
        let nodes = self.compile_nodes(source, vars)?;
        Ok(self.formatter.format(&nodes))
    }

    /// Compiles to the node tree without formatting it.
    pub fn compile_nodes(&mut self, source: &str, vars: &[(&str, &str)]) -> Result<Vec<CssNode>> {
        let fs_importer;
        let mode = if self.import_disabled {
            ImportMode::Disabled
        } else if let Some(importer) = &self.importer {
            ImportMode::Resolve(importer.as_ref())
        } else {
            fs_importer = FsImporter::new(self.import_dirs.clone());
            ImportMode::Resolve(&fs_importer)
        };

        let mut parser = Parser::new(mode);
        parser.parse_source(source, self.file_name.clone())?;
        let (sheet, imported) = parser.finish();
        self.imported_files = imported;
        log::debug!("parsed {} blocks", sheet.len());

        let mut scope = Scope::new();
        for (name, raw) in vars {
            scope.set(name.trim_start_matches('@'), parse_value(raw)?);
        }

        let mut context = Context {
            sheet: &sheet,
            scope,
            functions: &self.functions,
            resolving: Vec::new(),
            resolve_floor: 0,
            lookups: Vec::new(),
        };
        context.compile_root()
    }
}

/// Blocks searched when resolving a mixin path, innermost first. Inlining a
/// mixin compiles its props with the mixin's block in front of the caller's
/// chain, so the mixin sees its own children and then the caller's.
#[derive(Clone, Copy)]
pub(crate) struct Chain<'c> {
    block: BlockId,
    outer: Option<&'c Chain<'c>>,
}

impl<'c> Chain<'c> {
    fn root() -> Self {
        Self {
            block: Stylesheet::ROOT,
            outer: None,
        }
    }

    fn enter(&'c self, block: BlockId) -> Chain<'c> {
        Chain {
            block,
            outer: Some(self),
        }
    }

    fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        std::iter::successors(Some(self), |chain| chain.outer).map(|chain| chain.block)
    }
}

/// What compiling a list of props produced: lines for the enclosing rule,
/// and nested rules that follow it.
#[derive(Default)]
pub(crate) struct Output {
    lines: Vec<CssNode>,
    blocks: Vec<CssNode>,
}

pub(crate) struct Context<'a> {
    sheet: &'a Stylesheet,
    scope: Scope,
    functions: &'a FunctionRegistry,
    /// Variables being reduced, innermost last.
    resolving: Vec<String>,
    /// Start of the `resolving` entries that belong to the current lookup.
    resolve_floor: usize,
    /// Accessor lookups in progress.
    lookups: Vec<(BlockId, String)>,
}

impl Context<'_> {
    fn compile_root(&mut self) -> Result<Vec<CssNode>> {
        let sheet = self.sheet;
        let chain = Chain::root();
        let tags = [String::new()];
        let mut nodes = Vec::new();

        // root keeps document order between lines and rules
        for prop in &sheet.root().props {
            let mut out = Output::default();
            self.compile_prop(prop, &tags, &chain, &mut out)?;
            nodes.append(&mut out.lines);
            nodes.append(&mut out.blocks);
        }
        Ok(nodes)
    }

    fn compile_block(
        &mut self,
        id: BlockId,
        parent_tags: &[String],
        chain: &Chain,
    ) -> Result<Vec<CssNode>> {
        let sheet = self.sheet;
        let block = sheet.get(id);
        let chain = chain.enter(id);

        self.scope.push();
        let result = self.compile_block_in_scope(block, parent_tags, &chain);
        self.scope.pop();
        result
    }

    fn compile_block_in_scope(
        &mut self,
        block: &Block,
        parent_tags: &[String],
        chain: &Chain,
    ) -> Result<Vec<CssNode>> {
        let mut out = Output::default();

        let header = match &block.special {
            Special::None | Special::KeyframeStep => {
                let selectors = if block.special == Special::KeyframeStep {
                    block.tags.clone()
                } else {
                    multiply(parent_tags, &block.tags)
                };
                self.compile_props(block, &selectors, chain, &mut out)?;

                let mut nodes = Vec::new();
                if !out.lines.is_empty() {
                    nodes.push(CssNode::Rule {
                        selectors,
                        body: out.lines,
                    });
                }
                nodes.append(&mut out.blocks);
                return Ok(nodes);
            }
            Special::FontFace => "@font-face".to_string(),
            Special::Media(query) => format!("@media {query}"),
            Special::Keyframes { prefix, name } => {
                let name = self.reduce(name, chain)?;
                format!("@{prefix}keyframes {name}")
            }
        };

        self.compile_props(block, parent_tags, chain, &mut out)?;
        let mut children = out.lines;
        children.append(&mut out.blocks);
        if children.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![CssNode::Group { header, children }])
    }

    fn compile_props(
        &mut self,
        block: &Block,
        tags: &[String],
        chain: &Chain,
        out: &mut Output,
    ) -> Result<()> {
        for prop in &block.props {
            self.compile_prop(prop, tags, chain, out)?;
        }
        Ok(())
    }

    fn compile_prop(
        &mut self,
        prop: &Prop,
        tags: &[String],
        chain: &Chain,
        out: &mut Output,
    ) -> Result<()> {
        match prop {
            Prop::Assign { name, value } => match name.strip_prefix('@') {
                Some(var) => self.scope.set(var, value.clone()),
                None => {
                    let value = self.reduce(value, chain)?;
                    out.lines.push(CssNode::Property {
                        name: name.clone(),
                        value,
                    });
                }
            },
            Prop::Block(id) => {
                let nodes = self.compile_block(*id, tags, chain)?;
                out.blocks.extend(nodes);
            }
            Prop::Mixin { path, args } => self.inline_mixin(path, args, tags, chain, out)?,
            Prop::Raw(text) | Prop::Import(text) => out.lines.push(CssNode::Line(text.clone())),
            Prop::Charset(value) => {
                let value = self.reduce(value, chain)?;
                out.lines.push(CssNode::Line(format!("@charset {value};")));
            }
        }
        Ok(())
    }
}

/// Every parent tag combined with every child tag, parent-major. A child
/// starting with `&` or `:` attaches to the parent directly; `&` is dropped.
pub fn multiply(parents: &[String], tags: &[String]) -> Vec<String> {
    parents
        .iter()
        .flat_map(|parent| {
            tags.iter().map(move |tag| {
                let combined = if let Some(rest) = tag.strip_prefix('&') {
                    format!("{parent}{rest}")
                } else if tag.starts_with(':') {
                    format!("{parent}{tag}")
                } else {
                    format!("{parent} {tag}")
                };
                combined.trim().to_string()
            })
        })
        .collect()
}
