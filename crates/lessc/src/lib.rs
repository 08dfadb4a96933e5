//! # lessc - LESS to CSS compiler
//!
//! A compiler for a CSS superset with variables, nesting, parametric mixins,
//! arithmetic and color math. It produces plain CSS text.
//!
//! The crate provides:
//!
//! - **Parsing**: source text into a block tree ([`parser`])
//! - **Compilation**: scopes, reduction, selector multiplication and mixin
//!   inlining ([`compiler`])
//! - **Formatting**: classic, less.js-style or compressed output ([`format`])
//!
//! ## Quick Start
//!
//! ```rust
//! let css = lessc::compile(
//!     r#"
//!     @base: #336699;
//!     .border(@width: 2px) { border: @width solid @base; }
//!
//!     #header {
//!         .border(1px);
//!         a { color: @base + #111; }
//!     }
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     css,
//!     "#header { border:1px solid #336699; }\n#header a { color:#4477aa; }\n"
//! );
//! ```
//!
//! ## Supported Features
//!
//! ### Variables
//! - `@name: value;` at any level, block scoped
//! - Self reference reads the previous binding: `@a: @a + 1;`
//! - Interpolation inside strings: `"{@name}"`
//!
//! ### Nesting
//! - Nested rules multiply their selectors with the parent's
//! - `&` and `:` attach to the parent selector
//!
//! ### Mixins
//! - Any block can be invoked: `.rounded;`, `#ns > .button;`
//! - Parametric mixins with defaults: `.m(@a; @b: 2) { ... }`
//! - Blocks whose tags start with `$` are hidden from output
//! - Accessors read a block's values: `.defaults['@width']`
//!
//! ### Operations
//! - `+ - * / %` on numbers with units and on colors
//! - Color functions: `darken`, `lighten`, `saturate`, `desaturate`, `spin`,
//!   `fadein`, `fadeout`, `hue`, `saturation`, `lightness`, `alpha`
//!
//! ### At-rules
//! - `@media`, `@font-face`, `@charset`, `@keyframes` (vendor prefixed too)
//! - `@import` of other sources, resolved through an [`ImportResolver`]
//!
//! ## Not Yet Implemented
//!
//! - Mixin guards (`when (...)`)
//!
//! ## Modules
//!
//! - [`parser`]: scanner and grammar
//! - [`compiler`]: the [`Compiler`] and value reduction
//! - [`types`]: values, colors and the block tree
//! - [`format`]: CSS node tree and formatters
//! - [`import`]: import resolution
//! - [`error`]: error types

pub mod compiler;
pub mod error;
pub mod format;
pub mod import;
pub mod parser;
pub mod types;

pub use compiler::Compiler;
pub use error::{CompileError, Result};
pub use format::{CssNode, Formatter};
pub use import::{FsImporter, ImportResolver};
pub use types::{Color, Value};

/// Compiles `source` with default settings. Imports are resolved relative to
/// the working directory.
pub fn compile(source: &str) -> Result<String> {
    Compiler::new().compile(source)
}
