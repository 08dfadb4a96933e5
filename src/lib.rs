//! File-level entry points around the [`lessc`] compiler.
//!
//! ```no_run
//! use lessc_rs::{compile_file, Compiler};
//!
//! let mut compiler = Compiler::new();
//! let css = compile_file(&mut compiler, "styles/site.less").unwrap();
//! println!("{css}");
//! ```

pub mod error;
pub mod log_init;

use std::fs;
use std::path::Path;

pub use error::{LesscError, Result};
pub use lessc::{compile, CompileError, Compiler, Formatter};

/// Compiles the file at `path`. Syntax errors name the file, and imports are
/// looked up next to it before the compiler's own import dirs.
pub fn compile_file(compiler: &mut Compiler, path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    log::debug!("compiling {}", path.display());

    let saved_dirs = compiler.import_dirs().to_vec();
    let mut dirs = Vec::with_capacity(saved_dirs.len() + 1);
    dirs.push(path.parent().unwrap_or(Path::new("")).to_path_buf());
    dirs.extend(saved_dirs.iter().cloned());

    compiler.set_import_dirs(dirs);
    compiler.set_file_name(path.display().to_string());
    let result = compiler.compile(&source);
    compiler.set_import_dirs(saved_dirs);

    Ok(result?)
}
