use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use lessc::{CompileError, Compiler, ImportResolver, Result};

fn memory(files: &[(&str, &str)]) -> Box<HashMap<String, String>> {
    Box::new(
        files
            .iter()
            .map(|(path, text)| (path.to_string(), text.to_string()))
            .collect(),
    )
}

/// Counts lookups and never finds anything.
struct Counting(Rc<Cell<usize>>);

impl ImportResolver for Counting {
    fn resolve(&self, _raw: &str) -> Result<Option<(PathBuf, String)>> {
        self.0.set(self.0.get() + 1);
        Ok(None)
    }
}

#[test]
fn test_import_is_parsed_in_place() {
    let mut compiler = Compiler::new();
    compiler.set_importer(memory(&[("vars.less", "@accent: red;\n.r { radius: 2px; }")]));

    let css = compiler
        .compile("@import \"vars\";\na { color: @accent; .r; }")
        .unwrap();
    assert_eq!(css, ".r { radius:2px; }\na {\n  color:red;\n  radius:2px;\n}\n");
    assert_eq!(compiler.imported_files(), &[PathBuf::from("vars.less")]);
}

#[test]
fn test_import_inside_block() {
    let mut compiler = Compiler::new();
    compiler.set_importer(memory(&[("inner.less", "b: c;\nd { e: f; }")]));

    let css = compiler.compile(".x { @import 'inner'; }").unwrap();
    assert_eq!(css, ".x { b:c; }\n.x d { e:f; }\n");
}

#[test]
fn test_nested_imports() {
    let mut compiler = Compiler::new();
    compiler.set_importer(memory(&[
        ("a.less", "@import \"b\";\nx { y: @from-b; }"),
        ("b.less", "@from-b: 1px;"),
    ]));

    assert_eq!(compiler.compile("@import 'a';").unwrap(), "x { y:1px; }\n");
    assert_eq!(
        compiler.imported_files(),
        &[PathBuf::from("a.less"), PathBuf::from("b.less")]
    );
}

#[test]
fn test_passthrough_imports() {
    let mut compiler = Compiler::new();
    compiler.set_importer(memory(&[("print.less", "a { b: c; }")]));

    let source = "@import \"missing\";\n@import url(\"theme.css\");\n@import 'print' print;";
    assert_eq!(
        compiler.compile(source).unwrap(),
        "@import \"missing\";\n@import url(\"theme.css\");\n@import 'print' print;\n"
    );
    assert!(compiler.imported_files().is_empty());
}

#[test]
fn test_disabled_imports_never_resolve() {
    let calls = Rc::new(Cell::new(0));
    let mut compiler = Compiler::new();
    compiler.set_importer(Box::new(Counting(calls.clone())));
    compiler.set_import_disabled(true);

    let css = compiler.compile("@import \"a\";\n@import 'b.css';").unwrap();
    assert_eq!(css, "/* import disabled */\n/* import disabled */\n");
    assert_eq!(calls.get(), 0);

    compiler.set_import_disabled(false);
    compiler.compile("@import \"a\";").unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_imported_syntax_error_names_the_file() {
    let mut compiler = Compiler::new();
    compiler.set_importer(memory(&[("broken.less", "a {\n  %%%\n}")]));

    let err = compiler.compile("@import 'broken';").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Syntax { line: 2, ref file, .. } if file.as_deref() == Some("broken.less")
    ));
}

#[test]
fn test_imported_file_must_close_its_blocks() {
    let mut compiler = Compiler::new();
    compiler.set_importer(memory(&[("open.less", "a {")]));

    let err = compiler.compile("@import 'open';\n}").unwrap_err();
    assert!(matches!(err, CompileError::UnclosedBlock { .. }));
}

#[test]
fn test_filesystem_import_dirs() {
    let dir = std::env::temp_dir().join(format!("lessc-imports-{}", std::process::id()));
    fs::create_dir_all(dir.join("lib")).unwrap();
    fs::write(dir.join("lib").join("grid.less"), "@cols: 12;").unwrap();

    let mut compiler = Compiler::new();
    compiler.add_import_dir(dir.join("missing"));
    compiler.add_import_dir(dir.join("lib"));

    let css = compiler.compile("@import \"grid\";\n.row { n: @cols; }").unwrap();
    assert_eq!(css, ".row { n:12; }\n");
    assert_eq!(compiler.imported_files(), &[dir.join("lib").join("grid.less")]);
}
