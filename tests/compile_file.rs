use std::fs;
use std::path::PathBuf;

use lessc_rs::{CompileError, Compiler, LesscError, compile_file};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lessc-rs-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_imports_resolve_next_to_the_file() {
    let dir = scratch_dir("siblings");
    fs::write(dir.join("colors.less"), "@accent: #336699;").unwrap();
    fs::write(
        dir.join("main.less"),
        "@import \"colors\";\na { color: @accent; }\n",
    )
    .unwrap();

    let mut compiler = Compiler::new();
    let css = compile_file(&mut compiler, dir.join("main.less")).unwrap();

    assert_eq!(css, "a { color:#336699; }\n");
    assert_eq!(compiler.imported_files(), &[dir.join("colors.less")]);
    // the file's directory is only used for that compile
    assert!(compiler.import_dirs().is_empty());
}

#[test]
fn test_syntax_errors_name_the_file() {
    let dir = scratch_dir("syntax");
    let file = dir.join("broken.less");
    fs::write(&file, "a { color: red; }\n%%%\n").unwrap();

    let mut compiler = Compiler::new();
    let err = compile_file(&mut compiler, &file).unwrap_err();

    match err {
        LesscError::Compile(CompileError::Syntax { line, file: name, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(name, Some(file.display().to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let mut compiler = Compiler::new();
    let err = compile_file(&mut compiler, "/definitely/not/here.less").unwrap_err();
    assert!(matches!(err, LesscError::Io(_)));
}
