use lessc::{CompileError, compile};

#[test]
fn test_color_arithmetic_clamps() {
    let css = compile("a { b: #ffffff + #000001; c: #000000 + #010101; }").unwrap();
    assert_eq!(css, "a {\n  b:#ffffff;\n  c:#010101;\n}\n");
}

#[test]
fn test_color_and_scalar() {
    let source = "@c: #333; a { b: @c * 2; c: @c - 10%; d: #fff / 2; }";
    // 10% of 255 is 25.5
    assert_eq!(
        compile(source).unwrap(),
        "a {\n  b:#666666;\n  c:#191919;\n  d:#7f7f7f;\n}\n"
    );
}

#[test]
fn test_translucent_colors() {
    let css = compile("a { b: rgba(10, 20, 30, 0.5) + #0a0a0a; }").unwrap();
    assert_eq!(css, "a { b:rgba(20,30,40,0.5); }\n");
}

#[test]
fn test_units() {
    let source = r#"
        @base: 960px;
        a {
            w: @base - 200;
            h: 2 * 3em;
            p: 50px * 10%;
            r: 7 % 4;
            m: -@base / 2;
        }
    "#;
    assert_eq!(
        compile(source).unwrap(),
        "a {\n  w:760px;\n  h:6em;\n  p:5px;\n  r:3;\n  m:-480px;\n}\n"
    );
}

#[test]
fn test_whitespace_decides_lists() {
    assert_eq!(compile("a { m: 10 -5; }").unwrap(), "a { m:10 -5; }\n");
    assert_eq!(compile("a { m: 10 - 5; }").unwrap(), "a { m:5; }\n");
    assert_eq!(compile("a { m: 10-5; }").unwrap(), "a { m:5; }\n");
    assert_eq!(compile("a { m: (10 -5) 1; }").unwrap(), "a { m:5 1; }\n");
}

#[test]
fn test_precedence() {
    let css = compile("@x: 2; a { b: 1 + @x * 3; c: (1 + @x) * 3; }").unwrap();
    assert_eq!(css, "a {\n  b:7;\n  c:9;\n}\n");
}

#[test]
fn test_string_concatenation() {
    let css = compile("@a: \"foo\"; a { b: @a + bar; c: x + 1; d: x - y; }").unwrap();
    assert_eq!(css, "a {\n  b:\"foobar\";\n  c:x1;\n  d:x y;\n}\n");
}

#[test]
fn test_division_by_zero() {
    let err = compile("a { b: 1 / 0; }").unwrap_err();
    assert!(matches!(err, CompileError::Arithmetic(_)));

    let err = compile("@z: 0; a { b: 10px % @z; }").unwrap_err();
    assert!(matches!(err, CompileError::Arithmetic(_)));
}
