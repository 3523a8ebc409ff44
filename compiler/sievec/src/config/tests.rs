use super::*;
use pretty_assertions::assert_eq;
use sieve_diagnostic::ErrorKind;

fn context() -> Context {
    Context::builder().build()
}

#[test]
fn test_flags_and_definitions() {
    let mut options = Options::default();
    let text = "\
# release settings

--keep-lines --comments=remove
-D LEGACY
target = \"web\"
answer=40 + 2
";
    apply_config(&mut options, Path::new("sieve.cfg"), text).unwrap();

    assert!(options.keep_lines);
    assert_eq!(options.comments, sieve_comments::CommentPolicy::RemoveAll);
    assert_eq!(options.definitions.len(), 3);
    assert_eq!(options.definitions[0].source, DefinitionSource::CommandLine);
    assert_eq!(
        options.definitions[1],
        Definition {
            name: "target".to_string(),
            value: Some("\"web\"".to_string()),
            source: DefinitionSource::ConfigFile(Frame::new("sieve.cfg", 5)),
        }
    );

    let mut ctx = context();
    define_globals(&mut ctx, &options.definitions).unwrap();
    let globals = ctx.variables();
    assert_eq!(globals.global("legacy").map(ToString::to_string).as_deref(), Some("true"));
    assert_eq!(globals.global("target").map(ToString::to_string).as_deref(), Some("web"));
    assert_eq!(globals.global("answer").map(ToString::to_string).as_deref(), Some("42"));
}

#[test]
fn test_definitions_see_earlier_globals() {
    let mut options = Options::default();
    apply_config(&mut options, Path::new("a.cfg"), "base=2\ndouble=base*2\n").unwrap();
    let mut ctx = context();
    define_globals(&mut ctx, &options.definitions).unwrap();
    assert_eq!(
        ctx.variables().global("double").map(ToString::to_string).as_deref(),
        Some("4")
    );
}

#[test]
fn test_command_line_values_are_literals() {
    let mut options = Options::default();
    options.apply_all(&["-DLEVEL=3", "-DNAME=hello world", "-DQ=\"x\""]).unwrap();
    let mut ctx = context();
    define_globals(&mut ctx, &options.definitions).unwrap();
    let text = ctx
        .process_text(
            Path::new("a.java"),
            "/*$ LEVEL + 1 $*/ /*$ NAME $*/ /*$ Q $*/\n",
        )
        .unwrap()
        .text;
    assert_eq!(text, "4 hello world x\n");
}

#[test]
fn test_reserved_at_sign() {
    let err = apply_config(&mut Options::default(), Path::new("a.cfg"), "\n@include x\n")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(err.chain, vec![Frame::new("a.cfg", 2)]);
    assert_eq!(err.source_line.as_deref(), Some("@include x"));
}

#[test]
fn test_malformed_lines() {
    let mut options = Options::default();
    for text in ["just words", "1x=3", "--bogus"] {
        let err = apply_config(&mut options, Path::new("a.cfg"), text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config, "{text}");
    }
}

#[test]
fn test_duplicate_global_is_an_error() {
    let mut options = Options::default();
    options.apply_all(&["-DX=1"]).unwrap();
    apply_config(&mut options, Path::new("a.cfg"), "x=2\n").unwrap();
    let err = define_globals(&mut context(), &options.definitions).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(err.chain, vec![Frame::new("a.cfg", 1)]);
}

#[test]
fn test_evaluation_error_is_located() {
    let mut options = Options::default();
    apply_config(&mut options, Path::new("a.cfg"), "# c\nbad = 1 / 0\n").unwrap();
    let err = define_globals(&mut context(), &options.definitions).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ArithmeticFault);
    assert_eq!(err.chain, vec![Frame::new("a.cfg", 2)]);
}

#[test]
fn test_load_configs_follows_nested_files() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner.cfg");
    let outer = dir.path().join("outer.cfg");
    std::fs::write(&inner, "--dry-run\n").unwrap();
    std::fs::write(&outer, format!("--config={}\nx=1\n", inner.display())).unwrap();

    let mut options = Options::default();
    options.configs.push(outer.clone());
    load_configs(&mut options).unwrap();
    assert!(options.dry_run);
    assert_eq!(options.definitions.len(), 1);

    let mut looping = Options::default();
    std::fs::write(&inner, format!("--config={}\n", outer.display())).unwrap();
    looping.configs.push(outer);
    assert_eq!(load_configs(&mut looping).unwrap_err().kind, ErrorKind::Config);
}

#[test]
fn test_missing_config_file() {
    let mut options = Options::default();
    options.configs.push(PathBuf::from("/definitely/not/here.cfg"));
    assert_eq!(
        load_configs(&mut options).unwrap_err().kind,
        ErrorKind::MissingResource
    );
}
