// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end runs of the preprocessor over temporary trees.
//!
//! Each test lays out a `src/` tree, points [`Options`] at it with an
//! `out/` target next to it, runs [`Preprocessor`] and inspects what was
//! written.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use sieve_diagnostic::ErrorKind;
use sievec::{load_configs, Options, Preprocessor, RunStats};
use tempfile::TempDir;

struct Tree {
    dir: TempDir,
}

impl Tree {
    fn new(files: &[(&str, &str)]) -> Self {
        let tree = Tree {
            dir: tempfile::tempdir().unwrap(),
        };
        for (path, text) in files {
            tree.write(path, text.as_bytes());
        }
        tree
    }

    fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn write(&self, relative: &str, bytes: &[u8]) {
        let path = self.src().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn options(&self, flags: &[&str]) -> Options {
        let mut options = Options {
            sources: vec![self.src()],
            target: self.out(),
            ..Options::default()
        };
        options.apply_all(flags).unwrap();
        options
    }

    fn output(&self, relative: &str) -> String {
        fs::read_to_string(self.out().join(relative)).unwrap()
    }

    fn has_output(&self, relative: &str) -> bool {
        self.out().join(relative).exists()
    }
}

fn run(options: &Options) -> RunStats {
    Preprocessor::new(options).run().unwrap()
}

const DEBUG_EXAMPLE: &str = "//#if DEBUG\nA\n//#else\nB\n//#endif\n";

// Classification

#[test]
fn test_files_are_classified_by_extension() {
    let tree = Tree::new(&[("A.java", DEBUG_EXAMPLE), ("notes.bak", "old\n")]);
    let image = [0x89, b'P', b'N', b'G', 0x00, 0xff, b'\n'];
    tree.write("img/logo.png", &image);

    let stats = run(&tree.options(&["-D", "DEBUG", "--excluded=bak"]));

    assert_eq!(tree.output("A.java"), "A\n");
    assert_eq!(fs::read(tree.out().join("img/logo.png")).unwrap(), image);
    assert!(!tree.has_output("notes.bak"));
    assert_eq!(
        (stats.preprocessed, stats.copied, stats.excluded),
        (1, 1, 1)
    );
}

#[test]
fn test_debug_false_selects_else_branch() {
    let tree = Tree::new(&[("A.java", DEBUG_EXAMPLE)]);
    run(&tree.options(&["-DDEBUG=false"]));
    assert_eq!(tree.output("A.java"), "B\n");
}

#[test]
fn test_globals_carry_across_files_in_path_order() {
    let tree = Tree::new(&[
        ("a.java", "//#global answer = 6 * 7\n"),
        ("b.java", "int answer = /*$ answer $*/;\n"),
    ]);
    run(&tree.options(&[]));
    assert_eq!(tree.output("a.java"), "");
    assert_eq!(tree.output("b.java"), "int answer = 42;\n");
}

#[test]
fn test_excluded_folders_are_not_visited() {
    let tree = Tree::new(&[
        ("keep/A.java", "a\n"),
        ("build/tmp/B.java", "b\n"),
        ("gen/C.java", "c\n"),
    ]);
    let stats = run(&tree.options(&["--exclude-folder=gen", "--exclude-folder=**/tmp"]));
    assert!(tree.has_output("keep/A.java"));
    assert!(!tree.has_output("build/tmp/B.java"));
    assert!(!tree.has_output("gen/C.java"));
    assert_eq!(stats.preprocessed, 1);
}

// Exclusion pre-pass

#[test]
fn test_excludeif_uses_run_globals() {
    let tree = Tree::new(&[
        ("Web.java", "//#excludeif TARGET == \"web\"\nweb only\n"),
        ("Desktop.java", "//#excludeif TARGET == \"desktop\"\ndesktop only\n"),
    ]);
    let stats = run(&tree.options(&["-DTARGET=web"]));

    assert!(!tree.has_output("Web.java"));
    assert_eq!(tree.output("Desktop.java"), "desktop only\n");
    assert_eq!((stats.preprocessed, stats.excluded), (1, 1));
}

#[test]
fn test_excludeif_error_carries_position() {
    let tree = Tree::new(&[("A.java", "x\n//#excludeif 1 / 0 == 1\n")]);
    let err = Preprocessor::new(&tree.options(&[])).run().unwrap_err();
    assert_eq!(err.kind, ErrorKind::ArithmeticFault);
    let frame = err.position().unwrap();
    assert_eq!(frame.line, 2);
    assert!(frame.file.ends_with("A.java"));
}

// Output options

#[test]
fn test_dry_run_writes_nothing() {
    let tree = Tree::new(&[("A.java", "a\n"), ("logo.png", "png")]);
    let stats = run(&tree.options(&["--dry-run"]));
    assert!(!tree.out().exists());
    assert_eq!((stats.preprocessed, stats.copied), (1, 1));
}

#[test]
fn test_clear_removes_stale_output() {
    let tree = Tree::new(&[("A.java", "a\n")]);
    fs::create_dir_all(tree.out()).unwrap();
    fs::write(tree.out().join("stale.java"), "old").unwrap();

    run(&tree.options(&["--clear"]));
    assert!(!tree.has_output("stale.java"));
    assert_eq!(tree.output("A.java"), "a\n");
}

#[test]
fn test_clear_refuses_target_containing_sources() {
    let tree = Tree::new(&[("A.java", "a\n")]);
    let mut options = tree.options(&["--clear"]);
    options.target = tree.dir.path().to_path_buf();

    let err = Preprocessor::new(&options).run().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert!(tree.src().join("A.java").exists());
}

#[test]
fn test_skip_unchanged_leaves_identical_files() {
    let tree = Tree::new(&[("A.java", "a /*$ 1 + 1 $*/\n"), ("logo.png", "png")]);
    let options = tree.options(&["--skip-unchanged"]);

    let first = run(&options);
    assert_eq!(first.unchanged, 0);
    let second = run(&options);
    assert_eq!(second.unchanged, 2);
    assert_eq!(tree.output("A.java"), "a 2\n");

    tree.write("A.java", b"a /*$ 2 + 2 $*/\n");
    let third = run(&options);
    assert_eq!(third.unchanged, 1);
    assert_eq!(tree.output("A.java"), "a 4\n");
}

#[test]
fn test_outname_and_outdir_redirect_output() {
    let tree = Tree::new(&[(
        "pkg/A.java",
        "//#outdir \"gen/web\"\n//#outname \"Renamed.java\"\nbody\n",
    )]);
    run(&tree.options(&[]));
    assert!(!tree.has_output("pkg/A.java"));
    assert_eq!(tree.output("gen/web/Renamed.java"), "body\n");
}

#[test]
fn test_keep_lines_preserves_line_numbers() {
    let tree = Tree::new(&[("A.java", DEBUG_EXAMPLE)]);
    run(&tree.options(&["-DDEBUG", "--keep-lines"]));
    let output = tree.output("A.java");
    assert_eq!(output.lines().count(), DEBUG_EXAMPLE.lines().count());
    assert_eq!(output.lines().nth(1), Some("A"));
}

// Comments

#[test]
fn test_comment_removal_applies_to_output() {
    let source = "String u = \"http://x\"; // note\n/* block */int b;\n";
    let tree = Tree::new(&[("A.java", source)]);

    run(&tree.options(&["--comments=remove"]));
    assert_eq!(tree.output("A.java"), "String u = \"http://x\"; \nint b;\n");

    run(&tree.options(&["--comments=keep"]));
    assert_eq!(tree.output("A.java"), source);
}

#[test]
fn test_remove_directives_strips_placeholders() {
    let tree = Tree::new(&[("A.java", "//#if false\nx\n//#endif\ny // keep\n")]);
    run(&tree.options(&["--keep-lines", "--comments=remove-directives"]));
    assert_eq!(tree.output("A.java"), "\n\n\ny // keep\n");
}

// Config files and extensions

#[test]
fn test_config_file_sets_flags_and_globals() {
    let tree = Tree::new(&[("A.java", "//#if MODE == 2\nv=/*$ NAME $*/\n//#endif\n")]);
    let config = tree.dir.path().join("sieve.cfg");
    fs::write(
        &config,
        "# build settings\n--keep-lines\n\nMODE = 1 + 1\nNAME = \"m\" + MODE\n",
    )
    .unwrap();

    let flag = format!("--config={}", config.display());
    let mut options = tree.options(&[flag.as_str()]);
    load_configs(&mut options).unwrap();
    assert!(options.keep_lines);

    run(&options);
    assert_eq!(tree.output("A.java"), "//> //#if MODE == 2\nv=m2\n//> //#endif\n");
}

#[test]
fn test_duplicate_definition_fails() {
    let tree = Tree::new(&[("A.java", "a\n")]);
    let err = Preprocessor::new(&tree.options(&["-DX=1", "-DX=2"]))
        .run()
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
}

#[test]
fn test_log_extension_user_function() {
    let tree = Tree::new(&[("A.java", "//#action \"hello\", 1\nv=/*$ $log(3) $*/\n")]);
    run(&tree.options(&["--extension=log"]));
    assert_eq!(tree.output("A.java"), "v=3\n");
}

#[test]
fn test_unknown_as_false() {
    let tree = Tree::new(&[("A.java", "//#if MISSING\nyes\n//#else\nno\n//#endif\n")]);
    let err = Preprocessor::new(&tree.options(&[])).run().unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownVariable);

    run(&tree.options(&["--unknown-as-false"]));
    assert_eq!(tree.output("A.java"), "no\n");
}

// Failures

#[test]
fn test_unclosed_block_aborts_run() {
    let tree = Tree::new(&[("A.java", "a\n//#if true\nb\n")]);
    let err = Preprocessor::new(&tree.options(&[])).run().unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnclosedBlock);
    assert_eq!(err.position().unwrap().line, 2);
    assert!(err.to_string().contains("A.java:2"));
}

#[test]
fn test_error_inside_include_names_the_chain() {
    let tree = Tree::new(&[
        ("Main.java", "top\n//#include \"parts/part.txt\"\n"),
        ("parts/part.txt", "ok\n/*$ 1 + true $*/\n"),
    ]);
    let options = Options {
        excluded: vec!["txt".to_string()],
        ..tree.options(&[])
    };
    let err = Preprocessor::new(&options).run().unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
    assert_eq!(err.chain.len(), 2);
    assert!(err.chain[0].file.ends_with(Path::new("parts/part.txt")));
    assert_eq!(err.chain[0].line, 2);
    assert!(err.chain[1].file.ends_with("Main.java"));
    assert_eq!(err.chain[1].line, 2);
}

#[test]
fn test_cancelled_before_start() {
    let tree = Tree::new(&[("A.java", "a\n")]);
    let options = tree.options(&[]);
    let token = sieve_directive::CancelToken::new();
    token.cancel();
    let err = Preprocessor::new(&options)
        .cancel_token(token)
        .run()
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert!(!tree.has_output("A.java"));
}
