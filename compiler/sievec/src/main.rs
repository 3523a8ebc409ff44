//! Sieve preprocessor CLI

use std::process::ExitCode;

use sievec::{init_tracing, load_configs, parse_args, set_verbose, Command, Preprocessor};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut options = match parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("Run 'sieve --help' for the list of options.");
            return ExitCode::from(2);
        }
    };

    init_tracing(options.verbose);
    let verbose = options.verbose;
    if let Err(err) = load_configs(&mut options) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    if options.verbose != verbose {
        set_verbose(options.verbose);
    }

    match Preprocessor::new(&options).run() {
        Ok(stats) => {
            if options.dry_run {
                println!("dry run: {stats}");
            } else {
                println!("{stats}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("Sieve - comment-carried source preprocessor");
    println!();
    println!("Usage: sieve [options]");
    println!();
    println!("Options:");
    println!("  --source=DIR               Source root, repeatable (default: .)");
    println!("  --target=DIR               Destination root (default: ./preprocessed)");
    println!("  --extensions=LIST          Extensions to preprocess (default: java,txt,htm,html,xml,rs,c,cpp,h,js,kt)");
    println!("  --excluded=LIST            Extensions to ignore entirely");
    println!("  --in-charset=NAME          Input encoding (UTF-8 only)");
    println!("  --out-charset=NAME         Output encoding (UTF-8 only)");
    println!("  --comments=MODE            keep, remove or remove-directives (default: keep)");
    println!("  --keep-lines               Replace suppressed lines with placeholders");
    println!("  --allow-whitespace         Accept whitespace between // and #");
    println!("  --unknown-as-false         Unknown variables evaluate to false");
    println!("  --skip-unknown-directives  Pass unknown directives through with a warning");
    println!("  --clear                    Remove the destination root first");
    println!("  --skip-unchanged           Leave byte-identical destinations untouched");
    println!("  --dry-run                  Run everything but write nothing");
    println!("  --exclude-folder=PATTERN   Skip matching folders (*, ?, **), repeatable");
    println!("  --extension=NAME           Register a built-in extension (log)");
    println!("  -D NAME[=VALUE]            Define a global variable, repeatable");
    println!("  --config=FILE              Read options and globals from FILE, repeatable");
    println!("  -v, --verbose              Debug logging (RUST_LOG overrides)");
    println!("  -h, --help                 Show this help message");
}
