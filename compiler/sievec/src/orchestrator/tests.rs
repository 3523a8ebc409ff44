use super::*;
use std::path::Path;

fn record(relative: &str) -> FileRecord {
    FileRecord::new(
        Path::new("src").join(relative),
        PathBuf::from(relative),
        FileFlags::empty(),
    )
}

#[test]
fn test_destination_mirrors_relative_path() {
    let output = FileOutput::default();
    assert_eq!(
        destination(Path::new("out"), &record("pkg/A.java"), &output),
        Path::new("out/pkg/A.java")
    );
    assert_eq!(
        destination(Path::new("out"), &record("A.java"), &output),
        Path::new("out/A.java")
    );
}

#[test]
fn test_destination_redirects() {
    let renamed = FileOutput {
        outname: Some("B.java".to_string()),
        ..FileOutput::default()
    };
    assert_eq!(
        destination(Path::new("out"), &record("pkg/A.java"), &renamed),
        Path::new("out/pkg/B.java")
    );

    let moved = FileOutput {
        outdir: Some("gen/web".to_string()),
        ..FileOutput::default()
    };
    assert_eq!(
        destination(Path::new("out"), &record("pkg/A.java"), &moved),
        Path::new("out/gen/web/A.java")
    );
}

#[test]
fn test_stats_display() {
    let stats = RunStats {
        preprocessed: 3,
        copied: 2,
        excluded: 1,
        unchanged: 0,
        elapsed: Duration::from_millis(12),
    };
    assert_eq!(stats.to_string(), "3 preprocessed, 2 copied, 1 excluded in 12ms");

    let stats = RunStats {
        unchanged: 2,
        ..stats
    };
    assert_eq!(
        stats.to_string(),
        "3 preprocessed, 2 copied, 1 excluded (2 unchanged) in 12ms"
    );
}
