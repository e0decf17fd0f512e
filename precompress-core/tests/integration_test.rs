//! Integration tests for precompress-core

use precompress_core::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn compressible(len: usize) -> Vec<u8> {
    b"function greet(name) { return 'hello ' + name; }\n"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Deterministic noise that neither codec can shrink.
fn incompressible(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.contents())
}

#[cfg(all(feature = "gzip", feature = "brotli"))]
mod with_all_codecs {
    use super::*;

    #[test]
    fn test_run_writes_gzip_and_brotli_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let app = write_file(dir.path(), "app.js", &compressible(10_000));
        let css = write_file(dir.path(), "css/site.css", &compressible(4_000));

        let config = PrecompressConfig::builder().dir(dir.path()).build();
        Precompressor::new(&config).run().unwrap();

        for source in [&app, &css] {
            for suffix in [".gz", ".br"] {
                let artifact = sibling(source, suffix);
                assert!(artifact.is_file(), "missing {}", artifact.display());
                assert!(
                    fs::metadata(&artifact).unwrap().len() < fs::metadata(source).unwrap().len()
                );
            }
        }

        // Sources are left untouched
        assert_eq!(fs::read(&app).unwrap(), compressible(10_000));
    }

    #[test]
    fn test_run_mirrors_tree_under_output_dir() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_file(input.path(), "static/js/app.js", &compressible(5_000));
        write_file(input.path(), "index.html", &compressible(5_000));

        let config = PrecompressConfig::builder()
            .input_dir(input.path())
            .output_dir(output.path())
            .build();
        Precompressor::new(&config).run().unwrap();

        assert!(output.path().join("static/js/app.js.gz").is_file());
        assert!(output.path().join("static/js/app.js.br").is_file());
        assert!(output.path().join("index.html.gz").is_file());
        assert!(output.path().join("index.html.br").is_file());

        // Nothing written next to the sources
        assert!(!input.path().join("index.html.gz").exists());
        assert!(!output.path().join("index.html").exists());
    }

    #[test]
    fn test_artifacts_decode_to_source() {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let contents = compressible(8_000);
        let source = write_file(dir.path(), "data.json", &contents);

        let config = PrecompressConfig::builder().dir(dir.path()).build();
        Precompressor::new(&config).run().unwrap();

        let gz = fs::read(sibling(&source, ".gz")).unwrap();
        let mut decoded = Vec::new();
        GzDecoder::new(&gz[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, contents);

        let br = fs::read(sibling(&source, ".br")).unwrap();
        let mut decoded = Vec::new();
        brotli::BrotliDecompress(&mut std::io::Cursor::new(&br), &mut decoded).unwrap();
        assert_eq!(decoded, contents);
    }

    #[test]
    fn test_excluded_files_produce_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "tiny.txt", b"a");
        write_file(dir.path(), "empty.css", b"");
        write_file(dir.path(), "already.tar", &compressible(10_000));

        let config = PrecompressConfig::builder().dir(dir.path()).min_size(2).build();
        let (result, logs) = with_captured_logs(|| Precompressor::new(&config).run());
        result.unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["already.tar", "empty.css", "tiny.txt"]);
        assert!(!logs.contains("INFO"));
    }

    #[test]
    fn test_incompressible_file_is_discarded_for_every_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "noise.txt", &incompressible(10_000));

        let config = PrecompressConfig::builder().dir(dir.path()).build();
        let outcomes = Precompressor::new(&config).process_file(&source);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, Algorithm::Gzip);
        assert_eq!(outcomes[1].0, Algorithm::Brotli);
        for (_, outcome) in &outcomes {
            match outcome {
                FileOutcome::Discarded(result) => assert!(result.percent() >= 100),
                other => panic!("expected discard, got {other:?}"),
            }
        }
        assert!(!sibling(&source, ".gz").exists());
        assert!(!sibling(&source, ".br").exists());
    }

    #[test]
    fn test_skip_file_policy_stops_after_first_discard() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "noise.txt", &incompressible(10_000));

        let config = PrecompressConfig::builder()
            .dir(dir.path())
            .discard_policy(DiscardPolicy::SkipFile)
            .build();
        let outcomes = Precompressor::new(&config).process_file(&source);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, Algorithm::Gzip);
        assert!(matches!(outcomes[0].1, FileOutcome::Discarded(_)));
        assert!(!sibling(&source, ".gz").exists());
        assert!(!sibling(&source, ".br").exists());
    }

    #[test]
    fn test_failed_algorithm_does_not_stop_the_next_one() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "app.js", &compressible(10_000));
        // A directory in the way makes the gzip destination unwritable
        fs::create_dir(sibling(&source, ".gz")).unwrap();

        let config = PrecompressConfig::builder().dir(dir.path()).build();
        let (outcomes, logs) =
            with_captured_logs(|| Precompressor::new(&config).process_file(&source));

        assert!(matches!(
            outcomes[0],
            (Algorithm::Gzip, FileOutcome::Failed(PrecompressError::Io { .. }))
        ));
        assert!(matches!(
            outcomes[1],
            (Algorithm::Brotli, FileOutcome::Retained(_))
        ));
        assert!(sibling(&source, ".br").is_file());
        assert!(logs.contains("Failed to precompress file"));
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_file(dir.path(), "app.js", &compressible(10_000));
        write_file(dir.path(), "noise.svg", &incompressible(4_000));

        let config = PrecompressConfig::builder().dir(dir.path()).build();
        let precompressor = Precompressor::new(&config);

        precompressor.run().unwrap();
        let gz = fs::read(sibling(&source, ".gz")).unwrap();
        let br = fs::read(sibling(&source, ".br")).unwrap();

        precompressor.run().unwrap();
        assert_eq!(fs::read(sibling(&source, ".gz")).unwrap(), gz);
        assert_eq!(fs::read(sibling(&source, ".br")).unwrap(), br);
        assert!(!dir.path().join("noise.svg.gz").exists());
        assert!(!dir.path().join("noise.svg.br").exists());
    }

    #[test]
    fn test_missing_input_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = PrecompressConfig::builder()
            .dir(dir.path().join("does-not-exist"))
            .build();

        let (result, logs) = with_captured_logs(|| Precompressor::new(&config).run());
        assert!(result.is_ok());
        assert!(logs.contains("Skipping unreadable entry"));
    }
}

#[cfg(feature = "gzip")]
#[test]
fn test_retained_artifact_is_logged_with_percentage() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_file(dir.path(), "app.js", &compressible(10_000));

    let config = PrecompressConfig::builder().dir(dir.path()).gzip().build();
    let (outcomes, logs) =
        with_captured_logs(|| Precompressor::new(&config).process_file(&source));

    let result = match &outcomes[..] {
        [(Algorithm::Gzip, FileOutcome::Retained(result))] => *result,
        other => panic!("unexpected outcomes: {other:?}"),
    };

    let artifact = sibling(&source, ".gz");
    assert_eq!(result.source_len, 10_000);
    assert_eq!(result.destination_len, fs::metadata(&artifact).unwrap().len());
    assert!(result.percent() < 100);
    assert!(logs.contains(&format!(
        "app.js(10000b) -> app.js.gz({}b)[{}%]",
        result.destination_len,
        result.percent()
    )));
    assert!(!sibling(&source, ".br").exists());
}

#[cfg(feature = "gzip")]
#[test]
fn test_discard_law_over_mixed_tree() {
    let dir = tempfile::tempdir().unwrap();
    let files = [
        write_file(dir.path(), "a/app.js", &compressible(3_000)),
        write_file(dir.path(), "a/b/noise.json", &incompressible(3_000)),
        write_file(dir.path(), "small.md", b"ab"),
    ];

    let config = PrecompressConfig::builder().dir(dir.path()).gzip().build();
    let precompressor = Precompressor::new(&config);

    for source in &files {
        for (_, outcome) in precompressor.process_file(source) {
            let artifact = sibling(source, ".gz");
            match outcome {
                FileOutcome::Retained(result) => {
                    assert!(result.percent() < 100);
                    assert_eq!(fs::metadata(&artifact).unwrap().len(), result.destination_len);
                }
                FileOutcome::Discarded(result) => {
                    assert!(result.percent() >= 100);
                    assert!(!artifact.exists());
                }
                FileOutcome::Failed(e) => panic!("unexpected failure: {e}"),
            }
        }
    }
}

#[cfg(all(unix, feature = "gzip"))]
#[test]
fn test_dangling_symlink_is_skipped_silently() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_file(dir.path(), "a/app.js", &compressible(10_000));
    std::os::unix::fs::symlink(dir.path().join("gone.js"), dir.path().join("link.js")).unwrap();

    let config = PrecompressConfig::builder().dir(dir.path()).gzip().build();
    let (result, logs) = with_captured_logs(|| Precompressor::new(&config).run());
    result.unwrap();

    assert!(sibling(&source, ".gz").is_file());
    assert!(!dir.path().join("link.js.gz").exists());
    assert!(!logs.contains("ERROR"));
    assert!(!logs.contains("Skipping unreadable entry"));
}

#[cfg(all(unix, feature = "gzip"))]
#[test]
fn test_walk_error_does_not_stop_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_file(dir.path(), "a/app.js", &compressible(10_000));
    // Points back at the root, which walkdir reports as a loop
    std::os::unix::fs::symlink("..", dir.path().join("a/loop")).unwrap();
    let later = write_file(dir.path(), "b/site.css", &compressible(4_000));

    let config = PrecompressConfig::builder().dir(dir.path()).gzip().build();
    let (result, logs) = with_captured_logs(|| Precompressor::new(&config).run());
    result.unwrap();

    assert!(logs.contains("Skipping unreadable entry"));
    assert!(sibling(&source, ".gz").is_file());
    assert!(sibling(&later, ".gz").is_file());
}

// Only built without the brotli codec:
// cargo test -p precompress-core --no-default-features --features gzip
#[cfg(not(feature = "brotli"))]
#[test]
fn test_unavailable_codec_aborts_before_touching_files() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "app.js", &compressible(10_000));

    let config = PrecompressConfig::builder().dir(dir.path()).build();
    let result = Precompressor::new(&config).run();

    assert!(matches!(result, Err(PrecompressError::UnsupportedAlgorithm(_))));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
