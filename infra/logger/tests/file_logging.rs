use std::fs;
use std::time::Duration;
use svault_logger::{LevelFilter, Logger, parse_rotation};
use tempfile::tempdir;

#[test]
fn file_logging_creates_json_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file-logging")
        .console(false)
        .json(true)
        .path(&log_dir)
        .rotation(parse_rotation("never")?)
        .level(LevelFilter::INFO)
        .init()?;
    assert!(logger.writes_file());

    tracing::info!(entry_id = "abc123", "entry created");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    assert_eq!(log_file.file_name().and_then(|n| n.to_str()), Some("integration-file-logging.log"));

    let contents = fs::read_to_string(&log_file)?;
    let line = contents.lines().find(|l| l.contains("entry created")).expect("event logged");
    assert!(line.starts_with('{'), "file output should be JSON: {line}");
    assert!(line.contains("abc123"));

    Ok(())
}
