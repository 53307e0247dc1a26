//! Run logging: every record goes to stdout and to a per-run log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use env_logger::{Env, Target};
use sha2::{Digest, Sha256};

/// Default directory for run logs, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logfiles";

/// `<stem>__<YYYYmmdd_HHMMSS>__<hash>.log`; the hash identifies the input
/// path so logs from different inputs never share a name.
pub fn log_file_name(source: &Path, started: DateTime<Local>) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    let digest = format!("{:x}", Sha256::digest(source.to_string_lossy().as_bytes()));
    format!(
        "{stem}__{}__{}.log",
        started.format("%Y%m%d_%H%M%S"),
        &digest[..32]
    )
}

/// Duplicates log output to stdout and the run log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

/// `time - target - LEVEL - message` records, teed to stdout and `file`.
fn run_logger(file: File) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file })));
    builder
}

/// Install the global logger, writing to stdout and a new file in `log_dir`.
/// Level defaults to `info`; `RUST_LOG` overrides it.
pub fn init(source: &Path, log_dir: &Path) -> Result<PathBuf> {
    if !log_dir.exists() {
        println!("--log folder <{}> doesn't exist, creating", log_dir.display());
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("creating log folder {}", log_dir.display()))?;
    }
    let path = log_dir.join(log_file_name(source, Local::now()));
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    run_logger(file).try_init().context("installing logger")?;

    let rule = format!("+{}+", "*".repeat(78));
    log::info!("{rule}");
    log::info!("project log file is <{}>", path.display());
    log::info!("{rule}");
    log::debug!("debug mode is on");
    Ok(path)
}

/// Console-only logger for the viewer.
pub fn init_console() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
