use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::audit;

/// Echo every run-log line to the console as well as the file.
pub const ALSO_CONSOLE: bool = false;

/// One run-level log per process invocation: `logs/run_<UTC-timestamp>.txt`.
pub fn make_run_log_path() -> Result<PathBuf> {
    audit::ensure_logs_dir()?;
    Ok(PathBuf::from(audit::LOGS_DIR).join(format!("run_{}.txt", audit::run_timestamp())))
}

/// Write-through sink feeding the tracing subscriber: every line goes to
/// the run log file, optionally echoed to stdout. Write failures on either
/// side are swallowed so a full disk cannot take down the scrape.
pub struct TeeWriter {
    file: File,
    also_console: bool,
}

impl TeeWriter {
    pub fn new(file: File, also_console: bool) -> Self {
        Self { file, also_console }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.file.write_all(buf);
        let _ = self.file.flush();
        if self.also_console {
            let mut console = io::stdout();
            let _ = console.write_all(buf);
            let _ = console.flush();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        if self.also_console {
            let _ = io::stdout().flush();
        }
        Ok(())
    }
}

/// Install the global subscriber writing through the tee. `RUST_LOG`
/// overrides the `info` default.
pub fn init(path: &Path, also_console: bool) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("create run log {}", path.display()))?;
    let writer = Mutex::new(TeeWriter::new(file, also_console));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
}
