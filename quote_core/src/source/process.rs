//! Production quote source: the Finance::Quote wrapper run as a child process.
//!
//! Each query spawns `interpreter wrapper <mode>`, feeds the request on
//! standard input, and waits for the process to exit with standard output and
//! standard error fully buffered in memory. There is no timeout and no
//! cancellation: a wrapper that hangs blocks the calling thread.
use std::env;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};

use crate::config::{API_KEY_ENV, DEFAULT_INTERPRETER, QuoteConfig};
use crate::error::QuoteError;
use crate::result::Result;
use crate::source::{FAILED_STATUS, QuoteSource, RawResponse};

/// Wrapper flag selecting the version/capability query.
pub const VERSION_FLAG: &str = "-v";
/// Wrapper flag selecting a quote fetch.
pub const FETCH_FLAG: &str = "-f";

/// Finance::Quote wrapper run through an interpreter.
#[derive(Debug, Clone)]
pub struct FinanceQuoteSource {
    interpreter: PathBuf,
    wrapper: PathBuf,
    api_key: Option<String>,
}

impl FinanceQuoteSource {
    /// Locates the interpreter and the wrapper named by `config`.
    ///
    /// Bare names are searched on `PATH`; paths must exist.
    pub fn new(config: &QuoteConfig) -> Result<Self> {
        let interpreter_name = config
            .interpreter
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERPRETER));
        let interpreter = locate(&interpreter_name).ok_or_else(|| {
            QuoteError::SourceUnavailable(format!(
                "cannot find interpreter '{}'",
                interpreter_name.display()
            ))
        })?;
        let wrapper = locate(&config.wrapper).ok_or_else(|| {
            QuoteError::SourceUnavailable(format!(
                "cannot find wrapper script '{}'",
                config.wrapper.display()
            ))
        })?;
        debug!(
            "Finance::Quote wrapper: {} {}",
            interpreter.display(),
            wrapper.display()
        );

        Ok(FinanceQuoteSource {
            interpreter,
            wrapper,
            api_key: config.api_key.clone(),
        })
    }

    fn run_cmd(&self, mode: &str, input: &str) -> RawResponse {
        match self.spawn_and_wait(mode, input) {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to run {}: {}", self.wrapper.display(), e);
                RawResponse::failed(e.to_string())
            }
        }
    }

    fn spawn_and_wait(&self, mode: &str, input: &str) -> io::Result<RawResponse> {
        if self.api_key.is_none() {
            warn!(
                "No Alpha Vantage API key set, currency quotes and other AlphaVantage based quotes won't work."
            );
        }

        let mut child = Command::new(&self.interpreter)
            .arg(&self.wrapper)
            .arg(mode)
            .env(API_KEY_ENV, self.api_key.as_deref().unwrap_or(""))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin unavailable"))?;
        let payload = input.as_bytes().to_vec();
        // stdin must be fed while stdout/stderr are being drained.
        let writer = thread::spawn(move || stdin.write_all(&payload));

        let output = child.wait_with_output()?;
        match writer.join() {
            Ok(Err(e)) if e.kind() != ErrorKind::BrokenPipe => return Err(e),
            Err(_) => return Err(io::Error::other("stdin writer panicked")),
            _ => {}
        }

        Ok(RawResponse {
            status: output.status.code().unwrap_or(FAILED_STATUS),
            output: split_lines(&output.stdout),
            diagnostics: split_lines(&output.stderr),
        })
    }
}

impl QuoteSource for FinanceQuoteSource {
    fn version_query(&self) -> RawResponse {
        self.run_cmd(VERSION_FLAG, "")
    }

    fn query(&self, request: &str) -> RawResponse {
        self.run_cmd(FETCH_FLAG, request)
    }
}

/// Lines of a captured stream, up to the first empty line.
fn split_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .take_while(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Resolves `program`: paths are taken as-is when they exist, bare names
/// are searched in `PATH`.
fn locate(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
