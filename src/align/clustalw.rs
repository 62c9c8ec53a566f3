// clustalw.rs - ClustalW external process adapter

use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use super::Aligner;
use crate::data::{fasta, Alignment, Sequence};
use crate::error::{AlignmentError, Result};

/// Binary names tried on `PATH`, in order
pub const CLUSTALW_CANDIDATES: [&str; 2] = ["clustalw2", "clustalw"];

/// Default limit for one alignment run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Runs ClustalW on a FASTA file in a private scratch directory.
///
/// The scratch directory and everything in it is removed when the run ends,
/// whether it succeeded, failed or timed out.
#[derive(Debug, Clone)]
pub struct ClustalwAligner {
    executable: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Duration,
}

impl ClustalwAligner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Locate `clustalw2`, then `clustalw`, on `PATH`
    pub fn detect() -> std::result::Result<Self, AlignmentError> {
        CLUSTALW_CANDIDATES
            .iter()
            .find_map(|name| find_on_path(name))
            .map(Self::new)
            .ok_or_else(|| AlignmentError::Unavailable {
                message: format!(
                    "none of {} found on PATH",
                    CLUSTALW_CANDIDATES.join(", ")
                ),
            })
    }

    /// Use an explicit executable if given, otherwise search `PATH`
    pub fn from_path_or_detect(path: Option<&Path>) -> std::result::Result<Self, AlignmentError> {
        match path {
            Some(p) => Ok(Self::new(p)),
            None => Self::detect(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments placed before the ClustalW options, for wrapper launchers
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn spawn(&self, input: &Path, output: &Path, log_file: File) -> std::result::Result<Child, AlignmentError> {
        let mut infile = OsString::from("-infile=");
        infile.push(input);
        let mut outfile = OsString::from("-outfile=");
        outfile.push(output);

        Command::new(&self.executable)
            .args(&self.leading_args)
            .arg(infile)
            .arg(outfile)
            .arg("-output=fasta")
            .arg("-outorder=input")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_file))
            .spawn()
            .map_err(|e| match e.kind() {
                IoErrorKind::NotFound | IoErrorKind::PermissionDenied => AlignmentError::Unavailable {
                    message: format!("cannot run '{}': {}", self.executable.display(), e),
                },
                _ => AlignmentError::Io(e),
            })
    }

    /// Wait for the child, killing it once the timeout expires
    fn wait_with_timeout(&self, child: &mut Child) -> std::result::Result<ExitStatus, AlignmentError> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if start.elapsed() >= self.timeout {
                // The child may have exited between the poll and the kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(AlignmentError::Timeout { limit: self.timeout });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn run(&self, sequences: &[Sequence]) -> std::result::Result<Vec<Sequence>, AlignmentError> {
        let scratch = tempfile::Builder::new().prefix("njtree-align-").tempdir()?;
        let input_path = scratch.path().join("input.fasta");
        let output_path = scratch.path().join("aligned.fasta");
        let log_path = scratch.path().join("clustalw.log");

        let raw: Vec<Sequence> = sequences
            .iter()
            .map(|s| Sequence::new(s.id.clone(), s.ungapped()))
            .collect();
        fasta::write_fasta(File::create(&input_path)?, &raw).map_err(|e| AlignmentError::Failed {
            message: format!("cannot write aligner input: {}", e),
        })?;

        debug!(
            "Running {} on {} sequences in {}",
            self.executable.display(),
            raw.len(),
            scratch.path().display()
        );
        let mut child = self.spawn(&input_path, &output_path, File::create(&log_path)?)?;
        let status = self.wait_with_timeout(&mut child)?;

        if !status.success() {
            let log = fs::read_to_string(&log_path).unwrap_or_default();
            let detail = log.trim();
            return Err(AlignmentError::Failed {
                message: if detail.is_empty() {
                    format!("exit status {}", status)
                } else {
                    format!("exit status {}: {}", status, detail)
                },
            });
        }

        let text = match fs::read_to_string(&output_path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                return Err(AlignmentError::Empty {
                    message: "output file is empty".to_string(),
                })
            }
            Err(e) => {
                return Err(AlignmentError::Empty {
                    message: format!("no output file produced: {}", e),
                })
            }
        };

        let aligned = fasta::parse_fasta(&text).map_err(|e| AlignmentError::Empty {
            message: e.to_string(),
        })?;
        if aligned.len() != sequences.len() {
            return Err(AlignmentError::Empty {
                message: format!(
                    "expected {} aligned sequences, got {}",
                    sequences.len(),
                    aligned.len()
                ),
            });
        }

        // Output is in input order; restore the original ids, which ClustalW
        // may truncate
        Ok(sequences
            .iter()
            .zip(aligned)
            .map(|(original, row)| Sequence::new(original.id.clone(), row.residues))
            .collect())
    }
}

impl Aligner for ClustalwAligner {
    fn name(&self) -> &str {
        "clustalw"
    }

    fn align(&self, sequences: &[Sequence]) -> Result<Alignment> {
        let start = Instant::now();
        let rows = self.run(sequences)?;
        let alignment = Alignment::new(rows).map_err(|e| AlignmentError::Empty {
            message: format!("aligner output is not a valid alignment: {}", e),
        })?;
        info!(
            "Aligned {} sequences to {} columns in {:.2}s",
            alignment.len(),
            alignment.width(),
            start.elapsed().as_secs_f64()
        );
        Ok(alignment)
    }
}

/// First executable file called `name` in a `PATH` directory
fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
