//! Narrative generator running an external program.
//!
//! The program receives the [`ExplanationPayload`] as JSON on stdin and must
//! print `{"clinical_text": ..., "patient_text": ...}` on stdout.

use std::{
    io::{Read as _, Write as _},
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use super::{ExplanationPayload, GeneratorError, Narrative, NarrativeGenerator};

/// Interval for polling the child process.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs an external program per explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerator {
    /// Program to run.
    program: String,
    /// Arguments to the program.
    args: Vec<String>,
    /// The program is killed when running longer.
    timeout: Duration,
}

impl CommandGenerator {
    /// Construct a new generator.
    pub fn new(program: &str, args: &[String], timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            timeout,
        }
    }
}

impl NarrativeGenerator for CommandGenerator {
    fn generate(&self, payload: &ExplanationPayload) -> Result<Narrative, GeneratorError> {
        tracing::debug!("running narrative generator {} {:?}", &self.program, &self.args);
        let input = serde_json::to_vec(payload)?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(GeneratorError::Spawn)?;

        let (Some(mut stdin), Some(mut stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(GeneratorError::Unavailable(
                "could not attach to stdin/stdout".to_string(),
            ));
        };
        let reader = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });
        if let Err(e) = stdin.write_all(&input) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }
        drop(stdin);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GeneratorError::Timeout(self.timeout));
            }
            std::thread::sleep(POLL_INTERVAL);
        };
        let output = reader
            .join()
            .map_err(|_| GeneratorError::Unavailable("stdout reader panicked".to_string()))??;
        if !status.success() {
            return Err(GeneratorError::Failed(status));
        }

        Ok(serde_json::from_slice(&output)?)
    }
}
