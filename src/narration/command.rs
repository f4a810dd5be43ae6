use std::process::Stdio;
use tokio::process::{Child, Command};

use super::SpeechSynth;

/// Speaks through an external TTS program (`espeak-ng`, `say`, ...).
///
/// Each utterance is one child process with the text as its final argument.
/// Cancelling kills the child. Must be used from within a tokio runtime.
pub struct CommandSynth {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandSynth {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Whether the last utterance's process is still running.
    pub fn is_speaking(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl SpeechSynth for CommandSynth {
    fn speak(&mut self, text: &str) {
        self.cancel();
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        match spawned {
            Ok(child) => self.child = Some(child),
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "Failed to start TTS command");
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            // InvalidInput means the process already exited.
            if e.kind() != std::io::ErrorKind::InvalidInput {
                tracing::debug!(error = %e, "Failed to kill TTS process");
            }
        }
    }
}

impl Drop for CommandSynth {
    fn drop(&mut self) {
        self.cancel();
    }
}
