//! Word pronunciation through an external text-to-speech program.
//!
//! Speech is best effort. Callers ignore failures beyond logging them.

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech is disabled")]
    Disabled,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Vocalizes a word without blocking the caller.
pub trait Speaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Speaker used when no TTS program is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl Speaker for NoSpeech {
    fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Disabled)
    }
}

/// Runs `program [args..] <text>` in the background.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    // Utterances not yet reaped
    running: Mutex<Vec<Child>>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            running: Mutex::new(Vec::new()),
        }
    }

    /// Children spawned and not yet reaped
    pub fn pending(&self) -> usize {
        self.running.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Ok(mut running) = self.running.lock() {
            running.retain_mut(|c| matches!(c.try_wait(), Ok(None)));
            running.push(child);
        }
        Ok(())
    }
}

/// Waits for outstanding utterances.
impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        if let Ok(running) = self.running.get_mut() {
            for child in running.iter_mut() {
                let _ = child.wait();
            }
        }
    }
}

/// Build the speaker for an optional configured command
pub fn speaker_for(command: Option<&str>, args: &[String]) -> Box<dyn Speaker> {
    match command {
        Some(program) => {
            tracing::info!("Speech enabled via {}", program);
            Box::new(CommandSpeaker::new(program, args.to_vec()))
        }
        None => Box::new(NoSpeech),
    }
}
