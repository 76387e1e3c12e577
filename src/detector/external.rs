//! Model-backed detectors.
//!
//! The crate does not load NER models itself. [`CommandDetector`] delegates
//! to an external program (for instance a token-classification pipeline
//! wrapper) and [`StaticDetector`] replays entities computed elsewhere.

use super::{DetectionError, Detector};
use crate::domain::{RawEntity, DEFAULT_LABEL_KEY};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Runs a program per call, feeding the text on stdin.
///
/// The program must print a JSON array of entities on stdout, e.g.
/// `[{"start": 0, "end": 4, "entity_group": "PER", "score": 0.98}]`, and exit
/// with status zero.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    name: String,
    program: String,
    args: Vec<String>,
    label_key: String,
}

impl CommandDetector {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args: Vec::new(),
            label_key: DEFAULT_LABEL_KEY.to_string(),
        }
    }

    /// Splits a shell-like command line on whitespace into program and args.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts.map(str::to_string)))
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_label_key(mut self, label_key: impl Into<String>) -> Self {
        self.label_key = label_key.into();
        self
    }
}

impl Detector for CommandDetector {
    fn detect(&self, text: &str) -> Result<Vec<RawEntity>, DetectionError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DetectionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a chatty child cannot block on a
        // full stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|source| DetectionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(program = %self.program, error = %e, "stdin closed early"),
                Err(_) => {
                    return Err(DetectionError::Backend {
                        detector: self.name.clone(),
                        message: "stdin writer panicked".to_string(),
                    })
                }
            }
        }

        if !output.status.success() {
            return Err(DetectionError::ExitStatus {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| DetectionError::Decode {
            detector: self.name.clone(),
            source,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label_key(&self) -> &str {
        &self.label_key
    }
}

/// Returns the same entities on every call.
#[derive(Debug, Clone)]
pub struct StaticDetector {
    name: String,
    entities: Vec<RawEntity>,
    label_key: String,
}

impl StaticDetector {
    pub fn new(name: impl Into<String>, entities: Vec<RawEntity>) -> Self {
        Self {
            name: name.into(),
            entities,
            label_key: DEFAULT_LABEL_KEY.to_string(),
        }
    }

    /// Parses a JSON array of entities.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, DetectionError> {
        let name = name.into();
        let entities = serde_json::from_str(json).map_err(|source| DetectionError::Decode {
            detector: name.clone(),
            source,
        })?;
        Ok(Self::new(name, entities))
    }

    pub fn with_label_key(mut self, label_key: impl Into<String>) -> Self {
        self.label_key = label_key.into();
        self
    }
}

impl Detector for StaticDetector {
    fn detect(&self, _text: &str) -> Result<Vec<RawEntity>, DetectionError> {
        Ok(self.entities.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label_key(&self) -> &str {
        &self.label_key
    }
}
