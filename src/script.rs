//! Navigation scripts
//!
//! A line-oriented format for driving a [`HistorySync`] over an in-memory
//! history, used by the `navsync` binary:
//!
//! ```text
//! # comment
//! push Article articleId=1 title=hello
//! step-push articleId=2
//! back
//! reload
//! ```
//!
//! After each command the engine is settled and one `path<TAB>activity` line
//! is written.

use std::io::Write;

use thiserror::Error;

use crate::config::Config;
use crate::history::{HistoryError, HostHistory, MemoryHistory};
use crate::stack::{generate_id, ActivityAction, Params, StepAction};
use crate::sync::{HistorySync, InitialContext, SyncError};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Line {line}: unknown command: {command}")]
    UnknownCommand { line: usize, command: String },
    #[error("Line {line}: {command} requires an activity name")]
    MissingActivity { line: usize, command: String },
    #[error("Line {line}: expected key=value, got: {param}")]
    InvalidParam { line: usize, param: String },
    #[error("Line {line}: invalid go delta: {value}")]
    InvalidDelta { line: usize, value: String },
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Push { activity: String, params: Params },
    Replace { activity: String, params: Params },
    StepPush { params: Params },
    StepReplace { params: Params },
    Pop,
    StepPop,
    /// Native back, as if the user pressed the browser button
    Back,
    Forward,
    Go(isize),
    /// Throw the engine away and start a new one on the same history
    Reload,
}

impl ScriptCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptCommand::Push { .. } => "push",
            ScriptCommand::Replace { .. } => "replace",
            ScriptCommand::StepPush { .. } => "step-push",
            ScriptCommand::StepReplace { .. } => "step-replace",
            ScriptCommand::Pop => "pop",
            ScriptCommand::StepPop => "step-pop",
            ScriptCommand::Back => "back",
            ScriptCommand::Forward => "forward",
            ScriptCommand::Go(_) => "go",
            ScriptCommand::Reload => "reload",
        }
    }
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let mut words = text.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let command = match command {
        "push" | "replace" => {
            let activity = words
                .next()
                .ok_or_else(|| ScriptError::MissingActivity {
                    line,
                    command: command.to_string(),
                })?
                .to_string();
            let params = parse_params(line, words)?;
            if command == "push" {
                ScriptCommand::Push { activity, params }
            } else {
                ScriptCommand::Replace { activity, params }
            }
        }
        "step-push" => ScriptCommand::StepPush {
            params: parse_params(line, words)?,
        },
        "step-replace" => ScriptCommand::StepReplace {
            params: parse_params(line, words)?,
        },
        "pop" => ScriptCommand::Pop,
        "step-pop" => ScriptCommand::StepPop,
        "back" => ScriptCommand::Back,
        "forward" => ScriptCommand::Forward,
        "go" => {
            let value = words.next().unwrap_or_default();
            let delta = value.parse::<isize>().map_err(|_| ScriptError::InvalidDelta {
                line,
                value: value.to_string(),
            })?;
            ScriptCommand::Go(delta)
        }
        "reload" => ScriptCommand::Reload,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };
    Ok(Some(command))
}

fn parse_params<'a>(
    line: usize,
    words: impl Iterator<Item = &'a str>,
) -> Result<Params, ScriptError> {
    words
        .map(|word| {
            word.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| ScriptError::InvalidParam {
                    line,
                    param: word.to_string(),
                })
        })
        .collect()
}

/// Parse a whole script, numbering lines from 1.
pub fn parse_script(source: &str) -> Result<Vec<ScriptCommand>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, text) in source.lines().enumerate() {
        if let Some(command) = parse_line(idx + 1, text)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Runs script commands against a sync engine over an in-memory history.
pub struct ScriptRunner {
    history: MemoryHistory,
    config: Config,
    sync: HistorySync<MemoryHistory>,
}

impl ScriptRunner {
    /// Start an engine on `history` and let its initial write settle.
    pub async fn start(
        history: MemoryHistory,
        config: Config,
        context: InitialContext,
    ) -> Result<Self, ScriptError> {
        let mut sync = HistorySync::with_initial_context(history.clone(), config.clone(), context)?;
        sync.settle().await;
        Ok(Self {
            history,
            config,
            sync,
        })
    }

    pub fn sync(&self) -> &HistorySync<MemoryHistory> {
        &self.sync
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    /// Current host path and active activity name, tab separated
    pub fn status_line(&self) -> String {
        let activity = self
            .sync
            .active()
            .map(|activity| activity.name.as_str())
            .unwrap_or("-");
        format!("{}\t{}", self.history.path(), activity)
    }

    pub async fn run(&mut self, command: &ScriptCommand) -> Result<(), ScriptError> {
        tracing::debug!(command = command.name(), "Running script command");
        match command {
            ScriptCommand::Push { activity, params } => {
                let action = ActivityAction::new(generate_id(), activity).with_params(params.clone());
                self.sync.push(action)?;
            }
            ScriptCommand::Replace { activity, params } => {
                let action = ActivityAction::new(generate_id(), activity).with_params(params.clone());
                self.sync.replace(action)?;
            }
            ScriptCommand::StepPush { params } => {
                self.sync
                    .step_push(StepAction::new(generate_id()).with_params(params.clone()))?;
            }
            ScriptCommand::StepReplace { params } => {
                self.sync
                    .step_replace(StepAction::new(generate_id()).with_params(params.clone()))?;
            }
            ScriptCommand::Pop => {
                if !self.sync.pop() {
                    tracing::info!("Nothing to pop");
                }
            }
            ScriptCommand::StepPop => {
                if !self.sync.step_pop() {
                    tracing::info!("No step to pop");
                }
            }
            ScriptCommand::Back => self.history.back()?,
            ScriptCommand::Forward => self.history.forward()?,
            ScriptCommand::Go(delta) => self.history.go(*delta)?,
            ScriptCommand::Reload => {
                self.sync = HistorySync::new(self.history.clone(), self.config.clone())?;
            }
        }

        self.sync.settle().await;
        for failure in self.sync.take_failures() {
            tracing::warn!(error = %failure, command = command.name(), "Sync failure");
        }
        Ok(())
    }
}

/// Run a script from its source, writing a status line after startup and
/// after every command.
pub async fn run_script(
    source: &str,
    config: Config,
    context: InitialContext,
    out: &mut impl Write,
) -> Result<(), ScriptError> {
    let commands = parse_script(source)?;
    let mut runner = ScriptRunner::start(MemoryHistory::new(), config, context).await?;
    writeln!(out, "{}", runner.status_line())?;

    for command in &commands {
        runner.run(command).await?;
        writeln!(out, "{}", runner.status_line())?;
    }
    Ok(())
}
