/*
 * Quesuene - Audio Module
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 *
 * Sink input enumeration and volume control through pactl
 */

use lazy_static::lazy_static;
use regex::Regex;
use std::io;
use std::process::{Command, ExitStatus, Output};
use thiserror::Error;
use tracing::debug;

lazy_static! {
    static ref INDEX_RE: Regex = Regex::new(r"Sink Input #([0-9]+)").unwrap();
    static ref APP_NAME_RE: Regex = Regex::new(r#"application\.name = "(.*)""#).unwrap();
    static ref PERCENT_RE: Regex = Regex::new(r"([0-9]+)%").unwrap();
}

/// One application stream as reported by `pactl list sink-inputs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkInput {
    pub index: u32,
    pub app_name: String,
    pub volume: u32,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no pactl command configured")]
    EmptyCommand,

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("sink input block has no index marker: {block:?}")]
    MissingIndex { block: String },

    #[error("sink input block has no application.name: {block:?}")]
    MissingAppName { block: String },

    #[error("expected a left and right volume, found {found} percentage tokens")]
    VolumeTokens { found: usize },

    #[error("volume level on left ({left}%) and right ({right}%) differ for sink input #{index}")]
    ChannelMismatch { index: u32, left: u32, right: u32 },
}

/// Access to the audio server's per-stream volume controls.
#[cfg_attr(test, mockall::automock)]
pub trait AudioControl {
    /// Active sink inputs, highest index (most recently created) first.
    fn list_sink_inputs(&self) -> Result<Vec<SinkInput>, AudioError>;

    fn set_sink_input_volume(&self, index: u32, volume: u32) -> Result<(), AudioError>;
}

/// `AudioControl` backed by the `pactl` command line utility.
#[derive(Clone, Debug)]
pub struct Pactl {
    command: Vec<String>,
}

impl Default for Pactl {
    fn default() -> Self {
        Self {
            command: vec!["pactl".to_string()],
        }
    }
}

impl Pactl {
    /// `command` is the program followed by any leading arguments, e.g.
    /// `["flatpak-spawn", "--host", "pactl"]`.
    pub fn new<S: AsRef<str>>(command: &[S]) -> Result<Self, AudioError> {
        let mut command: Vec<String> = command.iter().map(|s| s.as_ref().to_string()).collect();
        let program = command.first_mut().ok_or(AudioError::EmptyCommand)?;
        *program = shellexpand::tilde(program.as_str()).into_owned();

        Ok(Self { command })
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    fn run(&self, args: &[&str]) -> Result<Output, AudioError> {
        let (program, leading) = self.command.split_first().ok_or(AudioError::EmptyCommand)?;
        let command_line = format!("{} {}", self.command_line(), args.join(" "));

        debug!(command = %command_line, "Running pactl");

        let output = Command::new(program)
            .args(leading)
            .args(args)
            // Keep the "Sink Input #" markers untranslated
            .env("LC_ALL", "C")
            .output()
            .map_err(|source| AudioError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AudioError::CommandFailed {
                command: command_line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl AudioControl for Pactl {
    fn list_sink_inputs(&self) -> Result<Vec<SinkInput>, AudioError> {
        let output = self.run(&["list", "sink-inputs"])?;
        let output_str = String::from_utf8_lossy(&output.stdout);
        parse_sink_inputs(&output_str)
    }

    fn set_sink_input_volume(&self, index: u32, volume: u32) -> Result<(), AudioError> {
        let index = index.to_string();
        let volume = format!("{}%", volume);
        self.run(&["set-sink-input-volume", &index, &volume])?;
        Ok(())
    }
}

/// Parse the output of `pactl list sink-inputs` into records sorted by
/// index, highest first.
pub fn parse_sink_inputs(output: &str) -> Result<Vec<SinkInput>, AudioError> {
    let normalized = output.replace("\r\n", "\n");

    let mut sink_inputs = normalized
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(parse_block)
        .collect::<Result<Vec<_>, _>>()?;

    sink_inputs.sort_by(|a, b| b.index.cmp(&a.index));
    Ok(sink_inputs)
}

fn parse_block(block: &str) -> Result<SinkInput, AudioError> {
    let index = INDEX_RE
        .captures(block)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .ok_or_else(|| AudioError::MissingIndex {
            block: first_line(block),
        })?;

    let app_name = APP_NAME_RE
        .captures(block)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| AudioError::MissingAppName {
            block: first_line(block),
        })?;

    let volumes = PERCENT_RE
        .captures_iter(block)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect::<Vec<_>>();

    let [left, right] = volumes[..] else {
        return Err(AudioError::VolumeTokens {
            found: volumes.len(),
        });
    };

    if left != right {
        return Err(AudioError::ChannelMismatch { index, left, right });
    }

    Ok(SinkInput {
        index,
        app_name,
        volume: left,
    })
}

fn first_line(block: &str) -> String {
    block.trim().lines().next().unwrap_or_default().to_string()
}
