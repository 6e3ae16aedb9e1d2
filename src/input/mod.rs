// SPDX-License-Identifier: GPL-3.0-only

//! Key events read as line commands from stdin.

use crate::{config::parse_modifier_behavior, state::State};
use calloop::{channel, LoopHandle};
use std::{
    io::{self, BufRead},
    path::PathBuf,
    str::FromStr,
};
use tapboard_config::ModifierBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Press(u32),
    Release(u32),
    /// Press immediately followed by release.
    Tap(u32),
    Group(u32),
    Behavior(ModifierBehavior),
    ReleaseAll,
    Reload(Option<PathBuf>),
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("Expected a number, got {0:?}")]
    BadNumber(String),
    #[error("Unknown modifier behavior {0:?}")]
    BadBehavior(String),
    #[error("Unexpected argument {0:?}")]
    TrailingArgument(String),
}

impl FromStr for InputEvent {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let number = |word: Option<&str>, command: &'static str| {
            let word = word.ok_or(ParseError::MissingArgument(command))?;
            word.parse::<u32>()
                .map_err(|_| ParseError::BadNumber(word.to_owned()))
        };

        let event = match command {
            "press" => InputEvent::Press(number(words.next(), "press")?),
            "release" => InputEvent::Release(number(words.next(), "release")?),
            "tap" => InputEvent::Tap(number(words.next(), "tap")?),
            "group" => InputEvent::Group(number(words.next(), "group")?),
            "behavior" => {
                let name = words
                    .next()
                    .ok_or(ParseError::MissingArgument("behavior"))?;
                InputEvent::Behavior(
                    parse_modifier_behavior(name)
                        .ok_or_else(|| ParseError::BadBehavior(name.to_owned()))?,
                )
            }
            "release-all" => InputEvent::ReleaseAll,
            "reload" => InputEvent::Reload(words.next().map(PathBuf::from)),
            "quit" => InputEvent::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_owned())),
        };
        match words.next() {
            Some(extra) => Err(ParseError::TrailingArgument(extra.to_owned())),
            None => Ok(event),
        }
    }
}

/// Parses one line, skipping blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<InputEvent>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    line.parse().map(Some)
}

/// Reads commands from stdin on a separate thread and feeds them to the loop.
///
/// The loop is asked to stop once stdin is closed.
pub fn init_stdin_source(evlh: &LoopHandle<'static, State>) -> anyhow::Result<()> {
    let (tx, rx) = channel::channel::<InputEvent>();

    evlh.insert_source(rx, |event, _, state| match event {
        channel::Event::Msg(event) => state.process_input_event(event),
        channel::Event::Closed => {
            info!("Input closed");
            state.should_stop = true;
        }
    })
    .map_err(|e| anyhow::anyhow!("Failed to insert stdin channel source: {}", e.error))?;

    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for (number, line) in io::stdin().lock().lines().enumerate() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        error!(?err, "Failed to read stdin");
                        break;
                    }
                };
                match parse_line(&line) {
                    Ok(Some(event)) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => warn!("Ignoring line {}: {}", number + 1, err),
                }
            }
        })?;

    Ok(())
}

impl State {
    pub fn process_input_event(&mut self, event: InputEvent) {
        debug!(?event, "Input event");
        match event {
            InputEvent::Press(keycode) => self.dispatcher.on_keycode_press(keycode),
            InputEvent::Release(keycode) => self.dispatcher.on_keycode_release(keycode),
            InputEvent::Tap(keycode) => {
                self.dispatcher.on_keycode_press(keycode);
                self.dispatcher.on_keycode_release(keycode);
            }
            InputEvent::Group(group) => self.dispatcher.set_group(group),
            InputEvent::Behavior(behavior) => self.dispatcher.set_modifier_behavior(behavior),
            InputEvent::ReleaseAll => self.dispatcher.release_all(),
            InputEvent::Reload(path) => {
                if let Err(err) = self.reload(path) {
                    warn!("Keeping the current layout: {}", err);
                }
            }
            InputEvent::Quit => self.should_stop = true,
        }
    }
}
