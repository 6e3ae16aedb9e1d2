// SPDX-License-Identifier: GPL-3.0-only

//! Delivery of submissions and state changes as JSON lines.

use crate::keyboard::{ChangeListener, Emission, ModifierMask, Notification, Submission};
use serde::Serialize;
use std::io::{self, Write};
use tracing::{trace, warn};
use xkbcommon::xkb;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Message<'a> {
    Submit {
        submit: Submitted<'a>,
        modifiers: Vec<&'static str>,
    },
    Modifiers {
        modifiers: Vec<&'static str>,
    },
    Changed {
        changed: Changed<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Submitted<'a> {
    Text(&'a str),
    Keysym(String),
    Erase,
    ShowPreferences,
}

#[derive(Debug, Serialize)]
struct Changed<'a> {
    group: u32,
    level: u32,
    view: &'a str,
    locked_view: Option<&'a str>,
    latched: bool,
}

/// Writes one JSON object per line to `W`, stdout by default.
#[derive(Debug)]
pub struct JsonLines<W: Write = io::Stdout> {
    out: W,
}

impl JsonLines {
    pub fn stdout() -> Self {
        JsonLines { out: io::stdout() }
    }
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        JsonLines { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, message: &Message<'_>) {
        trace!(?message, "Sending");
        let res = serde_json::to_writer(&mut self.out, message)
            .map_err(io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(err) = res {
            warn!(?err, "Failed to write message");
        }
    }
}

impl<W: Write> Submission for JsonLines<W> {
    fn submit(&mut self, emission: &Emission, modifiers: ModifierMask) {
        let submit = match emission {
            Emission::Text(text) => Submitted::Text(text),
            Emission::Keysym(keysym) => Submitted::Keysym(xkb::keysym_get_name(*keysym)),
            Emission::Erase => Submitted::Erase,
            Emission::ShowPreferences => Submitted::ShowPreferences,
        };
        self.send(&Message::Submit {
            submit,
            modifiers: modifiers.names(),
        });
    }

    fn set_modifiers(&mut self, modifiers: ModifierMask) {
        self.send(&Message::Modifiers {
            modifiers: modifiers.names(),
        });
    }
}

impl<W: Write> ChangeListener for JsonLines<W> {
    fn state_changed(&mut self, notification: &Notification) {
        self.send(&Message::Changed {
            changed: Changed {
                group: notification.group,
                level: notification.level,
                view: &notification.view,
                locked_view: notification.locked_view.as_deref(),
                latched: notification.latched,
            },
        });
    }
}
