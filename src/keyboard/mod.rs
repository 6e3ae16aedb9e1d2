// SPDX-License-Identifier: GPL-3.0-only

//! The keyboard model: symbols, keys and views, and the state machine that
//! turns key presses into submissions.

pub mod action;
pub mod dispatch;
pub mod key;
pub mod layout;
pub mod state;
pub mod symbol;

pub use self::{
    action::{Action, Emission, KeyState, Transition},
    dispatch::{ChangeListener, Dispatcher, Submission},
    key::Key,
    layout::{Layout, LayoutError, Section, View},
    state::{KeyboardState, Notification, StateMachine},
    symbol::{Label, ModifierMask, Symbol, SymbolTable},
};
