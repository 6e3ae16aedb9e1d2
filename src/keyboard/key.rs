// SPDX-License-Identifier: GPL-3.0-only

use super::{
    action::Action,
    symbol::{Symbol, SymbolTable},
};

/// A button of a view, identified by its keycode.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    keycode: u32,
    name: String,
    outline: Option<String>,
    action: Action,
    symbols: SymbolTable,
    pressed: bool,
}

impl Key {
    pub fn new(keycode: u32, name: impl Into<String>, symbols: SymbolTable) -> Key {
        Key {
            keycode,
            name: name.into(),
            outline: None,
            action: Action::None,
            symbols,
            pressed: false,
        }
    }

    pub fn with_action(mut self, action: Action) -> Key {
        self.action = action;
        self
    }

    pub fn with_outline(mut self, outline: Option<String>) -> Key {
        self.outline = outline;
        self
    }

    pub fn keycode(&self) -> u32 {
        self.keycode
    }

    /// Button identifier from the layout source.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outline(&self) -> Option<&str> {
        self.outline.as_deref()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbol_at(&self, group: u32, level: u32) -> Option<&Symbol> {
        self.symbols.symbol_at(group, level)
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }
}
