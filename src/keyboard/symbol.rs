// SPDX-License-Identifier: GPL-3.0-only

use bitflags::bitflags;
use xkbcommon::xkb::Keysym;

/// Highest level any modifier combination can select.
pub const MAX_LEVEL: u32 = 3;

bitflags! {
    /// Modifier state, using the X11 core protocol bit positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
    }
}

const MODIFIER_NAMES: &[(&str, ModifierMask)] = &[
    ("shift", ModifierMask::SHIFT),
    ("lock", ModifierMask::LOCK),
    ("control", ModifierMask::CONTROL),
    ("mod1", ModifierMask::MOD1),
    ("mod2", ModifierMask::MOD2),
    ("mod3", ModifierMask::MOD3),
    ("mod4", ModifierMask::MOD4),
    ("mod5", ModifierMask::MOD5),
];

impl ModifierMask {
    /// Column of the symbol matrix selected by this mask.
    ///
    /// Shift selects the odd levels and Mod5 (AltGr) the upper pair,
    /// so the four levels are: plain, Shift, Mod5, Shift+Mod5.
    /// All other bits leave the level untouched.
    pub fn level(self) -> u32 {
        let mut level = 0;
        if self.contains(ModifierMask::MOD5) {
            level |= 2;
        }
        if self.contains(ModifierMask::SHIFT) {
            level |= 1;
        }
        level
    }

    /// Parses a single modifier name, accepting the usual aliases.
    pub fn parse(name: &str) -> Option<ModifierMask> {
        let name = name.to_ascii_lowercase();
        let canonical = match name.as_str() {
            "ctrl" => "control",
            "alt" => "mod1",
            "super" | "logo" => "mod4",
            "altgr" | "level3" => "mod5",
            "capslock" | "caps" => "lock",
            other => other,
        };
        MODIFIER_NAMES
            .iter()
            .find(|(n, _)| *n == canonical)
            .map(|(_, mask)| *mask)
    }

    /// Canonical names of the set bits, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        MODIFIER_NAMES
            .iter()
            .filter(|(_, mask)| self.contains(*mask))
            .map(|(name, _)| *name)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Text used to display the symbol
    Text(String),
    /// Icon name used to render the symbol
    Icon(String),
}

/// One cell of a key's symbol matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub label: Label,
    /// Literal text submitted to the host.
    pub text: Option<String>,
    pub keysym: Option<Keysym>,
    /// Non-empty only for modifier keys.
    pub modifiers: ModifierMask,
}

impl Symbol {
    pub fn text(text: impl Into<String>) -> Symbol {
        let text = text.into();
        Symbol {
            label: Label::Text(text.clone()),
            text: Some(text),
            keysym: None,
            modifiers: ModifierMask::empty(),
        }
    }

    pub fn modifier(label: impl Into<String>, modifiers: ModifierMask) -> Symbol {
        Symbol {
            label: Label::Text(label.into()),
            text: None,
            keysym: None,
            modifiers,
        }
    }

    pub fn is_modifier(&self) -> bool {
        !self.modifiers.is_empty()
    }
}

/// Sparse `(group, level) -> Symbol` matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    groups: Vec<Vec<Option<Symbol>>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// A table holding `symbol` at every level of group 0.
    pub fn level_invariant(symbol: Symbol) -> SymbolTable {
        let mut table = SymbolTable::new();
        for level in 0..=MAX_LEVEL {
            table.set(0, level, symbol.clone());
        }
        table
    }

    /// A table holding `symbols` in group 0, one per level.
    pub fn from_levels(symbols: impl IntoIterator<Item = Symbol>) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (level, symbol) in symbols.into_iter().enumerate() {
            table.set(0, level as u32, symbol);
        }
        table
    }

    pub fn set(&mut self, group: u32, level: u32, symbol: Symbol) {
        let (group, level) = (group as usize, level as usize);
        if self.groups.len() <= group {
            self.groups.resize_with(group + 1, Vec::new);
        }
        let levels = &mut self.groups[group];
        if levels.len() <= level {
            levels.resize_with(level + 1, || None);
        }
        levels[level] = Some(symbol);
    }

    pub fn symbol_at(&self, group: u32, level: u32) -> Option<&Symbol> {
        self.groups
            .get(group as usize)
            .and_then(|levels| levels.get(level as usize))
            .and_then(Option::as_ref)
    }

    /// Rows of the matrix, including unpopulated cells.
    pub fn groups(&self) -> &[Vec<Option<Symbol>>] {
        &self.groups
    }

    /// Whether every populated cell lives in group 0 and the same symbol fills all levels.
    pub fn is_level_invariant(&self) -> bool {
        match self.groups.as_slice() {
            [levels] if levels.len() == MAX_LEVEL as usize + 1 => {
                levels[0].is_some() && levels.iter().all(|s| *s == levels[0])
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &Symbol)> {
        self.groups.iter().enumerate().flat_map(|(group, levels)| {
            levels.iter().enumerate().filter_map(move |(level, symbol)| {
                symbol
                    .as_ref()
                    .map(|symbol| (group as u32, level as u32, symbol))
            })
        })
    }
}
