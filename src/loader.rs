// SPDX-License-Identifier: GPL-3.0-only

//! Reading layout files into a [`Layout`] and writing them back out.

use crate::{
    config::keysym_from_name,
    keyboard::{
        Action, Key, Label, Layout, LayoutError, ModifierMask, Section, Symbol, SymbolTable, View,
    },
};
use indexmap::{IndexMap, IndexSet};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tapboard_config::layout::{
    ActionDef, ButtonDef, LayoutFile, LockingDef, SymbolDef, ERASE_ACTION,
    SHOW_PREFERENCES_ACTION,
};
use tracing::{debug, warn};
use xkbcommon::xkb;

/// Lowest keycode the X protocol can carry.
pub const FIRST_KEYCODE: u32 = 8;

const FALLBACK_DEFAULT_VIEW: &str = "base";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read layout file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed layout: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unknown keysym {name:?} on button {button}")]
    UnknownKeysym { button: String, name: String },
    #[error("Unknown modifier {name:?} on button {button}")]
    UnknownModifier { button: String, name: String },
    #[error("Keycode {keycode} is used by both {first} and {second}")]
    DuplicateKeycode {
        keycode: u32,
        first: String,
        second: String,
    },
    #[error("Button {0} mixes inline symbols, levels and groups")]
    MixedSymbols(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Layout, LoadError> {
    let path = path.as_ref();
    debug!("Loading layout {}", path.display());
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&source)
}

pub fn load_str(source: &str) -> Result<Layout, LoadError> {
    let file: LayoutFile = serde_yaml::from_str(source)?;
    build(&file)
}

/// Turns the declarative description into the keyboard tree.
///
/// Problems that leave the layout usable, like a view switch to a view that
/// does not exist, are logged and otherwise ignored.
pub fn build(file: &LayoutFile) -> Result<Layout, LoadError> {
    if file.views.is_empty() {
        return Err(LayoutError::NoViews.into());
    }

    let keycodes = assign_keycodes(file)?;
    let mut keys = HashMap::<&str, Key>::new();
    let mut views = Vec::with_capacity(file.views.len());
    for (view_name, rows) in &file.views {
        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row_keys = Vec::new();
            for id in row.split_whitespace() {
                let key = match keys.get(id) {
                    Some(key) => key.clone(),
                    None => {
                        let key = build_key(id, keycodes[id], file.buttons.get(id))?;
                        keys.insert(id, key.clone());
                        key
                    }
                };
                row_keys.push(key);
            }
            sections.push(Section::new(row_keys));
        }
        views.push(View::new(view_name.clone(), sections));
    }

    let default_view = match &file.default_view {
        Some(view) => view.clone(),
        None if file.views.contains_key(FALLBACK_DEFAULT_VIEW) => FALLBACK_DEFAULT_VIEW.into(),
        None => file.views.keys().next().cloned().unwrap_or_default(),
    };
    let layout = Layout::new(default_view, views, file.outlines.clone())?;
    validate(&layout, file);
    Ok(layout)
}

/// Explicit keycodes first, then everything else in order of first appearance.
fn assign_keycodes(file: &LayoutFile) -> Result<HashMap<&str, u32>, LoadError> {
    let mut explicit = HashMap::<u32, &str>::new();
    for (id, button) in &file.buttons {
        let Some(keycode) = button.keycode else {
            continue;
        };
        if let Some(first) = explicit.insert(keycode, id.as_str()) {
            return Err(LoadError::DuplicateKeycode {
                keycode,
                first: first.to_owned(),
                second: id.clone(),
            });
        }
    }

    let placed = file
        .views
        .values()
        .flatten()
        .flat_map(|row| row.split_whitespace())
        .collect::<IndexSet<_>>();
    let mut next = FIRST_KEYCODE;
    let mut keycodes = HashMap::with_capacity(placed.len());
    for id in placed {
        let keycode = match file.buttons.get(id).and_then(|button| button.keycode) {
            Some(keycode) => keycode,
            None => {
                while explicit.contains_key(&next) {
                    next += 1;
                }
                next += 1;
                next - 1
            }
        };
        keycodes.insert(id, keycode);
    }
    Ok(keycodes)
}

fn build_key(id: &str, keycode: u32, button: Option<&ButtonDef>) -> Result<Key, LoadError> {
    let Some(button) = button else {
        return Ok(Key::new(keycode, id, SymbolTable::level_invariant(Symbol::text(id))));
    };

    let action = button
        .action
        .as_ref()
        .map(|action| build_action(id, action))
        .transpose()?
        .unwrap_or_default();

    let inline = !button.symbol.is_empty();
    let symbols = match (inline, &button.levels, &button.groups) {
        (_, Some(_), Some(_)) | (true, Some(_), _) | (true, _, Some(_)) => {
            return Err(LoadError::MixedSymbols(id.to_owned()))
        }
        (false, None, Some(groups)) => {
            let mut table = SymbolTable::new();
            for (group, levels) in groups.iter().enumerate() {
                for (level, symbol) in levels.iter().enumerate() {
                    if let Some(symbol) = symbol {
                        table.set(group as u32, level as u32, build_symbol(id, symbol)?);
                    }
                }
            }
            table
        }
        (false, Some(levels), None) => {
            let mut table = SymbolTable::new();
            for (level, symbol) in levels.iter().enumerate() {
                if let Some(symbol) = symbol {
                    table.set(0, level as u32, build_symbol(id, symbol)?);
                }
            }
            table
        }
        (true, None, None) => SymbolTable::level_invariant(build_symbol(id, &button.symbol)?),
        // only the identifier to go by
        (false, None, None) if action == Action::None => {
            SymbolTable::level_invariant(Symbol::text(id))
        }
        (false, None, None) => SymbolTable::level_invariant(Symbol {
            label: Label::Text(id.to_owned()),
            text: None,
            keysym: None,
            modifiers: ModifierMask::empty(),
        }),
    };

    Ok(Key::new(keycode, id, symbols)
        .with_action(action)
        .with_outline(button.outline.clone()))
}

fn build_action(id: &str, action: &ActionDef) -> Result<Action, LoadError> {
    Ok(match action {
        ActionDef::Named(name) if name == ERASE_ACTION => Action::Erase,
        ActionDef::Named(name) if name == SHOW_PREFERENCES_ACTION => Action::ShowPreferences,
        ActionDef::Named(name) => {
            Action::Keysym(
                keysym_from_name(name).ok_or_else(|| LoadError::UnknownKeysym {
                    button: id.to_owned(),
                    name: name.clone(),
                })?,
            )
        }
        ActionDef::SetView { set_view } => Action::SetView(set_view.clone()),
        ActionDef::Locking {
            locking:
                LockingDef {
                    lock_view,
                    unlock_view,
                    latches,
                },
        } => Action::Locking {
            lock_view: lock_view.clone(),
            unlock_view: unlock_view.clone(),
            latches: *latches,
        },
    })
}

fn build_symbol(id: &str, symbol: &SymbolDef) -> Result<Symbol, LoadError> {
    let keysym = symbol
        .keysym
        .as_deref()
        .map(|name| {
            keysym_from_name(name).ok_or_else(|| LoadError::UnknownKeysym {
                button: id.to_owned(),
                name: name.to_owned(),
            })
        })
        .transpose()?;

    let mut modifiers = ModifierMask::empty();
    for name in &symbol.modifier {
        modifiers |= ModifierMask::parse(name).ok_or_else(|| LoadError::UnknownModifier {
            button: id.to_owned(),
            name: name.clone(),
        })?;
    }

    let label = match (&symbol.icon, &symbol.label, &symbol.text, &symbol.keysym) {
        (Some(icon), ..) => Label::Icon(icon.clone()),
        (None, Some(label), ..) => Label::Text(label.clone()),
        (None, None, Some(text), _) => Label::Text(text.clone()),
        (None, None, None, Some(keysym)) => Label::Text(keysym.clone()),
        (None, None, None, None) => Label::Text(id.to_owned()),
    };

    Ok(Symbol {
        label,
        text: symbol.text.clone(),
        keysym,
        modifiers,
    })
}

fn validate(layout: &Layout, file: &LayoutFile) {
    let mut placed = IndexSet::new();
    for view in layout.views() {
        for key in view.keys() {
            if !placed.insert(key.name()) {
                continue;
            }
            for target in key.action().target_views() {
                if !layout.has_view(target) {
                    warn!(
                        "Button {} switches to view {}, which does not exist",
                        key.name(),
                        target
                    );
                }
            }
            if *key.action() == Action::None {
                for (group, level, symbol) in key.symbols().iter() {
                    if symbol.text.is_none() && symbol.keysym.is_none() && !symbol.is_modifier() {
                        warn!(
                            "Button {} submits nothing at group {}, level {}",
                            key.name(),
                            group,
                            level
                        );
                    }
                }
            }
            if let Some(outline) = key.outline() {
                if !layout.outlines().contains_key(outline) {
                    warn!("Button {} uses unknown outline {}", key.name(), outline);
                }
            }
        }
    }
    for id in file.buttons.keys() {
        if !placed.contains(id.as_str()) {
            warn!("Button {} is not placed in any view", id);
        }
    }
}

/// Describes a layout in the form [`build`] reads.
///
/// Every button is written with its keycode, so the result loads back into
/// an equal layout.
pub fn dump(layout: &Layout) -> LayoutFile {
    let mut views = IndexMap::new();
    let mut buttons = IndexMap::new();
    for view in layout.views() {
        let rows = view
            .sections()
            .iter()
            .map(|section| {
                section
                    .keys()
                    .iter()
                    .map(Key::name)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        views.insert(view.name().to_owned(), rows);

        for key in view.keys() {
            if !buttons.contains_key(key.name()) {
                buttons.insert(key.name().to_owned(), dump_key(key));
            }
        }
    }

    LayoutFile {
        default_view: Some(layout.default_view().to_owned()),
        outlines: layout.outlines().clone(),
        views,
        buttons,
    }
}

fn dump_key(key: &Key) -> ButtonDef {
    let symbols = key.symbols();
    let dump_row = |levels: &Vec<Option<Symbol>>| {
        levels
            .iter()
            .map(|symbol| symbol.as_ref().map(dump_symbol))
            .collect::<Vec<_>>()
    };

    let mut button = ButtonDef {
        outline: key.outline().map(str::to_owned),
        keycode: Some(key.keycode()),
        action: dump_action(key.action()),
        ..ButtonDef::default()
    };
    match symbols.groups() {
        [levels] if symbols.is_level_invariant() => {
            if let Some(Some(symbol)) = levels.first() {
                button.symbol = dump_symbol(symbol);
            }
        }
        [] => button.levels = Some(Vec::new()),
        [levels] => button.levels = Some(dump_row(levels)),
        groups => button.groups = Some(groups.iter().map(dump_row).collect()),
    }
    button
}

fn dump_action(action: &Action) -> Option<ActionDef> {
    Some(match action {
        Action::None => return None,
        Action::Erase => ActionDef::Named(ERASE_ACTION.into()),
        Action::ShowPreferences => ActionDef::Named(SHOW_PREFERENCES_ACTION.into()),
        Action::Keysym(keysym) => ActionDef::Named(xkb::keysym_get_name(*keysym)),
        Action::SetView(view) => ActionDef::SetView {
            set_view: view.clone(),
        },
        Action::Locking {
            lock_view,
            unlock_view,
            latches,
        } => ActionDef::Locking {
            locking: LockingDef {
                lock_view: lock_view.clone(),
                unlock_view: unlock_view.clone(),
                latches: *latches,
            },
        },
    })
}

fn dump_symbol(symbol: &Symbol) -> SymbolDef {
    let (label, icon) = match &symbol.label {
        Label::Text(text) => (Some(text.clone()), None),
        Label::Icon(icon) => (None, Some(icon.clone())),
    };
    SymbolDef {
        label,
        icon,
        text: symbol.text.clone(),
        keysym: symbol.keysym.map(xkb::keysym_get_name),
        modifier: symbol
            .modifiers
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    }
}

pub fn to_yaml(file: &LayoutFile) -> Result<String, LoadError> {
    Ok(serde_yaml::to_string(file)?)
}
