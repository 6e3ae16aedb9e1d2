// SPDX-License-Identifier: GPL-3.0-only

use super::key::Key;
use indexmap::IndexMap;
use std::collections::{hash_map::Entry, HashMap};
use tapboard_config::layout::Outline;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout has no views")]
    NoViews,
    #[error("Default view `{0}` does not exist")]
    NoSuchView(String),
}

/// An ordered group of keys, usually one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    keys: Vec<Key>,
}

impl Section {
    pub fn new(keys: Vec<Key>) -> Section {
        Section { keys }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

/// One selectable page of the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    name: String,
    sections: Vec<Section>,
    // keycode -> (section, key), first occurrence in traversal order
    index: HashMap<u32, (usize, usize)>,
}

impl View {
    pub fn new(name: impl Into<String>, sections: Vec<Section>) -> View {
        let mut index = HashMap::new();
        for (s, section) in sections.iter().enumerate() {
            for (k, key) in section.keys.iter().enumerate() {
                if let Entry::Vacant(entry) = index.entry(key.keycode()) {
                    entry.insert((s, k));
                }
            }
        }
        View {
            name: name.into(),
            sections,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All keys in section order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.sections.iter().flat_map(|section| section.keys.iter())
    }

    pub fn find_key_by_keycode(&self, keycode: u32) -> Option<&Key> {
        let &(s, k) = self.index.get(&keycode)?;
        Some(&self.sections[s].keys[k])
    }

    pub fn find_key_by_keycode_mut(&mut self, keycode: u32) -> Option<&mut Key> {
        let &(s, k) = self.index.get(&keycode)?;
        Some(&mut self.sections[s].keys[k])
    }
}

/// All views of a keyboard layout plus the data shared between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    default_view: String,
    views: IndexMap<String, View>,
    outlines: IndexMap<String, Outline>,
    groups: u32,
}

impl Layout {
    pub fn new(
        default_view: impl Into<String>,
        views: impl IntoIterator<Item = View>,
        outlines: IndexMap<String, Outline>,
    ) -> Result<Layout, LayoutError> {
        let default_view = default_view.into();
        let views = views
            .into_iter()
            .map(|view| (view.name.clone(), view))
            .collect::<IndexMap<_, _>>();
        if views.is_empty() {
            return Err(LayoutError::NoViews);
        }
        if !views.contains_key(&default_view) {
            return Err(LayoutError::NoSuchView(default_view));
        }
        let groups = views
            .values()
            .flat_map(View::keys)
            .map(|key| key.symbols().groups().len() as u32)
            .max()
            .unwrap_or_default()
            .max(1);
        Ok(Layout {
            default_view,
            views,
            outlines,
            groups,
        })
    }

    pub fn default_view(&self) -> &str {
        &self.default_view
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn view_mut(&mut self, name: &str) -> Option<&mut View> {
        self.views.get_mut(name)
    }

    /// Views in declaration order.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    /// Number of groups the widest symbol table has, at least one.
    pub fn groups(&self) -> u32 {
        self.groups
    }

    pub fn outlines(&self) -> &IndexMap<String, Outline> {
        &self.outlines
    }

    pub fn find_key_by_keycode(&self, view: &str, keycode: u32) -> Option<&Key> {
        self.view(view)?.find_key_by_keycode(keycode)
    }
}
