// SPDX-License-Identifier: GPL-3.0-only

use crate::{
    backend::JsonLines,
    config::Config,
    keyboard::{Dispatcher, Layout},
    loader,
};
use calloop::{LoopHandle, LoopSignal};
use std::path::PathBuf;

pub struct State {
    pub config: Config,
    pub dispatcher: Dispatcher<JsonLines>,
    /// File the current layout was loaded from.
    pub layout_path: PathBuf,

    pub event_loop_handle: LoopHandle<'static, State>,
    pub event_loop_signal: LoopSignal,
    pub should_stop: bool,
}

impl State {
    pub fn new(
        config: Config,
        layout: Layout,
        layout_path: PathBuf,
        event_loop_handle: LoopHandle<'static, State>,
        event_loop_signal: LoopSignal,
    ) -> State {
        let mut dispatcher = Dispatcher::new(
            layout,
            config.settings.modifier_behavior,
            JsonLines::stdout(),
        );
        if config.settings.group != 0 {
            dispatcher.set_group(config.settings.group);
        }
        State {
            config,
            dispatcher,
            layout_path,
            event_loop_handle,
            event_loop_signal,
            should_stop: false,
        }
    }

    /// Loads the layout again, from `path` if given, and swaps it in.
    ///
    /// A layout that fails to load leaves the current one in place.
    pub fn reload(&mut self, path: Option<PathBuf>) -> Result<(), loader::LoadError> {
        let path = path.unwrap_or_else(|| self.layout_path.clone());
        let layout = loader::load_file(&path)?;
        self.dispatcher.reload(layout);
        self.layout_path = path;
        Ok(())
    }
}
