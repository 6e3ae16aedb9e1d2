// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};
use tapboard_config::TapboardConfig;
use tracing::{debug, info, warn};

mod types;
pub use self::types::*;

/// Where layout files live below each data directory.
const KEYBOARDS_DIR: &str = "tapboard/keyboards";

#[derive(Debug)]
pub struct Config {
    pub settings: TapboardConfig,
    /// File the settings were read from, if any.
    pub path: Option<PathBuf>,
    xdg: Option<xdg::BaseDirectories>,
}

impl Config {
    pub fn load() -> Config {
        let xdg = xdg::BaseDirectories::new().ok();
        let (settings, path) = Self::load_settings(xdg.as_ref());
        Config {
            settings,
            path,
            xdg,
        }
    }

    fn load_settings(xdg: Option<&xdg::BaseDirectories>) -> (TapboardConfig, Option<PathBuf>) {
        let mut locations = if let Some(base) = xdg {
            vec![
                base.get_config_file("tapboard.ron"),
                base.get_config_file("tapboard/config.ron"),
            ]
        } else {
            Vec::with_capacity(3)
        };
        if cfg!(debug_assertions) {
            if let Ok(mut cwd) = std::env::current_dir() {
                cwd.push("config.ron");
                locations.push(cwd);
            }
        }
        locations.push(PathBuf::from("/etc/tapboard/config.ron"));
        locations.push(PathBuf::from("/etc/tapboard.ron"));

        for path in locations {
            debug!("Trying config location: {}", path.display());
            if path.exists() {
                info!("Using config at {}", path.display());
                let file = match OpenOptions::new().read(true).open(&path) {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(?err, "Failed to open {}, using defaults", path.display());
                        break;
                    }
                };
                match ron::de::from_reader(file) {
                    Ok(settings) => return (settings, Some(path)),
                    Err(err) => {
                        warn!(?err, "Malformed config file {}, using defaults", path.display());
                        break;
                    }
                }
            }
        }

        (TapboardConfig::default(), None)
    }

    /// Resolves a layout name to a file in the keyboard data directories.
    ///
    /// A name containing a path separator or ending in `.yaml` is taken as a path.
    pub fn find_layout(&self, name: &str) -> Option<PathBuf> {
        if name.contains('/') || name.ends_with(".yaml") {
            let path = PathBuf::from(name);
            return path.exists().then_some(path);
        }

        let file = format!("{}/{}.yaml", KEYBOARDS_DIR, name);
        let found = self
            .xdg
            .as_ref()
            .and_then(|base| base.find_data_file(&file))
            .or_else(|| {
                let path = PathBuf::from("/usr/share").join(&file);
                path.exists().then_some(path)
            });
        match &found {
            Some(path) => debug!("Layout {} found at {}", name, path.display()),
            None => warn!("No layout named {}", name),
        }
        found
    }

    /// Names of the layouts installed in the keyboard data directories.
    pub fn list_layouts(&self) -> Vec<String> {
        let mut files = self
            .xdg
            .as_ref()
            .map(|base| base.list_data_files(KEYBOARDS_DIR))
            .unwrap_or_default();
        let system = Path::new("/usr/share").join(KEYBOARDS_DIR);
        match std::fs::read_dir(&system) {
            Ok(entries) => files.extend(entries.filter_map(|entry| entry.ok()).map(|e| e.path())),
            Err(err) => debug!(?err, "Can't read {}", system.display()),
        }
        layout_names(files)
    }
}

fn layout_names(files: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
    let mut names = files
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
        .filter_map(|path| Some(path.file_stem()?.to_str()?.to_owned()))
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout_listing() {
        let names = layout_names(
            [
                "/home/user/.local/share/tapboard/keyboards/us.yaml",
                "/usr/share/tapboard/keyboards/de.yaml",
                "/usr/share/tapboard/keyboards/us.yaml",
                "/usr/share/tapboard/keyboards/README",
                "/usr/share/tapboard/keyboards/old.yaml.bak",
            ]
            .map(PathBuf::from),
        );
        assert_eq!(names, ["de", "us"]);
    }
}
