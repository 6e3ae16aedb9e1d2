// SPDX-License-Identifier: GPL-3.0-only

use anyhow::{anyhow, bail, Context, Result};
use calloop::EventLoop;
use clap_lex::RawArgs;
use std::{path::PathBuf, process};
use tapboard_config::ModifierBehavior;
use tracing::{error, info};

pub mod backend;
pub mod config;
pub mod input;
pub mod keyboard;
pub mod loader;
mod logger;
pub mod state;

#[derive(Debug, Default)]
struct Args {
    load: Option<PathBuf>,
    dump: bool,
    list: bool,
    modifier_behavior: Option<ModifierBehavior>,
    group: Option<u32>,
}

fn main() {
    if let Err(err) = main_inner() {
        error!("Error occured in main(): {:?}", err);
        eprintln!("tapboard: {:#}", err);
        process::exit(1);
    }
}

fn main_inner() -> Result<()> {
    let git_hash = option_env!("GIT_HASH").unwrap_or("unknown");
    let Some(args) = parse_args(git_hash)? else {
        return Ok(());
    };

    // setup logger
    logger::init_logger()?;
    info!("Tapboard starting up!");

    let mut config = config::Config::load();
    if let Some(behavior) = args.modifier_behavior {
        config.settings.modifier_behavior = behavior;
    }
    if let Some(group) = args.group {
        config.settings.group = group;
    }

    if args.list {
        for name in config.list_layouts() {
            println!("{}", name);
        }
        return Ok(());
    }

    let layout_path = match args.load {
        Some(path) => path,
        None => config
            .find_layout(&config.settings.layout)
            .with_context(|| format!("No layout named {}", config.settings.layout))?,
    };
    let layout = loader::load_file(&layout_path)
        .with_context(|| format!("Failed to load layout {}", layout_path.display()))?;
    info!("Loaded layout {}", layout_path.display());

    if args.dump {
        let yaml = loader::to_yaml(&loader::dump(&layout))?;
        print!("{}", yaml);
        return Ok(());
    }

    // init event loop
    let mut event_loop: EventLoop<state::State> =
        EventLoop::try_new().with_context(|| "Failed to initialize event loop")?;
    let mut state = state::State::new(
        config,
        layout,
        layout_path,
        event_loop.handle(),
        event_loop.get_signal(),
    );
    input::init_stdin_source(&state.event_loop_handle)?;

    // run the event loop
    event_loop.run(None, &mut state, |state| {
        // shall we shut down?
        if state.should_stop {
            info!("Shutting down");
            state.dispatcher.release_all();
            state.event_loop_signal.stop();
            state.event_loop_signal.wakeup();
        }
    })?;

    // drop eventloop & state before logger
    std::mem::drop(event_loop);
    std::mem::drop(state);

    Ok(())
}

/// Returns `None` when the arguments asked for an informational exit.
fn parse_args(git_hash: &str) -> Result<Option<Args>> {
    let raw_args = RawArgs::from_args();
    let mut cursor = raw_args.cursor();
    let mut args = Args::default();

    while let Some(arg) = raw_args.next_os(&mut cursor) {
        let mut value = |name: &str| {
            raw_args
                .next_os(&mut cursor)
                .and_then(|value| value.to_str())
                .map(str::to_owned)
                .ok_or_else(|| anyhow!("{} needs a value", name))
        };
        match arg.to_str() {
            Some("--help") | Some("-h") => {
                print_help(env!("CARGO_PKG_VERSION"), git_hash);
                return Ok(None);
            }
            Some("--version") | Some("-V") => {
                println!(
                    "tapboard {} (git commit {})",
                    env!("CARGO_PKG_VERSION"),
                    git_hash
                );
                return Ok(None);
            }
            Some("--load") | Some("-l") => args.load = Some(value("--load")?.into()),
            Some("--dump") | Some("-d") => args.dump = true,
            Some("--list") | Some("-L") => args.list = true,
            Some("--modifier-behavior") | Some("-m") => {
                let name = value("--modifier-behavior")?;
                args.modifier_behavior = Some(
                    config::parse_modifier_behavior(&name)
                        .with_context(|| format!("Unknown modifier behavior {}", name))?,
                );
            }
            Some("--group") | Some("-g") => {
                let group = value("--group")?;
                args.group = Some(
                    group
                        .parse()
                        .with_context(|| format!("Invalid group {}", group))?,
                );
            }
            _ => bail!("Unknown argument {:?}, see --help", arg),
        }
    }

    Ok(Some(args))
}

fn print_help(version: &str, git_rev: &str) {
    println!(
        r#"tapboard {version} (git commit {git_rev})

An on-screen keyboard core. Reads key events from stdin, one per line
(press/release/tap <keycode>, group <n>, behavior <none|latch|lock>,
release-all, reload [file], quit), and writes what to submit as JSON lines.

Options:
  -h, --help                       Show this message
  -V, --version                    Show the version of tapboard
  -l, --load <file>                Use this layout file instead of the configured one
  -d, --dump                       Print the loaded layout as YAML and exit
  -L, --list                       List the installed layouts and exit
  -m, --modifier-behavior <mode>   One of none, latch, lock
  -g, --group <n>                  Start in this group"#
    );
}
