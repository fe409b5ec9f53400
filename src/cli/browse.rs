//! Line-based directory picker over `DirectoryNavigator`.

use std::sync::Arc;

use anyhow::Result;
use fmclient::navigator::{DirectoryNavigator, NavigatorError};
use tokio::io::{AsyncWriteExt, stdout};

use super::Context;
use super::output::print_navigator;

const HELP: &str = "\
  <n>        open entry n
  up, ..     parent directory
  home       home directory
  roots      filesystem roots
  b <n>      jump to breadcrumb n
  p <path>   type a path (validated before it can be opened)
  s          select the current directory
  q          cancel";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Open(usize),
    Up,
    Home,
    Roots,
    Crumb(usize),
    Path(String),
    Select,
    Quit,
    Help,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    match cmd {
        "up" | ".." => Input::Up,
        "home" | "~" => Input::Home,
        "roots" => Input::Roots,
        "s" | "select" => Input::Select,
        "q" | "quit" => Input::Quit,
        "?" | "h" | "help" => Input::Help,
        "b" => arg.parse().map(Input::Crumb).unwrap_or(Input::Unknown),
        "p" | "path" if !arg.is_empty() => Input::Path(arg.to_string()),
        _ => cmd.parse().map(Input::Open).unwrap_or(Input::Unknown),
    }
}

/// Let the user pick a directory. `None` when they cancel or stdin closes.
pub async fn pick(
    ctx: &Context,
    title: &str,
    initial: Option<&str>,
    include_files: bool,
) -> Result<Option<String>> {
    let api: Arc<dyn fmclient::BrowseApi> = ctx.api.clone();
    let navigator = DirectoryNavigator::new(api).with_files(include_files);
    // Failures are shown from the navigator state
    navigator.open(initial).await.ok();

    println!("{title}  (? for help)");
    loop {
        let state = navigator.state();
        print_navigator(&state);

        let mut out = stdout();
        out.write_all(b"> ").await?;
        out.flush().await?;

        let Some(line) = ctx.read_line().await? else {
            return Ok(None);
        };

        match parse_input(&line) {
            Input::Open(n) => match n.checked_sub(1).and_then(|i| state.entries.get(i)) {
                Some(entry) => {
                    if !navigator.activate(entry).await.unwrap_or(true) {
                        println!("  {} cannot be opened", entry.name);
                    }
                }
                None => println!("  No entry {n}"),
            },
            Input::Up => match state.entries.iter().find(|e| e.parent) {
                Some(parent) => {
                    navigator.activate(parent).await.ok();
                }
                None => println!("  Already at the top"),
            },
            Input::Home => {
                navigator.navigate_home().await.ok();
            }
            Input::Roots => {
                navigator.load_roots().await.ok();
            }
            Input::Crumb(n) => match state.breadcrumbs().get(n) {
                Some(crumb) => {
                    navigator.follow(crumb).await.ok();
                }
                None => println!("  No breadcrumb {n}"),
            },
            Input::Path(path) => {
                navigator.set_manual_path(&path).await;
                navigator.submit_manual_path().await.ok();
            }
            Input::Select => match navigator.select() {
                Ok(path) => return Ok(Some(path)),
                Err(NavigatorError::RootsView) => {
                    println!("  {}", NavigatorError::RootsView)
                }
                Err(NavigatorError::Busy) => println!("  {}", NavigatorError::Busy),
            },
            Input::Quit => return Ok(None),
            Input::Help => println!("{HELP}"),
            Input::Unknown => println!("  Unknown command, ? for help"),
        }
    }
}
