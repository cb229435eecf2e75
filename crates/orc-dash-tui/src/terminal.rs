// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::AppRuntime;
use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::path::Path;

pub type DashTerminal = Terminal<CrosstermBackend<Stdout>>;

pub fn enter() -> Result<DashTerminal> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

pub fn leave() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    Ok(())
}

/// Gives the terminal to the editor until it exits, then takes it back.
/// The editor's own failure is returned only after the screen is restored.
pub fn hand_off<R: AppRuntime>(
    terminal: &mut DashTerminal,
    runtime: &R,
    path: &Path,
) -> Result<()> {
    leave()?;
    let outcome = runtime.launch_editor(path);

    enable_raw_mode().context("re-enable raw mode")?;
    execute!(terminal.backend_mut(), terminal::EnterAlternateScreen)
        .context("re-enter alternate screen")?;
    terminal.clear().context("clear terminal")?;
    outcome
}
