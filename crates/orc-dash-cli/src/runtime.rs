// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow, bail};
use orc_dash_app::EntityId;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

const BENCH_VARIABLE: &str = "ORC_BENCH_ID";
const HOST_SESSION_VARIABLE: &str = "ORC_UTILS_SESSION";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Process {
        program: String,
        summary_args: Vec<String>,
    },
    /// Fixture tree; mutations succeed without touching anything.
    Demo,
}

/// `AppRuntime` backed by external processes: the `orc` CLI, the clipboard
/// helper, tmux, and the operator's editor.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    source: Source,
    clipboard: Option<Vec<String>>,
    editor: Option<String>,
}

impl ProcessRuntime {
    pub fn from_config(config: &Config, demo: bool) -> Self {
        let source = if demo {
            Source::Demo
        } else {
            Source::Process {
                program: config.program().to_owned(),
                summary_args: config.summary_args(),
            }
        };
        Self {
            source,
            clipboard: config.clipboard().map(<[String]>::to_vec),
            editor: config.editor().map(str::to_owned),
        }
    }

    fn source_output(&self, args: &[&str]) -> Result<Option<String>> {
        match &self.source {
            Source::Process { program, .. } => {
                let mut command = Command::new(program);
                command.args(args);
                run_output(&mut command, &format!("{program} {}", args.join(" "))).map(Some)
            }
            Source::Demo => {
                debug!(args = ?args, "demo mode skips source command");
                Ok(None)
            }
        }
    }

    fn clipboard_candidates(&self) -> Vec<Vec<String>> {
        match &self.clipboard {
            Some(command) => vec![command.clone()],
            None => default_clipboards(),
        }
    }
}

impl orc_dash_tui::AppRuntime for ProcessRuntime {
    fn fetch_summary(&self) -> Result<String> {
        match &self.source {
            Source::Process {
                program,
                summary_args,
            } => {
                let mut command = Command::new(program);
                command.args(summary_args);
                run_output(
                    &mut command,
                    &format!("{program} {}", summary_args.join(" ")),
                )
            }
            Source::Demo => Ok(orc_dash_testkit::demo_summary()),
        }
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let candidates = self.clipboard_candidates();
        for argv in &candidates {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            let spawned = Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            let mut child = match spawned {
                Ok(child) => child,
                Err(error) if error.kind() == io::ErrorKind::NotFound => {
                    debug!(program, "clipboard helper not installed");
                    continue;
                }
                Err(error) => {
                    return Err(error).with_context(|| format!("start clipboard helper {program}"));
                }
            };

            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(text.as_bytes())
                    .with_context(|| format!("write to {program}"))?;
            }
            let status = child
                .wait()
                .with_context(|| format!("wait for {program}"))?;
            if !status.success() {
                bail!("{program}: {status}");
            }
            return Ok(());
        }

        let tried = candidates
            .iter()
            .filter_map(|argv| argv.first().cloned())
            .collect::<Vec<String>>();
        bail!(
            "no clipboard command found (tried {}); set [actions].clipboard",
            tried.join(", ")
        )
    }

    fn focus(&self, entity: &EntityId) -> Result<()> {
        self.source_output(&["focus", entity.as_str()])?;
        Ok(())
    }

    fn clear_focus(&self) -> Result<()> {
        self.source_output(&["focus", "--clear"])?;
        Ok(())
    }

    fn close(&self, entity: &EntityId) -> Result<()> {
        let subcommand = entity
            .close_subcommand()
            .ok_or_else(|| anyhow!("{entity} cannot be closed"))?;
        self.source_output(&[subcommand, "complete", entity.as_str()])?;
        Ok(())
    }

    fn send_to_pane(&self, entity: &EntityId) -> Result<()> {
        let bench = tmux_environment(BENCH_VARIABLE);
        if bench.is_none() {
            warn!(entity_id = %entity, "{BENCH_VARIABLE} not set, using unscoped goblin filter");
        }
        let filter = goblin_filter(bench.as_deref());

        let mut list = Command::new("tmux");
        list.args(["list-panes", "-a", "-f", &filter, "-F", "#{pane_id}"])
            .env_remove("TMUX");
        let panes = run_output(&mut list, "tmux list-panes").context("find goblin pane")?;
        let pane = panes
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| anyhow!("no goblin pane found"))?;

        info!(entity_id = %entity, pane, bench = ?bench, "sending to goblin");
        let mut send = Command::new("tmux");
        send.args(["send-keys", "-t", pane, entity.as_str(), "Space"])
            .env_remove("TMUX");
        run_output(&mut send, "tmux send-keys").context("send-keys to goblin")?;
        Ok(())
    }

    fn write_detail(&self, entity: &EntityId) -> Result<PathBuf> {
        let subcommand = entity
            .show_subcommand()
            .ok_or_else(|| anyhow!("{entity} has no detail view"))?;
        let content = self
            .source_output(&[subcommand, "show", entity.as_str()])?
            .unwrap_or_else(|| format!("{entity}\n\nDemo mode has no detail source.\n"));

        let mut scratch = tempfile::Builder::new()
            .prefix(&format!("{entity}-"))
            .suffix(".txt")
            .tempfile()
            .context("create scratch file")?;
        scratch
            .write_all(content.as_bytes())
            .context("write scratch file")?;
        let path = scratch
            .into_temp_path()
            .keep()
            .context("keep scratch file")?;
        debug!(entity_id = %entity, path = %path.display(), "detail written");
        Ok(path)
    }

    fn launch_editor(&self, path: &Path) -> Result<()> {
        let argv = editor_command(
            self.editor.as_deref(),
            env::var("VISUAL").ok(),
            env::var("EDITOR").ok(),
        );
        let Some((program, args)) = argv.split_first() else {
            bail!("no editor configured");
        };
        let status = Command::new(program)
            .args(args)
            .arg(path)
            .status()
            .with_context(|| format!("start editor {program}"))?;
        if !status.success() {
            bail!("{program}: {status}");
        }
        Ok(())
    }

    fn detach_host_session(&self) -> Result<()> {
        let mut command = Command::new("tmux");
        command.arg("detach-client");
        run_output(&mut command, "tmux detach-client")?;
        Ok(())
    }
}

/// True when the tmux session carries the utility-popup marker.
pub fn detect_host_session() -> bool {
    let output = Command::new("tmux")
        .args(["show-environment", HOST_SESSION_VARIABLE])
        .output();
    match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).contains(&format!("{HOST_SESSION_VARIABLE}="))
        }
        _ => false,
    }
}

fn run_output(command: &mut Command, label: &str) -> Result<String> {
    debug!(command = label, "running");
    let output = command.output().with_context(|| format!("run {label}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        if detail.is_empty() {
            bail!("{label}: {}", output.status);
        }
        bail!("{label}: {}: {detail}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn tmux_environment(name: &str) -> Option<String> {
    let output = Command::new("tmux")
        .args(["show-environment", name])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    environment_value(&String::from_utf8_lossy(&output.stdout), name)
}

/// Reads `NAME=value` from `tmux show-environment` output. A `-NAME` line
/// means the variable was removed.
fn environment_value(output: &str, name: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let value = line.trim().strip_prefix(name)?.strip_prefix('=')?;
        (!value.is_empty()).then(|| value.to_owned())
    })
}

fn goblin_filter(bench: Option<&str>) -> String {
    match bench {
        Some(bench) => {
            format!("#{{&&:#{{==:#{{@pane_role}},goblin}},#{{==:#{{@bench_id}},{bench}}}}}")
        }
        None => "#{==:#{@pane_role},goblin}".to_owned(),
    }
}

fn default_clipboards() -> Vec<Vec<String>> {
    let owned = |argv: &[&str]| argv.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>();
    if cfg!(target_os = "macos") {
        return vec![owned(&["pbcopy"])];
    }
    let mut candidates = Vec::new();
    if env::var_os("WAYLAND_DISPLAY").is_some() {
        candidates.push(owned(&["wl-copy"]));
    }
    candidates.push(owned(&["xclip", "-selection", "clipboard"]));
    candidates.push(owned(&["xsel", "--clipboard", "--input"]));
    candidates
}

fn editor_command(
    configured: Option<&str>,
    visual: Option<String>,
    editor: Option<String>,
) -> Vec<String> {
    let chosen = configured
        .map(str::to_owned)
        .or(visual)
        .filter(|value| !value.trim().is_empty())
        .or_else(|| editor.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_owned());
    chosen.split_whitespace().map(str::to_owned).collect()
}
