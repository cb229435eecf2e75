// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use orc_dash_app::{Dashboard, DashboardOptions, EntityId};
use orc_dash_tui::TuiOptions;
use runtime::ProcessRuntime;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `orc-dash --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    let tui_options = TuiOptions {
        refresh_interval: config.refresh_interval()?,
        status_duration: config.status_duration()?,
        frame_duration: config.frame_duration()?,
    };
    let log_path = config.log_path()?;
    if options.check_only {
        return Ok(());
    }

    logging::init_file_logging(&log_path, config.log_level())?;

    let runtime = ProcessRuntime::from_config(&config, options.demo);
    let host_session = !options.demo && runtime::detect_host_session();
    info!(
        demo = options.demo,
        host_session,
        focused = ?options.focused,
        "starting dashboard"
    );

    let dashboard = Dashboard::new(DashboardOptions {
        focused: options.focused,
        host_session,
        seed: session_seed(),
    });
    orc_dash_tui::run_app(dashboard, Arc::new(runtime), tui_options)
}

fn session_seed() -> u64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as u64
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    focused: Option<EntityId>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        focused: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--focused" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--focused requires an entity id"))?;
                options.focused = Some(
                    EntityId::parse(value.as_ref()).context("invalid --focused value")?,
                );
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("orc-dash: interactive orchestration summary");
    println!("  --config <path>          Use a specific config path");
    println!("  --focused <ID>           Entity currently in focus (e.g. SHIP-412)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Browse a built-in sample tree; actions are no-ops");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
}
