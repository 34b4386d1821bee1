// shadow.rs — Lifecycle subcommands: start, stop, status, exec, logs, list.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use sb_backend::Service;
use sb_gateway::{Gateway, GatewayError};
use sb_store::{ConfigStore, StateLayout};

use crate::compose_backend;

pub fn start(layout: &StateLayout, name: &str, workspace: &Path, port: u16) -> anyhow::Result<()> {
    let workspace = workspace
        .canonicalize()
        .with_context(|| format!("workspace {} not found", workspace.display()))?;
    let gateway = Gateway::new(name, &workspace, port, compose_backend(layout)?, layout)?;
    let result = gateway.activate()?;
    println!("{}", result.stdout);
    println!("forge: {}", gateway.forge_url());
    Ok(())
}

pub fn stop(layout: &StateLayout, name: &str, purge: bool) -> anyhow::Result<()> {
    let gateway = saved_or_detached(layout, name)?;
    let result = gateway.deactivate(purge)?;
    println!("{}", result.stdout);
    Ok(())
}

pub fn status(layout: &StateLayout, name: &str) -> anyhow::Result<()> {
    let configs = ConfigStore::new(layout.config_dir())?;
    let backend = compose_backend(layout)?;
    let running = backend.is_running(name);

    match configs.get(name)? {
        Some(config) => {
            println!("shadow:    {name}");
            println!("state:     {}", if running { "running" } else { "stopped" });
            println!("workspace: {}", config.workspace_path.display());
            println!("forge:     http://localhost:{}", config.forge_port);
        }
        None if running => {
            println!("shadow:    {name}");
            println!("state:     running (no saved config — activation incomplete?)");
        }
        None => bail!("unknown shadow '{name}'"),
    }
    Ok(())
}

pub fn exec(layout: &StateLayout, name: &str, command: &str, timeout_secs: u64) -> anyhow::Result<()> {
    let gateway = Gateway::from_saved_config(name, compose_backend(layout)?, layout)?;
    let result = gateway.run_command(command, Duration::from_secs(timeout_secs))?;

    print!("{}", result.stdout);
    eprint!("{}", result.stderr);
    if result.is_timeout() {
        std::process::exit(124);
    }
    if !result.success() {
        std::process::exit(result.status_code);
    }
    Ok(())
}

pub fn logs(layout: &StateLayout, name: &str, service: &str, tail: u32) -> anyhow::Result<()> {
    let service = parse_service(service)?;
    let gateway = saved_or_detached(layout, name)?;
    let result = gateway.logs(service, tail)?;
    print!("{}", result.stdout);
    Ok(())
}

pub fn list(layout: &StateLayout) -> anyhow::Result<()> {
    let configs = ConfigStore::new(layout.config_dir())?;
    let backend = compose_backend(layout)?;
    let shadows = configs.known_shadows()?;
    if shadows.is_empty() {
        println!("No shadows. Create one with `sbx start <name>`.");
        return Ok(());
    }
    for name in shadows {
        let state = if backend.is_running(&name) {
            "running"
        } else {
            "stopped"
        };
        match configs.get(&name)? {
            Some(config) => println!(
                "{name}  [{state}]  {}  port {}",
                config.workspace_path.display(),
                config.forge_port
            ),
            None => println!("{name}  [{state}]"),
        }
    }
    Ok(())
}

fn parse_service(name: &str) -> anyhow::Result<Service> {
    match name {
        "workspace" => Ok(Service::Workspace),
        "forge" => Ok(Service::Forge),
        other => bail!("unknown service '{other}' (expected 'workspace' or 'forge')"),
    }
}

/// Prefer the saved config; fall back to a detached handle so stop and
/// logs still work for a shadow whose activation never completed.
fn saved_or_detached(layout: &StateLayout, name: &str) -> anyhow::Result<Gateway> {
    match Gateway::from_saved_config(name, compose_backend(layout)?, layout) {
        Ok(gateway) => Ok(gateway),
        Err(GatewayError::NoConfig(_)) => {
            Ok(Gateway::new(name, ".", 3000, compose_backend(layout)?, layout)?)
        }
        Err(err) => Err(err.into()),
    }
}
