// forge.rs — Forge subcommands: init, publish, sync.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::bail;
use sb_gateway::publish::resolve_module;
use sb_gateway::{ForgeAdmin, Gateway};
use sb_resolve::RewriteConfig;
use sb_store::StateLayout;

use crate::compose_backend;

pub fn init(layout: &StateLayout, name: &str, timeout_secs: u64, org: &str) -> anyhow::Result<()> {
    let gateway = Gateway::from_saved_config(name, compose_backend(layout)?, layout)?;
    let admin = ForgeAdmin::default();
    gateway.bootstrap_forge(&admin, org, Duration::from_secs(timeout_secs))?;
    println!("forge initialized: {} (org '{org}')", gateway.forge_url());
    Ok(())
}

pub fn publish(
    layout: &StateLayout,
    name: &str,
    module: &str,
    org: &str,
    rewrite: &RewriteConfig,
) -> anyhow::Result<()> {
    let gateway = Gateway::from_saved_config(name, compose_backend(layout)?, layout)?;

    // Source URIs are cloned into the module cache first; plain paths
    // pass through.
    let cache_dir = layout.root().join("modules");
    let module_dir = resolve_module(module, rewrite, &cache_dir)?;

    let url = gateway.publish_module(&module_dir, org, &ForgeAdmin::default())?;
    println!("published: {url}");
    Ok(())
}

pub fn sync(layout: &StateLayout, name: &str, prefix: &str, org: &str) -> anyhow::Result<()> {
    let gateway = Gateway::from_saved_config(name, compose_backend(layout)?, layout)?;
    let admin = ForgeAdmin::default();

    let modules = module_dirs(gateway.workspace_path(), prefix)?;
    if modules.is_empty() {
        bail!(
            "no git module directories under {}",
            gateway.workspace_path().display()
        );
    }

    for module_dir in &modules {
        let url = gateway.publish_module(module_dir, org, &admin)?;
        println!("published: {url}");
    }
    println!("synced {} module(s)", modules.len());
    Ok(())
}

/// Direct subdirectories of the workspace that are git repositories
/// and match the name prefix, sorted for stable output.
fn module_dirs(workspace: &Path, prefix: &str) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(workspace)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() || !path.join(".git").exists() {
            continue;
        }
        let file_name = entry.file_name();
        let dir_name = file_name.to_string_lossy();
        if dir_name.starts_with(prefix) {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
