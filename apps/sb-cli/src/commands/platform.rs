// platform.rs — Host readiness report: docker, compose, git.

use std::fs;
use std::process::Command;

pub fn report() -> anyhow::Result<()> {
    println!("platform: {}{}", std::env::consts::OS, platform_suffix());

    let docker = which::which("docker").is_ok();
    let compose = docker && compose_available();
    let git = which::which("git").is_ok();

    println!("docker:   {}", if docker { "ok" } else { "missing" });
    println!("compose:  {}", if compose { "ok" } else { "missing" });
    println!("git:      {}", if git { "ok" } else { "missing" });

    if !docker {
        println!("\ninstall docker: https://docs.docker.com/get-docker/");
    } else if !compose {
        println!("\ndocker is present but `docker compose` is not; install the compose plugin");
    }
    if !git {
        println!("install git to publish modules");
    }
    if in_codespaces() {
        println!("\nnote: running in Codespaces; forge ports must be forwarded to be reachable");
    }
    Ok(())
}

fn platform_suffix() -> &'static str {
    if in_wsl() {
        " (WSL)"
    } else if in_codespaces() {
        " (Codespaces)"
    } else {
        ""
    }
}

/// WSL kernels identify themselves in /proc/version.
fn in_wsl() -> bool {
    fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

fn in_codespaces() -> bool {
    std::env::var("CODESPACES").is_ok()
}

/// Compose v2 ships as a docker plugin; probe the subcommand itself.
fn compose_available() -> bool {
    Command::new("docker")
        .args(["compose", "version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
