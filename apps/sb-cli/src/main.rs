//! # sb-cli
//!
//! Command-line interface for Shadowbox.
//!
//! Manages shadow environments — disposable mirrors of a host
//! workspace running in containers:
//! - `sbx start/stop/status/list` — lifecycle
//! - `sbx exec/logs` — run commands and inspect services
//! - `sbx diff/promote` — review and adopt shadow changes
//! - `sbx init/publish/sync` — forge bootstrap and module publishing
//! - `sbx cleanup/platform` — housekeeping and host readiness

mod commands;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sb_backend::{Backend, ComposeBackend};
use sb_resolve::{RewriteConfig, DEFAULT_ORG};
use sb_store::StateLayout;
use tracing_subscriber::EnvFilter;

/// Compose definition materialized into the state directory on first
/// use. `name:` scopes volumes and networks per shadow; the workspace
/// container advertises the in-network forge as its rewrite target.
const COMPOSE_TEMPLATE: &str = r#"name: ${SHADOW_NAME}

services:
  workspace:
    image: ${WORKSPACE_IMAGE:-ubuntu:24.04}
    container_name: ${SHADOW_NAME}-workspace
    command: sleep infinity
    working_dir: /workspace
    environment:
      SHADOWBOX_GIT_HOST: forge:3000
    volumes:
      - workspace-data:/workspace
    networks:
      - shadow

  forge:
    image: gitea/gitea:1.22
    container_name: ${SHADOW_NAME}-forge
    environment:
      - GITEA__security__INSTALL_LOCK=true
      - GITEA__server__HTTP_PORT=3000
    ports:
      - "${FORGE_PORT:-3000}:3000"
    volumes:
      - forge-data:/data
    networks:
      - shadow

volumes:
  workspace-data:
  forge-data:

networks:
  shadow:
"#;

/// Shadowbox CLI — disposable workspace mirrors with a local forge.
#[derive(Parser)]
#[command(name = "sbx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a shadow and mirror a workspace into it.
    Start {
        /// Shadow name.
        name: String,
        /// Host workspace to mirror (defaults to current directory).
        #[arg(long, default_value = ".")]
        workspace: PathBuf,
        /// Host port for the shadow's forge.
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Stop a shadow.
    Stop {
        /// Shadow name.
        name: String,
        /// Also destroy volumes and saved state.
        #[arg(long)]
        purge: bool,
    },
    /// Show a shadow's status.
    Status {
        /// Shadow name.
        name: String,
    },
    /// Run a shell command inside a shadow's workspace.
    Exec {
        /// Shadow name.
        name: String,
        /// Command to run (single shell string).
        command: String,
        /// Seconds before the command is killed.
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
    /// Show recent log lines from a shadow service.
    Logs {
        /// Shadow name.
        name: String,
        /// Service: "workspace" or "forge".
        #[arg(long, default_value = "workspace")]
        service: String,
        /// Number of trailing lines.
        #[arg(long, default_value_t = 100)]
        tail: u32,
    },
    /// List known shadows.
    List,
    /// Show workspace changes since activation.
    Diff {
        /// Shadow name.
        name: String,
    },
    /// Copy shadow changes back over the host workspace.
    Promote {
        /// Shadow name.
        name: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
    /// Bootstrap the shadow's forge: admin user, API token, org.
    Init {
        /// Shadow name.
        name: String,
        /// Seconds to wait for the forge to come up.
        #[arg(long, default_value_t = 120)]
        timeout: u64,
        /// Organization to create for published modules.
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
    },
    /// Publish a module to the shadow's forge.
    Publish {
        /// Shadow name.
        name: String,
        /// Module: a local path or a `git+<url>[@ref]` source URI.
        module: String,
        /// Organization to publish under.
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
    },
    /// Publish every git module directory under the workspace.
    Sync {
        /// Shadow name.
        name: String,
        /// Only directories whose name starts with this prefix.
        #[arg(long, default_value = "")]
        prefix: String,
        /// Organization to publish under.
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
    },
    /// Remove state left behind by deleted shadows.
    Cleanup {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Report host readiness: docker, compose, git.
    Platform,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sbx=info".parse()?)
                .add_directive("sb_gateway=info".parse()?)
                .add_directive("sb_backend=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let layout = StateLayout::default_home()?;
    tracing::debug!(state_root = %layout.root().display(), "state layout resolved");
    // The rewrite target is read from the environment exactly once,
    // here at the edge; the resolver itself only ever sees the value.
    let rewrite = RewriteConfig::new(std::env::var("SHADOWBOX_GIT_HOST").ok());

    match cli.command {
        Commands::Start {
            name,
            workspace,
            port,
        } => commands::shadow::start(&layout, &name, &workspace, port),
        Commands::Stop { name, purge } => commands::shadow::stop(&layout, &name, purge),
        Commands::Status { name } => commands::shadow::status(&layout, &name),
        Commands::Exec {
            name,
            command,
            timeout,
        } => commands::shadow::exec(&layout, &name, &command, timeout),
        Commands::Logs {
            name,
            service,
            tail,
        } => commands::shadow::logs(&layout, &name, &service, tail),
        Commands::List => commands::shadow::list(&layout),
        Commands::Diff { name } => commands::mirror::diff(&layout, &name),
        Commands::Promote { name, force } => commands::mirror::promote(&layout, &name, force),
        Commands::Init { name, timeout, org } => {
            commands::forge::init(&layout, &name, timeout, &org)
        }
        Commands::Publish { name, module, org } => {
            commands::forge::publish(&layout, &name, &module, &org, &rewrite)
        }
        Commands::Sync { name, prefix, org } => {
            commands::forge::sync(&layout, &name, &prefix, &org)
        }
        Commands::Cleanup { yes } => commands::cleanup::run(&layout, yes),
        Commands::Platform => commands::platform::report(),
    }
}

/// Backend bound to the compose file in the state directory, written
/// from the embedded template on first use.
pub(crate) fn compose_backend(layout: &StateLayout) -> anyhow::Result<Box<dyn Backend>> {
    let compose_file = layout.root().join("docker-compose.yml");
    if !compose_file.exists() {
        fs::create_dir_all(layout.root())
            .with_context(|| format!("creating {}", layout.root().display()))?;
        fs::write(&compose_file, COMPOSE_TEMPLATE)
            .with_context(|| format!("writing {}", compose_file.display()))?;
    }
    Ok(Box::new(ComposeBackend::new(compose_file)))
}
