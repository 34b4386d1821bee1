// publish.rs — Module publishing and source resolution against the forge.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use sb_resolve::{Resolution, RewriteConfig, SourceReference};
use serde_json::json;

use crate::bootstrap::ForgeAdmin;
use crate::error::GatewayError;
use crate::gateway::Gateway;

impl Gateway {
    /// Push a local git module to the shadow's forge under `org`,
    /// creating the repository if needed.
    pub fn publish_module(
        &self,
        module_dir: &Path,
        org: &str,
        admin: &ForgeAdmin,
    ) -> Result<String, GatewayError> {
        if !self.is_active() {
            return Err(GatewayError::NotRunning(self.shadow().to_string()));
        }
        if !module_dir.join(".git").exists() {
            return Err(GatewayError::Git(format!(
                "{} is not a git repository",
                module_dir.display()
            )));
        }

        let name = module_name(module_dir)?;
        self.ensure_repo(org, &name)?;

        // Authenticated remote over the host port. The forge serves
        // plain http, so the local clone must not demand TLS.
        let remote_url = format!(
            "http://{}:{}@localhost:{}/{}/{}.git",
            admin.user,
            admin.password,
            self.forge_port(),
            org,
            name
        );
        git(module_dir, &["config", "--local", "http.sslVerify", "false"])?;
        if git(module_dir, &["remote", "get-url", "shadow"]).is_ok() {
            git(module_dir, &["remote", "set-url", "shadow", &remote_url])?;
        } else {
            git(module_dir, &["remote", "add", "shadow", &remote_url])?;
        }

        let branch = git(module_dir, &["branch", "--show-current"])?;
        let branch = if branch.is_empty() {
            "main"
        } else {
            branch.as_str()
        };
        git(
            module_dir,
            &["push", "-f", "shadow", &format!("{branch}:main")],
        )?;

        // Consumers inside the shadow fetch through the in-network
        // forge host, so that is the URL worth handing back.
        let published = format!("{}/{}/{}", self.forge_internal_url(), org, name);
        tracing::info!(module = %name, url = %published, "module published");
        Ok(published)
    }

    fn ensure_repo(&self, org: &str, name: &str) -> Result<(), GatewayError> {
        let client = self.forge_client()?;
        if !client.has_token() {
            return Err(self.auth_failure());
        }

        let existing = client.get(&format!("/repos/{org}/{name}"))?;
        if existing.is_ok() {
            return Ok(());
        }

        let payload = json!({
            "name": name,
            "private": false,
            "auto_init": false,
        });
        let created = client.post(&format!("/orgs/{org}/repos"), &payload)?;
        if created.is_unauthorized() {
            return Err(self.auth_failure());
        }
        if created.status == 404 {
            return Err(GatewayError::Git(format!(
                "organization '{org}' not found; run `sbx init {}` first",
                self.shadow()
            )));
        }
        if !created.is_ok_or_conflict() {
            return Err(GatewayError::Forge {
                status: created.status,
                body: created.body,
            });
        }
        Ok(())
    }
}

/// Resolve a module spec to a local directory.
///
/// Local paths pass through untouched. Remote references are cloned
/// shallowly from their rewrite-derived URL into `cache_dir`, and a
/// lock record is written beside the clone. The lock always carries
/// the canonical source URI, never the rewritten fetch URL, so a
/// clone made inside one shadow stays meaningful outside it.
pub fn resolve_module(
    spec: &str,
    rewrite: &RewriteConfig,
    cache_dir: &Path,
) -> Result<PathBuf, GatewayError> {
    match Resolution::of(spec)? {
        Resolution::Resolved(path) => Ok(path),
        Resolution::Unresolved(reference) => clone_reference(&reference, rewrite, cache_dir),
    }
}

fn clone_reference(
    reference: &SourceReference,
    rewrite: &RewriteConfig,
    cache_dir: &Path,
) -> Result<PathBuf, GatewayError> {
    fs::create_dir_all(cache_dir)?;
    let dest = cache_dir.join(reference.name());
    if dest.exists() {
        fs::remove_dir_all(&dest)?;
    }

    let fetch_url = reference.effective_url(rewrite);
    let mut args = vec!["clone", "--depth", "1"];
    if let Some(ref_name) = &reference.ref_name {
        args.push("--branch");
        args.push(ref_name);
    }
    args.push(&fetch_url);
    let dest_str = dest.display().to_string();
    args.push(&dest_str);
    git(cache_dir, &args)?;

    let lock = json!({
        "source": reference.canonical_uri(),
        "name": reference.name(),
    });
    let lock_path = cache_dir.join(format!("{}.lock.json", reference.name()));
    fs::write(&lock_path, serde_json::to_string_pretty(&lock)?)?;

    tracing::debug!(source = %reference.canonical_uri(), dest = %dest.display(), "module cloned");
    Ok(dest)
}

fn module_name(module_dir: &Path) -> Result<String, GatewayError> {
    module_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            GatewayError::Git(format!(
                "cannot derive module name from {}",
                module_dir.display()
            ))
        })
}

/// Run a git command in `dir`, returning trimmed stdout.
fn git(dir: &Path, args: &[&str]) -> Result<String, GatewayError> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GatewayError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
