// bootstrap.rs — One-time forge initialization for a shadow.
//
// Creates the admin account, mints an API token, and ensures the
// shared organization exists. Every step tolerates having already run:
// re-initializing a shadow is a no-op beyond refreshing the token.

use std::time::Duration;

use sb_backend::Service;
use serde_json::json;

use crate::error::GatewayError;
use crate::gateway::Gateway;

const ADMIN_CMD_TIMEOUT: Duration = Duration::from_secs(60);

/// Forge admin identity. The forge only ever talks to localhost on the
/// shadow's network, so fixed development credentials are fine.
#[derive(Debug, Clone)]
pub struct ForgeAdmin {
    pub user: String,
    pub password: String,
    pub email: String,
}

impl Default for ForgeAdmin {
    fn default() -> Self {
        Self {
            user: "shadow-admin".to_string(),
            password: "shadow-admin".to_string(),
            email: "shadow@amplifier.local".to_string(),
        }
    }
}

impl Gateway {
    /// Initialize the forge: admin user, stored API token, and the
    /// module organization. `ready_deadline` bounds the startup wait.
    pub fn bootstrap_forge(
        &self,
        admin: &ForgeAdmin,
        org: &str,
        ready_deadline: Duration,
    ) -> Result<(), GatewayError> {
        if !self.is_active() {
            return Err(GatewayError::NotRunning(self.shadow().to_string()));
        }

        let client = self.forge_client()?;
        client.wait_ready(ready_deadline)?;

        self.create_admin_user(admin)?;
        let token = self.generate_token(admin)?;
        self.credentials().put(self.shadow(), &token)?;

        // Re-read the client so the org call carries the fresh token.
        let client = self.forge_client()?;
        let payload = json!({
            "username": org,
            "visibility": "public",
            "full_name": format!("{org} modules"),
        });
        let response = client.post("/orgs", &payload)?;
        if response.is_unauthorized() {
            return Err(self.auth_failure());
        }
        if !response.is_ok_or_conflict() {
            return Err(GatewayError::Forge {
                status: response.status,
                body: response.body,
            });
        }

        tracing::info!(shadow = %self.shadow(), org, "forge bootstrapped");
        Ok(())
    }

    fn create_admin_user(&self, admin: &ForgeAdmin) -> Result<(), GatewayError> {
        let command = format!(
            "gitea admin user create --admin --username {} --password {} \
             --email {} --must-change-password=false",
            admin.user, admin.password, admin.email
        );
        let result = self
            .backend()
            .exec(self.shadow(), Service::Forge, &command, ADMIN_CMD_TIMEOUT)?;
        if result.success() || result.stderr.contains("already exists") {
            return Ok(());
        }
        Err(GatewayError::OperationFailed {
            op: "create admin user",
            result,
        })
    }

    fn generate_token(&self, admin: &ForgeAdmin) -> Result<String, GatewayError> {
        let command = format!(
            "gitea admin user generate-access-token --username {} \
             --token-name shadow-token-{} --scopes all",
            admin.user,
            std::process::id()
        );
        let result = self
            .backend()
            .exec(self.shadow(), Service::Forge, &command, ADMIN_CMD_TIMEOUT)?;
        if !result.success() {
            return Err(GatewayError::OperationFailed {
                op: "generate access token",
                result,
            });
        }
        parse_token(&result.stdout).ok_or(GatewayError::OperationFailed {
            op: "parse access token",
            result,
        })
    }
}

/// Pull the token out of the CLI's human-oriented output. The token
/// line ends with `: <token>` where the token is a long hex string.
fn parse_token(stdout: &str) -> Option<String> {
    for line in stdout.lines().rev() {
        if let Some((_, candidate)) = line.rsplit_once(": ") {
            let candidate = candidate.trim();
            if candidate.len() > 20 && !candidate.contains(' ') {
                return Some(candidate.to_string());
            }
        }
    }
    None
}
