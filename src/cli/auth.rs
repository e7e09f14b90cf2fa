use anyhow::{bail, Context, Result};
use std::env;
use std::process::Command;

use super::config::Config;

const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

/// Execute az CLI command and return trimmed stdout
fn run_az(args: &[&str]) -> Result<String> {
    let output = Command::new("az")
        .args(args)
        .output()
        .context("Failed to execute az command. Is Azure CLI installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("az command failed: {}", stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Resolve the subscription: explicit value, then config, then `az account show`.
///
/// `AZURE_SUBSCRIPTION_ID` is read by clap into the explicit value.
pub fn resolve_subscription(explicit: Option<String>, config: Option<&Config>) -> Result<String> {
    if let Some(id) = pick_subscription(explicit, config) {
        return Ok(id);
    }

    tracing::debug!("no subscription configured, asking az CLI");
    run_az(&["account", "show", "--query", "id", "-o", "tsv"])
        .context("Failed to get subscription ID. Pass --subscription or run 'az login' first.")
}

fn pick_subscription(explicit: Option<String>, config: Option<&Config>) -> Option<String> {
    explicit
        .filter(|id| !id.trim().is_empty())
        .or_else(|| config.and_then(|c| c.subscription_id.clone()))
}

/// Resolve a bearer token for Resource Manager: `AZURE_ACCESS_TOKEN`, then the az CLI
pub fn resolve_access_token() -> Result<String> {
    if let Ok(token) = env::var("AZURE_ACCESS_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    tracing::debug!("AZURE_ACCESS_TOKEN not set, asking az CLI");
    let token = run_az(&[
        "account",
        "get-access-token",
        "--resource",
        MANAGEMENT_RESOURCE,
        "--query",
        "accessToken",
        "-o",
        "tsv",
    ])
    .context("Failed to get an access token. Set AZURE_ACCESS_TOKEN or run 'az login'.")?;

    if token.is_empty() {
        bail!("az CLI returned an empty access token. Run 'az login'.");
    }
    Ok(token)
}
