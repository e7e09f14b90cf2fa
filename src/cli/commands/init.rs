use anyhow::{bail, Result};
use std::path::Path;

use crate::cli::config::{Config, CONFIG_FILENAME};
use crate::cli::InitArgs;

pub fn execute_init(args: InitArgs) -> Result<()> {
    if Path::new(CONFIG_FILENAME).exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            CONFIG_FILENAME
        );
    }

    let config = Config {
        subscription_id: args.subscription,
        location: args.location,
        endpoint: args.endpoint.map(|e| e.trim_end_matches('/').to_string()),
        api_version: args.api_version,
    };

    config.save()?;

    eprintln!("Created {}", CONFIG_FILENAME);
    if let Some(ref id) = config.subscription_id {
        eprintln!("  subscription_id: {}", id);
    }
    if let Some(ref location) = config.location {
        eprintln!("  location: {}", location);
    }
    if let Some(ref endpoint) = config.endpoint {
        eprintln!("  endpoint: {}", endpoint);
    }
    if let Some(ref version) = config.api_version {
        eprintln!("  api_version: {}", version);
    }
    eprintln!();
    eprintln!("Next: azvm vm new <RESOURCE_GROUP> <NAME> <LOCATION> <PROFILE>");

    Ok(())
}
