use anyhow::{Context, Result};

use crate::cli::auth::{resolve_access_token, resolve_subscription};
use crate::cli::config::try_load_config;
use crate::cli::NewVmArgs;
use crate::compute::{ComputeClient, VmProfile};
use crate::handler::{build_virtual_machine, execute_new_vm, NewVmRequest};

pub async fn execute_vm_new(args: NewVmArgs) -> Result<()> {
    let profile = VmProfile::load(&args.profile)?;

    let request = NewVmRequest {
        resource_group: args.resource_group,
        name: args.name,
        location: args.location,
        profile: &profile,
        availability_set_id: args.availability_set_id,
        provision_vm_agent: args.provision_vm_agent,
    };

    if args.dry_run {
        let vm = build_virtual_machine(&request)?;
        println!("{}", serde_json::to_string_pretty(&vm)?);
        return Ok(());
    }

    let config = try_load_config()?;
    let subscription_id = resolve_subscription(args.subscription, config.as_ref())?;
    let token = resolve_access_token()?;
    let options = config.unwrap_or_default().client_options();

    let client = ComputeClient::new(subscription_id, token, options)?;

    eprintln!("==> Creating virtual machine");
    eprintln!("    Subscription:   {}", client.subscription_id());
    eprintln!("    Resource Group: {}", request.resource_group);
    eprintln!("    Name:           {}", request.name);
    eprintln!("    Location:       {}", request.location);

    let response = execute_new_vm(&client, &request)
        .await
        .with_context(|| format!("Failed to create virtual machine '{}'", request.name))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
