pub mod auth;
pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "azvm")]
#[command(about = "Create Azure virtual machines from local profile files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a .azvm.toml config in the current directory
    Init(InitArgs),
    /// Manage virtual machines
    Vm(VmArgs),
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Subscription ID used when none is given on the command line
    #[arg(long)]
    pub subscription: Option<String>,

    /// Default location
    #[arg(long)]
    pub location: Option<String>,

    /// Resource Manager endpoint (sovereign clouds, test servers)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Compute API version
    #[arg(long)]
    pub api_version: Option<String>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct VmArgs {
    #[command(subcommand)]
    pub command: VmCommands,
}

#[derive(Subcommand)]
pub enum VmCommands {
    /// Create or update a virtual machine
    New(NewVmArgs),
}

#[derive(clap::Args)]
pub struct NewVmArgs {
    /// The resource group name
    pub resource_group: String,

    /// The VM (resource) name
    pub name: String,

    /// The location
    pub location: String,

    /// Path to the VM profile (TOML, or JSON with a .json extension)
    pub profile: PathBuf,

    /// The availability set ID
    pub availability_set_id: Option<String>,

    /// Provision the VM agent (true or false); omitted leaves the profile's setting
    pub provision_vm_agent: Option<bool>,

    /// Subscription ID (falls back to AZURE_SUBSCRIPTION_ID, .azvm.toml, then az CLI)
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Print the request body instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}
