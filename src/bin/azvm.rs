use azvm::cli::{commands, Cli, Commands, VmCommands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    azvm::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => commands::execute_init(args)?,
        Commands::Vm(vm_args) => match vm_args.command {
            VmCommands::New(args) => commands::execute_vm_new(args).await?,
        },
    }

    Ok(())
}
