use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use jsonblob_registry::{file_for, ListFilter};
use jsonblob_server::{JsonBlobServer, MachineRepository, ServerConfig};
use jsonblob_types::{Machine, ResourceIdentity, ResourceKey};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(load_config(&cli.config)?, args),
        Command::Get(args) => cmd_get(&*repository(&cli.config)?, args, format),
        Command::List(args) => cmd_list(&*repository(&cli.config)?, args, format),
        Command::Delete(args) => cmd_delete(&*repository(&cli.config)?, args, format),
        Command::Path(args) => {
            println!("{}", blob_path(&args)?);
            Ok(())
        }
    }
}

fn load_config(path: &Option<std::path::PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => {
            ServerConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(ServerConfig::default()),
    }
}

fn repository(path: &Option<std::path::PathBuf>) -> anyhow::Result<Arc<MachineRepository>> {
    let config = load_config(path)?;
    debug!(storage = ?config.storage, "opening bucket");
    let server = JsonBlobServer::new(config)?;
    Ok(Arc::clone(server.machines()))
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!("jsonblob server on {}", config.bind_addr.to_string().bold());
    let server = JsonBlobServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_get(repo: &MachineRepository, args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let machine = repo.get(&ResourceKey::cluster(args.name))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&machine)?),
        OutputFormat::Text => print_machine(&machine),
    }
    Ok(())
}

fn cmd_list(repo: &MachineRepository, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let filter = match args.selector {
        Some(selector) => ListFilter::parse(&selector)?,
        None => ListFilter::everything(),
    };
    let list = repo.list(None, &filter)?;
    debug!(filter = %filter, count = list.items.len(), "listed machines");
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Text => {
            if list.items.is_empty() {
                println!("No machines.");
            }
            for machine in &list.items {
                print_machine(machine);
            }
        }
    }
    Ok(())
}

fn cmd_delete(
    repo: &MachineRepository,
    args: DeleteArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let machine = repo.delete(&ResourceKey::cluster(args.name))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&machine)?),
        OutputFormat::Text => {
            println!("{} Deleted {}", "✓".green(), machine.metadata.name.yellow())
        }
    }
    Ok(())
}

fn print_machine(machine: &Machine) {
    let phase = machine
        .status
        .phase
        .map(|p| format!("{p:?}"))
        .unwrap_or_else(|| "-".into());
    println!(
        "{}  cpus={} memory={}MiB  {}",
        machine.metadata.name.bold(),
        machine.spec.cpus,
        machine.spec.memory_mib,
        phase.cyan()
    );
}

fn blob_path(args: &PathArgs) -> anyhow::Result<String> {
    let identity = match args.namespace {
        Some(_) => ResourceIdentity::namespaced(&args.group, &args.kind),
        None => ResourceIdentity::cluster_scoped(&args.group, &args.kind),
    };
    Ok(file_for(&identity, args.namespace.as_deref(), &args.name)?)
}
