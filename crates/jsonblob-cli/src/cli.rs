use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jsonblob",
    about = "Resource registry on an object bucket",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML config file; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Show one machine from the configured bucket
    Get(GetArgs),
    /// List machines in the configured bucket
    List(ListArgs),
    /// Delete a machine from the configured bucket
    Delete(DeleteArgs),
    /// Print the blob path of a resource
    Path(PathArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides `bind_addr` from the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct GetArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Label selector, e.g. `tier=web,zone=a`
    #[arg(short = 'l', long)]
    pub selector: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub name: String,
}

#[derive(Args)]
pub struct PathArgs {
    pub group: String,
    pub kind: String,
    pub name: String,
    /// Namespace; makes the kind namespaced
    #[arg(short, long)]
    pub namespace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["jsonblob", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "jsonblob", "list", "--format", "json", "-v", "--config", "jb.toml", "-l", "tier=web",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("jb.toml")));
        if let Command::List(args) = cli.command {
            assert_eq!(args.selector.as_deref(), Some("tier=web"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_path_namespaced() {
        let cli = Cli::try_parse_from([
            "jsonblob", "path", "infra", "Node", "node-1", "-n", "prod",
        ])
        .unwrap();
        if let Command::Path(args) = cli.command {
            assert_eq!(args.kind, "Node");
            assert_eq!(args.namespace.as_deref(), Some("prod"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn get_requires_name() {
        assert!(Cli::try_parse_from(["jsonblob", "get"]).is_err());
    }

    #[test]
    fn default_format_is_text() {
        let cli = Cli::try_parse_from(["jsonblob", "delete", "m1"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
    }
}
