use crate::datasource::DataSource;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "shoehorn")]
#[command(author = "Shoehorn Developers")]
#[command(version)]
#[command(about = "Declarative resource provider for the Shoehorn developer portal", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// State file (defaults to ~/.local/state/shoehorn/state.json)
    #[arg(long, global = true, env = "SHOEHORN_STATE")]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// How to reach the Shoehorn API
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Shoehorn host URL
    #[arg(long, global = true, env = "SHOEHORN_HOST")]
    pub host: Option<String>,

    /// API key used as bearer credential
    #[arg(long, global = true, env = "SHOEHORN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SHOEHORN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Provider config file (TOML)
    #[arg(long, global = true, env = "SHOEHORN_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Re-read every tracked instance and update the state file
    Refresh,

    /// Show what apply would change
    Plan(PlanArgs),

    /// Converge remote objects to the desired configuration
    Apply(ApplyArgs),

    /// Start tracking an existing remote object
    Import(ImportArgs),

    /// Print a data source as JSON
    List {
        /// Data source to read
        #[arg(value_enum)]
        source: DataSource,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Desired configuration file (TOML)
    #[arg(short, long, default_value = "shoehorn.toml")]
    pub desired: String,

    /// Only plan this type or type.name
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Show the plan without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Resource type, e.g. shoehorn_team
    pub resource_type: String,

    /// Remote identifier (format depends on the type)
    pub id: String,

    /// State address (defaults to <type>.<id>)
    #[arg(long)]
    pub address: Option<String>,
}
