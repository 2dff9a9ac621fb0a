use clap::{Parser, Subcommand};
use pure_agent_cli::cmd::{self, route::RouteArgs};
use pure_agent_cli::logging::{self, LogFormat};
use pure_agent_core::types::{DEFAULT_TMP_DIR, DEFAULT_WORK_DIR};
use pure_agent_core::AppConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pure-agent",
    about = "Post-run export actions, continuation routing and agent tools",
    version,
    propagate_version = true
)]
struct Cli {
    /// Agent working directory
    #[arg(long, global = true, env = "WORK_DIR", default_value = DEFAULT_WORK_DIR)]
    work_dir: PathBuf,

    /// Directory receiving output files for the next workflow step
    #[arg(long, global = true, env = "TMP_DIR", default_value = DEFAULT_TMP_DIR)]
    tmp_dir: PathBuf,

    #[arg(long, global = true, env = "LINEAR_API_KEY", hide_env_values = true)]
    linear_api_key: Option<String>,

    /// Override the Linear GraphQL endpoint
    #[arg(long, global = true, env = "LINEAR_API_URL")]
    linear_api_url: Option<String>,

    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Team that receives feature requests
    #[arg(long, global = true, env = "LINEAR_TEAM_ID")]
    linear_team_id: Option<String>,

    #[arg(long, global = true, env = "LINEAR_DEFAULT_PROJECT_ID")]
    linear_default_project_id: Option<String>,

    #[arg(long, global = true, env = "LINEAR_DEFAULT_LABEL_ID")]
    linear_default_label_id: Option<String>,

    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the export actions the agent configured
    Export,

    /// Serve agent tools over stdio JSON-RPC
    Mcp,

    /// Decide whether the agent should run again
    Route(RouteArgs),
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        AppConfig {
            work_dir: self.work_dir.clone(),
            tmp_dir: self.tmp_dir.clone(),
            linear_api_key: self.linear_api_key.clone(),
            linear_api_url: self.linear_api_url.clone(),
            github_token: self.github_token.clone(),
            linear_team_id: self.linear_team_id.clone(),
            linear_default_project_id: self.linear_default_project_id.clone(),
            linear_default_label_id: self.linear_default_label_id.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let config = cli.app_config();
    let result = match &cli.command {
        Commands::Export => cmd::export::run(&config),
        Commands::Mcp => cmd::mcp::run(&config),
        Commands::Route(args) => cmd::route::run(&config, args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
