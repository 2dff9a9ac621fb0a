use clap::Args;
use pure_agent_core::router::{classify, should_continue, ConfigSignal, RouteDecision};
use pure_agent_core::services::{Filesystem, LocalFs};
use pure_agent_core::AppConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Zero-based index of the agent run that just finished
    #[arg(long)]
    pub depth: u32,

    /// Maximum number of agent runs
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: u32,

    /// Export config JSON produced by the finished run
    #[arg(long, default_value = "{}")]
    pub export_config: String,

    /// File that receives `true` or `false`
    #[arg(long)]
    pub output: PathBuf,
}

pub fn run(config: &AppConfig, args: &RouteArgs) -> anyhow::Result<()> {
    match decide(config, args) {
        Ok(decision) => write_decision(&args.output, decision),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "routing failed, stopping");
            // Best effort; the original failure is what gets reported.
            let _ = write_decision(&args.output, RouteDecision::Stop);
            Err(e)
        }
    }
}

fn decide(config: &AppConfig, args: &RouteArgs) -> anyhow::Result<RouteDecision> {
    let signal = classify(&args.export_config);
    let decision = should_continue(signal, args.depth, args.max_depth);

    if signal == ConfigSignal::RequestsContinue {
        consume_continue_marker(&config.paths().export_config);
    }
    if signal == ConfigSignal::Unparseable {
        tracing::warn!("export config is not valid JSON, stopping");
    }

    tracing::info!(
        depth = args.depth,
        max_depth = args.max_depth,
        signal = ?signal,
        decision = ?decision,
        "route decided"
    );
    Ok(decision)
}

/// The next run must not see the previous run's `continue` config.
fn consume_continue_marker(path: &Path) {
    if !LocalFs.exists(path) {
        return;
    }
    match LocalFs.remove(path) {
        Ok(()) => tracing::info!(path = %path.display(), "removed export config before next run"),
        Err(e) => tracing::warn!(error = %e, "failed to remove export config"),
    }
}

fn write_decision(output: &Path, decision: RouteDecision) -> anyhow::Result<()> {
    let text = if decision.as_bool() { "true\n" } else { "false\n" };
    LocalFs.write(output, text)?;
    Ok(())
}
