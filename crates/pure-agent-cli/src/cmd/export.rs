use anyhow::Context;
use pure_agent_core::output::{ensure_config_output, write_action_results, write_fallback_outputs};
use pure_agent_core::services::{
    Filesystem, GhSourceControl, LinearClient, LocalFs, SystemRunner, ZipArchiver,
};
use pure_agent_core::{
    parse_export_config, process_export, ActionDeps, ActionRegistry, ActionResult, AppConfig,
    AppPaths, Collaborators,
};

/// Run the export pass for the config the agent left in the work dir.
///
/// A missing config is not an error: the agent simply chose no actions.
/// On failure the output files are still written, with `{}` results.
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let paths = config.paths();
    if !LocalFs.exists(&paths.export_config) {
        tracing::info!(
            path = %paths.export_config.display(),
            "no export config found, skipping export"
        );
        return Ok(());
    }

    match export(config, &paths) {
        Ok(results) => {
            tracing::info!(keys = results.len(), "export completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "export failed");
            write_fallback_outputs(
                &LocalFs,
                &paths.export_config,
                &paths.export_config_output,
                &paths.action_results_output,
            );
            Err(e)
        }
    }
}

fn export(config: &AppConfig, paths: &AppPaths) -> anyhow::Result<ActionResult> {
    let raw = LocalFs
        .read_to_string(&paths.export_config)
        .context("failed to read export config")?;
    let export_config = parse_export_config(&raw)?;
    let tokens: Vec<&str> = export_config.actions.iter().map(|a| a.as_str()).collect();
    tracing::info!(actions = ?tokens, issue_id = ?export_config.issue_id(), "export config loaded");

    let linear = LinearClient::new(config.linear_api_key()?, config.linear_api_url.as_deref())?;
    let archive = ZipArchiver::new(SystemRunner, &linear);
    let scm = GhSourceControl::new(SystemRunner);
    let deps = ActionDeps {
        work_dir: config.work_dir.clone(),
        zip_output_path: paths.zip_output.clone(),
        github_token: config.github_token.clone(),
    };
    let services = Collaborators {
        notifier: &linear,
        archive: &archive,
        scm: &scm,
    };

    let results = process_export(&export_config, &ActionRegistry::standard(), &deps, services)?;

    ensure_config_output(&LocalFs, &paths.export_config, &paths.export_config_output)?;
    write_action_results(&LocalFs, &paths.action_results_output, &results)?;
    Ok(results)
}
