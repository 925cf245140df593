//! `chefboot compose`: render boot scripts for one or more groups.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chefboot_common::{Group, OsFamily};
use clap::Args;
use futures::future::join_all;

use crate::app::AppContext;
use crate::application::ports::{RunListSource, ValidatorKeyLoader};
use crate::application::services::boot_script::{BootScriptComposer, ComposerSettings};
use crate::application::services::group_cache::{GroupCache, with_timeout};
use crate::application::services::script_output::{script_path, write_scripts};
use crate::domain::bootstrap::{ValidatorIdentity, install_chef_client};
use crate::domain::codec::JsonCodec;
use crate::domain::config::BootConfig;
use crate::domain::render::RenderedScript;
use crate::infra::fs::{LocalScriptWriter, sha256_hex};
use crate::infra::inventory::InventoryFile;
use crate::infra::keys::PemKeyLoader;
use crate::output::{ScriptReport, TerminalReporter, progress};

/// Arguments for the compose command.
#[derive(Args)]
pub struct ComposeArgs {
    /// Groups to compose boot scripts for
    #[arg(required = true, value_parser = super::parse_group)]
    pub groups: Vec<Group>,

    /// Shell dialect of the target nodes
    #[arg(long, value_enum, default_value_t = OsFamily::Unix)]
    pub os: OsFamily,

    /// Write `<group>.sh` / `<group>.cmd` files here instead of printing to stdout
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Run the compose command.
///
/// # Errors
///
/// Returns the first group's failure; no file is written unless every group
/// composed successfully.
pub async fn run(app: &AppContext, args: ComposeArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let inventory = InventoryFile::new(app.inventory_path(&config)?);
    let settings = composer_settings(&config).await?;
    let timeout = Duration::from_secs(config.lookup.timeout_secs);

    let source = &inventory;
    let run_lists = Arc::new(GroupCache::with_policy(
        move |group: Group| async move {
            with_timeout(timeout, "run list lookup", source.run_list_for_group(&group)).await
        },
        config.cache,
    ));
    let composer = BootScriptComposer::new(settings, JsonCodec, run_lists);

    let groups = super::unique_groups(args.groups);
    let spinner = app
        .output
        .show_progress()
        .then(|| progress::spinner(&format!("Composing {} boot script(s)...", groups.len())));
    let outcomes = join_all(groups.iter().map(|group| composer.compose(group, args.os))).await;
    if let Some(pb) = &spinner {
        progress::finish_clear(pb);
    }

    let mut scripts = Vec::with_capacity(groups.len());
    for (group, outcome) in groups.into_iter().zip(outcomes) {
        scripts.push((group, outcome?));
    }

    let reports = match &args.out_dir {
        Some(dir) => {
            let reporter = TerminalReporter::new(&app.output);
            let overwrite = |path: &std::path::Path| {
                app.confirm(&format!("Overwrite {}?", path.display()), true)
                    .unwrap_or(false)
            };
            let written = write_scripts(&LocalScriptWriter, &reporter, dir, &scripts, overwrite).await?;
            let mut reports = Vec::with_capacity(written.len());
            for (group, script) in &scripts {
                let path = script_path(dir, group, script)?;
                if written.contains(&path) {
                    reports.push(report(group, script, Some(path)));
                }
            }
            reports
        }
        None => scripts
            .iter()
            .map(|(group, script)| report(group, script, None))
            .collect(),
    };

    app.renderer().render_scripts(&reports)?;
    Ok(ExitCode::SUCCESS)
}

async fn composer_settings(config: &BootConfig) -> Result<ComposerSettings> {
    let credential = match &config.validator.key_path {
        Some(path) => Some(PemKeyLoader.load(path).await?),
        None => None,
    };
    Ok(ComposerSettings {
        server_url: config.server.url.clone(),
        install: install_chef_client(&config.agent.version),
        validator: ValidatorIdentity::new(config.validator.name.clone(), credential),
        client: config.client.settings(),
    })
}

fn report(group: &Group, script: &RenderedScript, path: Option<PathBuf>) -> ScriptReport {
    let script_text = path.is_none().then(|| script.text.clone());
    ScriptReport {
        group: group.clone(),
        os: script.family,
        sha256: sha256_hex(script.text.as_bytes()),
        path,
        script: script_text,
    }
}
