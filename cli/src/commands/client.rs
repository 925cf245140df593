//! `chefboot client`: resolve the Chef client each group's nodes register as.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use chefboot_common::Group;
use clap::Args;
use futures::future::join_all;

use crate::app::AppContext;
use crate::application::ports::ClientSource;
use crate::application::services::client_registry::{ClientRegistry, identity_for};
use crate::application::services::group_cache::{GroupCache, with_timeout};
use crate::infra::inventory::InventoryFile;

/// Arguments for the client command.
#[derive(Args)]
pub struct ClientArgs {
    /// Groups to resolve
    #[arg(required = true, value_parser = super::parse_group)]
    pub groups: Vec<Group>,
}

/// Run the client command.
///
/// # Errors
///
/// Returns the first lookup failure.
pub async fn run(app: &AppContext, args: ClientArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let inventory = InventoryFile::new(app.inventory_path(&config)?);
    let timeout = Duration::from_secs(config.lookup.timeout_secs);

    let source = &inventory;
    let registry = ClientRegistry::new(GroupCache::with_policy(
        move |group: Group| async move {
            let recorded =
                with_timeout(timeout, "client lookup", source.clients_for_group(&group)).await?;
            Ok::<_, anyhow::Error>(identity_for(&group, &recorded))
        },
        config.cache,
    ));

    let groups = super::unique_groups(args.groups);
    let outcomes = join_all(groups.iter().map(|group| registry.client_for_group(group))).await;
    let clients = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

    app.renderer().render_clients(&clients)?;
    Ok(ExitCode::SUCCESS)
}
