//! Application service: boot script composition.
//!
//! Validates the validator identity, looks the group's run list up through
//! the shared cache, lays out the boot statements and renders them. No I/O
//! happens here beyond what the cache's backing lookup does.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chefboot_common::{Group, OsFamily, RunList};

use crate::application::services::group_cache::GroupCache;
use crate::domain::bootstrap::{BootPlan, ValidatorIdentity, require_run_list};
use crate::domain::client_rb::ClientSettings;
use crate::domain::codec::Codec;
use crate::domain::error::{ComposeError, RenderError};
use crate::domain::render::{RenderedScript, Renderer};
use crate::domain::statement::{Script, Statement};

/// Cache of run lists; `None` when the group has no run list on record.
pub type RunListCache<F> = GroupCache<Option<RunList>, F>;

/// Fixed inputs of a composer, shared by every group it composes for.
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub server_url: String,
    /// Statement that installs the agent; usually [`crate::domain::install_chef_client`].
    pub install: Statement,
    pub validator: ValidatorIdentity,
    pub client: ClientSettings,
}

/// Builds boot scripts for groups.
pub struct BootScriptComposer<C, F> {
    settings: ComposerSettings,
    codec: C,
    run_lists: Arc<RunListCache<F>>,
}

impl<C, F, Fut> BootScriptComposer<C, F>
where
    C: Codec,
    F: Fn(Group) -> Fut,
    Fut: Future<Output = Result<Option<RunList>>>,
{
    pub fn new(settings: ComposerSettings, codec: C, run_lists: Arc<RunListCache<F>>) -> Self {
        Self {
            settings,
            codec,
            run_lists,
        }
    }

    /// Unrendered statements for `group`.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the validator name, the validator credential or
    /// the run list is missing, checked in that order. `Lookup` when the run
    /// list lookup itself fails.
    pub async fn statements(&self, group: &Group) -> Result<Script, ComposeError> {
        let (validator_name, credential) = self.settings.validator.require()?;
        let run_list = self.run_lists.lookup(group).await?;
        let run_list = require_run_list(group, run_list)?;

        let plan = BootPlan {
            group,
            server_url: &self.settings.server_url,
            install: &self.settings.install,
            validator_name,
            credential,
            run_list: &run_list,
            settings: &self.settings.client,
        };
        Ok(plan.statements(&self.codec)?)
    }

    /// Boot script for `group`, rendered for `family`.
    ///
    /// # Errors
    ///
    /// See [`Self::statements`]; additionally `Render` when a statement has no
    /// safe form for `family`.
    pub async fn compose(&self, group: &Group, family: OsFamily) -> Result<RenderedScript, ComposeError> {
        let script = self.statements(group).await?;
        let rendered = Renderer::new(family).render(script)?;
        tracing::info!(%group, %family, bytes = rendered.text.len(), "composed boot script");
        Ok(rendered)
    }

    /// Like [`Self::compose`], with the family given by name.
    ///
    /// # Errors
    ///
    /// `Render(UnsupportedFamily)` for an unknown family name, before any
    /// lookup happens.
    pub async fn compose_for(&self, group: &Group, family: &str) -> Result<RenderedScript, ComposeError> {
        let family: OsFamily = family.parse().map_err(RenderError::from)?;
        self.compose(group, family).await
    }
}
