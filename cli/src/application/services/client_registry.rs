//! Application service: resolves the Chef client a group's nodes use.

use std::future::Future;

use anyhow::Result;
use chefboot_common::{ClientIdentity, Group};

use crate::application::services::group_cache::GroupCache;

/// Identity for `group` given the client names on record for it.
///
/// The first non-blank recorded name wins. Without one, the name is derived
/// as `{group}-1` and marked unregistered.
#[must_use]
pub fn identity_for(group: &Group, recorded: &[String]) -> ClientIdentity {
    match recorded.iter().map(|n| n.trim()).find(|n| !n.is_empty()) {
        Some(name) => ClientIdentity {
            name: name.to_string(),
            group: group.clone(),
            registered: true,
        },
        None => ClientIdentity {
            name: format!("{group}-1"),
            group: group.clone(),
            registered: false,
        },
    }
}

/// Group → client cache; each group is resolved at most once.
pub struct ClientRegistry<F> {
    clients: GroupCache<ClientIdentity, F>,
}

impl<F, Fut> ClientRegistry<F>
where
    F: Fn(Group) -> Fut,
    Fut: Future<Output = Result<ClientIdentity>>,
{
    pub fn new(clients: GroupCache<ClientIdentity, F>) -> Self {
        Self { clients }
    }

    /// Client for `group`.
    ///
    /// # Errors
    ///
    /// Returns the lookup failure shared by every caller of the same computation.
    pub async fn client_for_group(&self, group: &Group) -> Result<ClientIdentity> {
        Ok(self.clients.lookup(group).await?)
    }

    #[must_use]
    pub fn cache(&self) -> &GroupCache<ClientIdentity, F> {
        &self.clients
    }
}
