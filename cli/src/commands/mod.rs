//! Command implementations

pub mod client;
pub mod compose;
pub mod config;
pub mod version;

use chefboot_common::Group;

/// Clap value parser for group arguments: any non-blank name.
///
/// # Errors
///
/// Returns an error message if the name is blank.
pub fn parse_group(value: &str) -> Result<Group, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("group name must not be empty".to_string());
    }
    Ok(Group::new(trimmed))
}

/// `groups` without repeats, first occurrence first.
#[must_use]
pub fn unique_groups(groups: Vec<Group>) -> Vec<Group> {
    let mut seen = std::collections::HashSet::new();
    groups.into_iter().filter(|g| seen.insert(g.clone())).collect()
}
