//! Boot plan: validation and statement sequencing for one group.
//!
//! Pure functions only. The run list arrives already looked up; the
//! application layer owns the cache and the rendering step.

use chefboot_common::{Group, OsFamily, RunList};
use serde::Serialize;

use crate::domain::client_rb::{ClientRb, ClientSettings};
use crate::domain::codec::Codec;
use crate::domain::error::{BootstrapError, RenderError};
use crate::domain::pem::PrivateKey;
use crate::domain::statement::{Function, Script, ScriptPath, ShellCommand, Statement, native_path};

/// Name of the shell function that installs chef-client.
pub const INSTALL_FUNCTION: &str = "install_chef_client";

/// Agent configuration directory on the node.
#[must_use]
pub fn chef_dir() -> ScriptPath {
    ScriptPath::new(["etc", "chef"])
}

/// Identity a new node uses to register itself with the Chef server.
///
/// Both halves are optional so a partially configured identity can be
/// represented; [`ValidatorIdentity::require`] enforces that both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorIdentity {
    pub name: Option<String>,
    pub credential: Option<PrivateKey>,
}

impl ValidatorIdentity {
    #[must_use]
    pub fn new(name: Option<String>, credential: Option<PrivateKey>) -> Self {
        Self { name, credential }
    }

    /// Both name and a non-empty credential, or which one is missing.
    pub fn require(&self) -> Result<(&str, &PrivateKey), BootstrapError> {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(BootstrapError::MissingValidatorName)?;
        let credential = self
            .credential
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(BootstrapError::MissingValidatorCredential)?;
        Ok((name, credential))
    }
}

/// The looked-up run list must exist and name at least one entry.
pub fn require_run_list(group: &Group, run_list: Option<RunList>) -> Result<RunList, BootstrapError> {
    let run_list = run_list.ok_or_else(|| BootstrapError::MissingRunList {
        group: group.clone(),
    })?;
    if run_list.is_empty() {
        return Err(BootstrapError::EmptyRunList {
            group: group.clone(),
        });
    }
    Ok(run_list)
}

/// Install chef-client through the omnitruck installer, pinned to `version`
/// (`latest` for the newest release).
#[must_use]
pub fn install_chef_client(version: &str) -> Statement {
    Statement::Call(Function::new(
        INSTALL_FUNCTION,
        vec![
            Statement::comment("install chef-client from the omnitruck installer"),
            Statement::export("CHEF_VERSION", version),
            Statement::Checked(ShellCommand::per_family(
                "curl -fsSL https://omnitruck.chef.io/install.sh | bash -s -- -v \"$CHEF_VERSION\"",
                "powershell -NoProfile -ExecutionPolicy Bypass -Command \". { iwr -useb https://omnitruck.chef.io/install.ps1 } | iex; install -project chef -version %CHEF_VERSION%\"",
            )),
        ],
    ))
}

/// Everything needed to lay out the boot statements for one group.
#[derive(Debug, Clone, Copy)]
pub struct BootPlan<'a> {
    pub group: &'a Group,
    pub server_url: &'a str,
    pub install: &'a Statement,
    pub validator_name: &'a str,
    pub credential: &'a PrivateKey,
    pub run_list: &'a RunList,
    pub settings: &'a ClientSettings,
}

#[derive(Serialize)]
struct FirstBoot<'a> {
    run_list: &'a RunList,
}

impl BootPlan<'_> {
    /// Ordered statements: install the agent, write the validator key, write
    /// `client.rb`, write the first-boot attributes, run chef-client.
    pub fn statements(&self, codec: &impl Codec) -> Result<Script, RenderError> {
        let dir = chef_dir();
        let validation_pem = dir.join("validation.pem");
        let client_rb = dir.join("client.rb");
        let first_boot = dir.join("first-boot.json");

        let client_lines = ClientRb {
            server_url: self.server_url,
            validator_name: self.validator_name,
            group: self.group,
            settings: self.settings,
        }
        .lines();

        let attributes = codec.encode(
            "first-boot attributes",
            &FirstBoot {
                run_list: self.run_list,
            },
        )?;

        let run_chef = ShellCommand::per_family(
            chef_client_command(&client_rb, &first_boot, OsFamily::Unix),
            chef_client_command(&client_rb, &first_boot, OsFamily::Windows),
        );

        Ok(Script::new(vec![
            self.install.clone(),
            Statement::MakeDir(dir),
            Statement::write_private_file(validation_pem, self.credential.to_pem_lines()),
            Statement::write_file(client_rb, client_lines),
            Statement::write_file(first_boot, vec![attributes]),
            Statement::Exec(run_chef),
        ]))
    }
}

fn chef_client_command(client_rb: &ScriptPath, first_boot: &ScriptPath, family: OsFamily) -> String {
    format!(
        "chef-client -c {} -j {}",
        native_path(client_rb, family),
        native_path(first_boot, family)
    )
}
