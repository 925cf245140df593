//! OS-independent script statements.
//!
//! A [`Script`] is an ordered list of [`Statement`]s describing what a boot
//! script does. Nothing here knows about shell syntax; see
//! [`crate::domain::render`] for that.

use chefboot_common::OsFamily;

/// Path on the target node, expressed as components below the filesystem root.
///
/// Rendered as `/etc/chef/client.rb` on Unix and `C:\etc\chef\client.rb` on
/// Windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPath {
    components: Vec<String>,
}

impl ScriptPath {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a component.
    #[must_use]
    pub fn join(&self, component: impl Into<String>) -> Self {
        let mut components = self.components.clone();
        components.push(component.into());
        Self { components }
    }

    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }
}

/// Native spelling of `path` for `family`, without validation.
#[must_use]
pub fn native_path(path: &ScriptPath, family: OsFamily) -> String {
    match family {
        OsFamily::Unix => format!("/{}", path.components.join("/")),
        OsFamily::Windows => format!("C:\\{}", path.components.join("\\")),
    }
}

impl std::fmt::Display for ScriptPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}

/// Command text per OS family. A family with no text cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellCommand {
    unix: Option<String>,
    windows: Option<String>,
}

impl ShellCommand {
    /// Same command text for every family.
    pub fn portable(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            unix: Some(command.clone()),
            windows: Some(command),
        }
    }

    pub fn per_family(unix: impl Into<String>, windows: impl Into<String>) -> Self {
        Self {
            unix: Some(unix.into()),
            windows: Some(windows.into()),
        }
    }

    pub fn unix_only(command: impl Into<String>) -> Self {
        Self {
            unix: Some(command.into()),
            windows: None,
        }
    }

    #[must_use]
    pub fn for_family(&self, family: OsFamily) -> Option<&str> {
        match family {
            OsFamily::Unix => self.unix.as_deref(),
            OsFamily::Windows => self.windows.as_deref(),
        }
    }
}

/// Access restriction applied to a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    Default,
    /// Readable and writable by the owner only.
    OwnerOnly,
}

/// Named block of statements, invoked through [`Statement::Call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub body: Vec<Statement>,
}

impl Function {
    pub fn new(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

/// A single thing a script does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Comment(String),
    /// Set an environment variable for the rest of the script.
    Export { name: String, value: String },
    /// Create a directory and its parents.
    MakeDir(ScriptPath),
    /// Create or truncate a file and write `lines` to it.
    WriteFile {
        path: ScriptPath,
        lines: Vec<String>,
        mode: FileMode,
    },
    /// Run a command; its exit status is ignored.
    Exec(ShellCommand),
    /// Run a command and abort the script when it exits non-zero.
    Checked(ShellCommand),
    /// Invoke a function and abort the script when it returns non-zero.
    Call(Function),
}

impl Statement {
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    pub fn export(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Export {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn write_file(path: ScriptPath, lines: Vec<String>) -> Self {
        Self::WriteFile {
            path,
            lines,
            mode: FileMode::Default,
        }
    }

    #[must_use]
    pub fn write_private_file(path: ScriptPath, lines: Vec<String>) -> Self {
        Self::WriteFile {
            path,
            lines,
            mode: FileMode::OwnerOnly,
        }
    }

    /// Short label used in render errors, e.g. `write_file /etc/chef/client.rb`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Comment(_) => "comment".to_string(),
            Self::Export { name, .. } => format!("export {name}"),
            Self::MakeDir(path) => format!("mkdir {path}"),
            Self::WriteFile { path, .. } => format!("write_file {path}"),
            Self::Exec(_) => "exec".to_string(),
            Self::Checked(_) => "checked exec".to_string(),
            Self::Call(function) => format!("call {}", function.name),
        }
    }
}

/// Ordered statement sequence. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    statements: Vec<Statement>,
}

impl Script {
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl From<Vec<Statement>> for Script {
    fn from(statements: Vec<Statement>) -> Self {
        Self::new(statements)
    }
}

impl IntoIterator for Script {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}
