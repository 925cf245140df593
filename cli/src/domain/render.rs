//! Script rendering: turns a [`Script`] into POSIX shell or Windows batch text.
//!
//! Pure and deterministic: the same script and family always produce the
//! same bytes. Content that cannot be quoted safely is rejected with
//! [`RenderError::Unrenderable`] instead of being skipped.

use std::sync::LazyLock;

use chefboot_common::OsFamily;
use regex::Regex;

use crate::domain::error::RenderError;
use crate::domain::statement::{
    FileMode, Function, Script, ScriptPath, ShellCommand, Statement, native_path,
};

/// Heredoc terminator used for file contents on Unix.
pub const HEREDOC_MARKER: &str = "END_OF_CHEFBOOT_FILE";

/// Shell identifiers: environment variable and function names.
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex")
});

/// Path components may only use characters that need no quoting in either dialect.
static PATH_COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]*$").expect("valid regex")
});

/// Rendered script text for one OS family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScript {
    pub family: OsFamily,
    pub text: String,
}

impl RenderedScript {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for RenderedScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders scripts for a single OS family.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    family: OsFamily,
}

impl Renderer {
    #[must_use]
    pub fn new(family: OsFamily) -> Self {
        Self { family }
    }

    /// Render `script`, consuming it.
    ///
    /// Unix: function definitions first, then statements.
    /// Windows: `@echo off`, statements, `exit /b 0`, then one label per function.
    pub fn render(&self, script: Script) -> Result<RenderedScript, RenderError> {
        let functions = collect_functions(script.statements(), self.family)?;
        let mut lines = Vec::new();

        match self.family {
            OsFamily::Unix => {
                for function in &functions {
                    self.render_function(function, &mut lines)?;
                }
                for statement in script.statements() {
                    self.render_statement(statement, &mut lines)?;
                }
            }
            OsFamily::Windows => {
                lines.push("@echo off".to_string());
                for statement in script.statements() {
                    self.render_statement(statement, &mut lines)?;
                }
                if !functions.is_empty() {
                    lines.push("exit /b 0".to_string());
                    for function in &functions {
                        self.render_function(function, &mut lines)?;
                    }
                }
            }
        }

        let eol = line_terminator(self.family);
        let mut text = lines.join(eol);
        if !text.is_empty() {
            text.push_str(eol);
        }
        Ok(RenderedScript {
            family: self.family,
            text,
        })
    }

    fn render_function(&self, function: &Function, out: &mut Vec<String>) -> Result<(), RenderError> {
        match self.family {
            OsFamily::Unix => {
                out.push(format!("{}() {{", function.name));
                if function.body.is_empty() {
                    out.push(":".to_string());
                }
                for statement in &function.body {
                    self.render_statement(statement, out)?;
                }
                out.push("}".to_string());
            }
            OsFamily::Windows => {
                out.push(format!(":{}", function.name));
                for statement in &function.body {
                    self.render_statement(statement, out)?;
                }
                out.push("exit /b 0".to_string());
            }
        }
        Ok(())
    }

    fn render_statement(&self, statement: &Statement, out: &mut Vec<String>) -> Result<(), RenderError> {
        let family = self.family;
        let fail = |reason: &str| RenderError::Unrenderable {
            statement: statement.describe(),
            family,
            reason: reason.to_string(),
        };

        match statement {
            Statement::Comment(text) => {
                check_single_line(text).map_err(fail)?;
                out.push(match family {
                    OsFamily::Unix => format!("# {text}"),
                    OsFamily::Windows => format!("rem {}", escape_percent(text)),
                });
            }
            Statement::Export { name, value } => {
                if !IDENTIFIER_RE.is_match(name) {
                    return Err(fail("invalid variable name"));
                }
                check_single_line(value).map_err(fail)?;
                out.push(match family {
                    OsFamily::Unix => format!("export {name}={}", single_quote(value)),
                    OsFamily::Windows => {
                        if value.contains('"') {
                            return Err(fail("double quote in value"));
                        }
                        format!("set \"{name}={}\"", escape_percent(value))
                    }
                });
            }
            Statement::MakeDir(path) => {
                let path = render_path(path, family).map_err(fail)?;
                out.push(match family {
                    OsFamily::Unix => format!("mkdir -p {path}"),
                    OsFamily::Windows => format!("if not exist {path} mkdir {path}"),
                });
            }
            Statement::WriteFile { path, lines, mode } => {
                let path = render_path(path, family).map_err(fail)?;
                for line in lines {
                    check_single_line(line).map_err(fail)?;
                }
                match family {
                    OsFamily::Unix => write_file_unix(&path, lines, *mode, out).map_err(fail)?,
                    OsFamily::Windows => write_file_windows(&path, lines, *mode, out),
                }
            }
            Statement::Exec(command) => {
                out.push(self.command_text(statement, command)?.to_string());
            }
            Statement::Checked(command) => {
                let text = self.command_text(statement, command)?;
                out.push(format!("{text} {}", abort_guard(family)));
            }
            Statement::Call(function) => {
                out.push(match family {
                    OsFamily::Unix => format!("{} {}", function.name, abort_guard(family)),
                    OsFamily::Windows => {
                        format!("call :{} {}", function.name, abort_guard(family))
                    }
                });
            }
        }
        Ok(())
    }

    fn command_text<'a>(
        &self,
        statement: &Statement,
        command: &'a ShellCommand,
    ) -> Result<&'a str, RenderError> {
        let text = command
            .for_family(self.family)
            .ok_or_else(|| RenderError::UnsupportedStatement {
                statement: statement.describe(),
                family: self.family,
            })?;
        check_single_line(text).map_err(|reason| RenderError::Unrenderable {
            statement: statement.describe(),
            family: self.family,
            reason: reason.to_string(),
        })?;
        Ok(text)
    }
}

/// Collect every function reachable from `statements`, first use first.
fn collect_functions(statements: &[Statement], family: OsFamily) -> Result<Vec<&Function>, RenderError> {
    fn walk<'a>(
        statements: &'a [Statement],
        family: OsFamily,
        found: &mut Vec<&'a Function>,
    ) -> Result<(), RenderError> {
        for statement in statements {
            let Statement::Call(function) = statement else {
                continue;
            };
            if !IDENTIFIER_RE.is_match(&function.name) {
                return Err(RenderError::Unrenderable {
                    statement: statement.describe(),
                    family,
                    reason: "invalid function name".to_string(),
                });
            }
            match found.iter().find(|f| f.name == function.name) {
                Some(existing) if *existing == function => continue,
                Some(_) => {
                    return Err(RenderError::Unrenderable {
                        statement: statement.describe(),
                        family,
                        reason: "conflicting definitions for the same function name".to_string(),
                    });
                }
                None => found.push(function),
            }
            walk(&function.body, family, found)?;
        }
        Ok(())
    }

    let mut found = Vec::new();
    walk(statements, family, &mut found)?;
    Ok(found)
}

fn line_terminator(family: OsFamily) -> &'static str {
    match family {
        OsFamily::Unix => "\n",
        OsFamily::Windows => "\r\n",
    }
}

fn abort_guard(family: OsFamily) -> &'static str {
    match family {
        OsFamily::Unix => "|| return 1",
        OsFamily::Windows => "|| exit /b 1",
    }
}

fn check_single_line(text: &str) -> Result<(), &'static str> {
    if text.contains('\0') {
        return Err("embedded NUL byte");
    }
    if text.contains('\n') || text.contains('\r') {
        return Err("embedded line break");
    }
    Ok(())
}

fn render_path(path: &ScriptPath, family: OsFamily) -> Result<String, &'static str> {
    if path.components().is_empty() {
        return Err("empty path");
    }
    if path
        .components()
        .iter()
        .any(|c| !PATH_COMPONENT_RE.is_match(c))
    {
        return Err("path component needs quoting");
    }
    Ok(native_path(path, family))
}

fn write_file_unix(
    path: &str,
    lines: &[String],
    mode: FileMode,
    out: &mut Vec<String>,
) -> Result<(), &'static str> {
    if lines.iter().any(|l| l == HEREDOC_MARKER) {
        return Err("line collides with heredoc terminator");
    }
    if mode == FileMode::OwnerOnly {
        out.push(format!("touch {path} && chmod 0600 {path}"));
    }
    if lines.is_empty() {
        out.push(format!(": > {path}"));
        return Ok(());
    }
    out.push(format!("cat > {path} <<'{HEREDOC_MARKER}'"));
    out.extend(lines.iter().cloned());
    out.push(HEREDOC_MARKER.to_string());
    Ok(())
}

fn write_file_windows(path: &str, lines: &[String], mode: FileMode, out: &mut Vec<String>) {
    out.push(format!("type nul > {path}"));
    if mode == FileMode::OwnerOnly {
        out.push(format!(
            "icacls {path} /inheritance:r /grant:r \"%USERNAME%\":F > nul"
        ));
    }
    for line in lines {
        out.push(format!(">>{path} echo({}", escape_batch_echo(line)));
    }
}

/// POSIX single-quoting: `it's` becomes `'it'\''s'`.
fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn escape_percent(text: &str) -> String {
    text.replace('%', "%%")
}

/// Escape a line for `echo(` in a batch file. Outside double quotes the
/// metacharacters `^&|<>()` take a caret; inside quotes they are literal.
fn escape_batch_echo(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                escaped.push(ch);
            }
            '%' => escaped.push_str("%%"),
            '^' | '&' | '|' | '<' | '>' | '(' | ')' if !in_quotes => {
                escaped.push('^');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}
