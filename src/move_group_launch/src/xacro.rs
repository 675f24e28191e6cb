//! Robot description expansion
//!
//! The URDF is produced from a xacro template. The assembler only builds the
//! argument mapping; a [`MacroProcessor`] does the expansion.

use crate::error::MacroError;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Command,
};

/// xacro arguments, `name:=value` on the xacro command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XacroMappings(BTreeMap<String, String>);

impl XacroMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a filesystem path argument.
    pub fn with_path(self, name: impl Into<String>, path: &Path) -> Self {
        self.with(name, path.to_string_lossy())
    }

    /// Booleans are passed the way xacro's `$(arg)` conditionals expect them.
    pub fn with_bool(self, name: impl Into<String>, value: bool) -> Self {
        self.with(name, if value { "true" } else { "false" })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as xacro command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{}:={}", k, v)).collect()
    }
}

/// Expands a robot description template into URDF text.
pub trait MacroProcessor {
    fn process_file(&self, path: &Path, mappings: &XacroMappings) -> Result<String, MacroError>;
}

/// Runs the external `xacro` executable.
#[derive(Debug, Clone)]
pub struct XacroCommand {
    program: PathBuf,
}

impl XacroCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for XacroCommand {
    fn default() -> Self {
        Self::new("xacro")
    }
}

impl MacroProcessor for XacroCommand {
    fn process_file(&self, path: &Path, mappings: &XacroMappings) -> Result<String, MacroError> {
        let program = self.program.display().to_string();
        log::debug!("Running {} {} with {} mappings", program, path.display(), mappings.len());

        let output = Command::new(&self.program)
            .arg(path)
            .args(mappings.to_args())
            .output()
            .map_err(|e| MacroError::ProcessFailed {
                program: program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MacroError::ProcessFailed {
                program,
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| MacroError::ProcessFailed {
            program,
            message: format!("output is not UTF-8: {}", e),
        })
    }
}

/// In-process expansion of `$(arg name)` placeholders.
///
/// Values come from the mappings first, then from `<xacro:arg name=".." default=".."/>`
/// declarations in the template. Macros, includes and properties are not
/// evaluated; templates that need them go through [`XacroCommand`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgExpander;

impl ArgExpander {
    pub fn expand_str(&self, template: &str, mappings: &XacroMappings) -> Result<String, MacroError> {
        let declared = declared_defaults(template)?;
        // Declared defaults come back from roxmltree unescaped, so both sources
        // are escaped on the way into the markup
        let expanded = substitute_args(template, |name| {
            mappings
                .get(name)
                .or_else(|| declared.get(name).map(String::as_str))
                .map(escape_xml)
        })?;

        // The result is handed to consumers as URDF; reject broken markup here
        roxmltree::Document::parse(&expanded)?;
        Ok(expanded)
    }
}

impl MacroProcessor for ArgExpander {
    fn process_file(&self, path: &Path, mappings: &XacroMappings) -> Result<String, MacroError> {
        let template = std::fs::read_to_string(path).map_err(|source| MacroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.expand_str(&template, mappings)
    }
}

/// Collect `<xacro:arg>` defaults from the template.
fn declared_defaults(template: &str) -> Result<BTreeMap<String, String>, MacroError> {
    let doc = roxmltree::Document::parse(template).map_err(MacroError::MalformedTemplate)?;
    let defaults = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "arg")
        .filter_map(|n| {
            let name = n.attribute("name")?;
            let default = n.attribute("default")?;
            Some((name.to_string(), default.to_string()))
        })
        .collect();
    Ok(defaults)
}

/// Escape the characters that cannot appear literally in XML text or attributes.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn substitute_args<F>(template: &str, lookup: F) -> Result<String, MacroError>
where
    F: Fn(&str) -> Option<String>,
{
    const OPEN: &str = "$(arg ";

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let end = after
            .find(')')
            .ok_or(MacroError::Unterminated(offset + start))?;
        let name = after[..end].trim();
        let value = lookup(name).ok_or_else(|| MacroError::UndefinedArgument(name.to_string()))?;
        out.push_str(&value);

        let consumed = start + OPEN.len() + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}
