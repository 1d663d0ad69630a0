//! Debian control manifest rendering
//!
//! Renders `DEBIAN/control` from [`PackageOptions`] by plain placeholder
//! substitution: `$name`, `${name}` and `$$` for a literal dollar sign.

use crate::{
    config::PackageConfig,
    core::version::PackageVersion,
    error::{DebError, Result},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, instrument};

/// Built-in control stanza for libnovile
pub const DEFAULT_CONTROL_TEMPLATE: &str = "\
Package: $pkg_name
Version: $version
Maintainer: $maintainer
Architecture: $architecture
Section: $section
Description: $description
Depends: $depends
";

/// Static package metadata together with the resolved version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageOptions {
    pub pkg_name: String,
    pub architecture: String,
    pub build_system: String,
    pub version: PackageVersion,
    pub maintainer: String,
    pub section: String,
    pub description: String,
    pub depends: Vec<String>,
}

impl PackageOptions {
    /// Combine static metadata with the extracted version
    pub fn new(package: &PackageConfig, version: PackageVersion) -> Self {
        Self {
            pkg_name: package.name.clone(),
            architecture: package.architecture.clone(),
            build_system: package.build_system.clone(),
            version,
            maintainer: package.maintainer.clone(),
            section: package.section.clone(),
            description: package.description.clone(),
            depends: package.depends.clone(),
        }
    }

    /// Look up a template field by name
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "pkg_name" => Cow::Borrowed(self.pkg_name.as_str()),
            "architecture" => Cow::Borrowed(self.architecture.as_str()),
            "build_system" => Cow::Borrowed(self.build_system.as_str()),
            "version" => Cow::Owned(self.version.to_string()),
            "maintainer" => Cow::Borrowed(self.maintainer.as_str()),
            "section" => Cow::Borrowed(self.section.as_str()),
            "description" => Cow::Borrowed(self.description.as_str()),
            "depends" => Cow::Owned(self.depends.join(", ")),
            _ => return None,
        };
        Some(value)
    }

    /// File name of the .deb built from these options
    pub fn artifact_name(&self) -> String {
        format!(
            "{}.{}_{}_{}.deb",
            self.pkg_name, self.build_system, self.version, self.architecture
        )
    }
}

/// Control template with its placeholder scanner
pub struct ControlTemplate {
    text: String,
    re_placeholder: Regex,
}

impl ControlTemplate {
    /// Create a template from its text
    pub fn new(text: impl Into<String>) -> Result<Self> {
        // Alternatives are tried in order; the empty one catches a stray `$`.
        let re_placeholder =
            Regex::new(r"\$(?:(\$)|([A-Za-z_][A-Za-z0-9_]*)|\{([A-Za-z_][A-Za-z0-9_]*)\}|())")
                .map_err(|e| DebError::config(format!("Failed to compile regex: {}", e)))?;
        Ok(Self {
            text: text.into(),
            re_placeholder,
        })
    }

    /// The built-in libnovile control template
    pub fn builtin() -> Result<Self> {
        Self::new(DEFAULT_CONTROL_TEMPLATE)
    }

    /// Load a template from a file
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DebError::file_system("read", path.to_path_buf(), e))?;
        debug!("Loaded control template ({} bytes)", text.len());
        Self::new(text)
    }

    /// Load `path` when given, otherwise use the built-in template
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Substitute every placeholder with the matching option value
    pub fn render(&self, options: &PackageOptions) -> Result<String> {
        let mut rendered = String::with_capacity(self.text.len());
        let mut last = 0;

        for cap in self.re_placeholder.captures_iter(&self.text) {
            let Some(whole) = cap.get(0) else { continue };
            rendered.push_str(&self.text[last..whole.start()]);
            last = whole.end();

            if cap.get(1).is_some() {
                rendered.push('$');
                continue;
            }

            let Some(name) = cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str()) else {
                let (line, column) = line_and_column(&self.text, whole.start());
                return Err(DebError::template(
                    format!("Invalid placeholder at line {line}, column {column}"),
                    None,
                ));
            };

            let value = options.field(name).ok_or_else(|| {
                DebError::template(format!("Unknown field '{name}'"), Some(name))
            })?;
            rendered.push_str(&value);
        }

        rendered.push_str(&self.text[last..]);
        Ok(rendered)
    }
}

fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(offset, |nl| offset - nl - 1) + 1;
    (line, column)
}
