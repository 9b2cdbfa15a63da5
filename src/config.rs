//! Site configuration module.
//!
//! Handles loading and validating `site.toml`, the single declarative
//! description of a project site. Everything the generator produces is a
//! function of this configuration: the mandatory project coordinates, and a
//! set of independent optional attachments (overview, features, header,
//! documentation, license, changelog, bug tracker, sources) that each switch
//! one page section on.
//!
//! ```toml
//! project_name = "example"
//! project_group_name = "com.example"
//! project_modules = ["example-core", "example-cli"]
//! release = "1.0.0"
//!
//! overview = "src/site/overview.xml"       # XHTML fragment
//! features = "src/site/features.xml"       # XHTML fragment
//! license = "README-LICENSE.txt"           # plain text
//!
//! [changelog]
//! file = "README-CHANGES.xml"
//! feed_email = "releases@example.com"
//!
//! [bug_tracker]
//! system = "GitHub Issues"
//! uri = "https://github.com/example/example/issues"
//!
//! [sources]
//! system = "Git"
//! uri = "https://github.com/example/example"
//!
//! [[documentation]]
//! name = "User Manual"
//! formats = [
//!   { name = "XHTML", path = "documentation/index.xhtml" },
//!   { name = "Plain text", path = "documentation/manual.txt" },
//! ]
//! ```
//!
//! Relative attachment paths are resolved against the directory containing
//! the configuration file. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// Optional attachments that are absent produce neither a page section nor a
/// contents entry. Sequence fields (`project_modules`, `css_includes`,
/// `documentation`) preserve their order into the generated output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// The name of the project.
    pub project_name: String,
    /// The group name of the project, e.g. `com.example`.
    pub project_group_name: String,
    /// The project modules, in publication order.
    pub project_modules: Vec<String>,
    /// The version label of the current release.
    pub release: String,
    /// The path to the project within the central repository. Defaults to
    /// the group name with dots replaced by slashes.
    pub central_repository_path: String,
    /// Stylesheets referenced by the generated page, in order.
    pub css_includes: Vec<String>,
    /// Whether to copy the bundled default stylesheet into the output.
    pub css_generate_style: bool,
    /// XHTML fragment shown in the overview block.
    pub overview: Option<PathBuf>,
    /// XHTML fragment listing the project features.
    pub features: Option<PathBuf>,
    /// XHTML fragment placed at the very top of the page.
    pub header: Option<PathBuf>,
    /// Documentation items; empty means no documentation section.
    pub documentation: Vec<DocumentationItem>,
    /// Plain-text license file.
    pub license: Option<PathBuf>,
    /// Changelog configuration.
    pub changelog: Option<ChangesConfig>,
    /// Bug tracker configuration.
    pub bug_tracker: Option<BugTrackerConfig>,
    /// Source repository configuration.
    pub sources: Option<SourcesConfig>,
    /// Directory whose tree is copied verbatim into the output directory.
    pub resource_directory: Option<PathBuf>,
}

fn default_css_includes() -> Vec<String> {
    vec!["minisite.css".to_string(), "site.css".to_string()]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            project_group_name: String::new(),
            project_modules: Vec::new(),
            release: String::new(),
            central_repository_path: String::new(),
            css_includes: default_css_includes(),
            css_generate_style: true,
            overview: None,
            features: None,
            header: None,
            documentation: Vec::new(),
            license: None,
            changelog: None,
            bug_tracker: None,
            sources: None,
            resource_directory: None,
        }
    }
}

/// One named documentation item, e.g. a manual or an API reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentationItem {
    pub name: String,
    pub formats: Vec<DocumentationFormat>,
}

/// One format a documentation item is published in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentationFormat {
    pub name: String,
    pub path: String,
}

/// Changelog attachment: the release history file and the author email
/// stamped into the release feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangesConfig {
    pub file: PathBuf,
    #[serde(default = "default_feed_email")]
    pub feed_email: String,
}

fn default_feed_email() -> String {
    "nobody@example.com".to_string()
}

/// Bug tracker attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BugTrackerConfig {
    pub system: String,
    pub uri: String,
}

/// Source repository attachment. `system` selects the provider that renders
/// the "Sources" section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    pub system: String,
    pub uri: String,
}

impl SiteConfig {
    /// Validate invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_name.is_empty() {
            return Err(ConfigError::Validation(
                "project_name must not be empty".into(),
            ));
        }
        if self.release.is_empty() {
            return Err(ConfigError::Validation("release must not be empty".into()));
        }
        if let Some(sources) = &self.sources {
            if sources.system.is_empty() || sources.uri.is_empty() {
                return Err(ConfigError::Validation(
                    "sources.system and sources.uri must not be empty".into(),
                ));
            }
        }
        if let Some(tracker) = &self.bug_tracker {
            if tracker.system.is_empty() || tracker.uri.is_empty() {
                return Err(ConfigError::Validation(
                    "bug_tracker.system and bug_tracker.uri must not be empty".into(),
                ));
            }
        }
        for item in &self.documentation {
            if item.name.is_empty() {
                return Err(ConfigError::Validation(
                    "documentation items must have a name".into(),
                ));
            }
            if item.formats.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "documentation item '{}' must have at least one format",
                    item.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve all relative attachment paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(p) = &mut self.overview {
            resolve(p);
        }
        if let Some(p) = &mut self.features {
            resolve(p);
        }
        if let Some(p) = &mut self.header {
            resolve(p);
        }
        if let Some(p) = &mut self.license {
            resolve(p);
        }
        if let Some(changes) = &mut self.changelog {
            resolve(&mut changes.file);
        }
        if let Some(p) = &mut self.resource_directory {
            resolve(p);
        }
    }
}

/// Load, resolve, and validate a configuration file.
///
/// Relative attachment paths are resolved against the file's directory. An
/// empty `central_repository_path` is derived from the group name.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: SiteConfig = toml::from_str(&content)?;

    if config.central_repository_path.is_empty() {
        config.central_repository_path = config.project_group_name.replace('.', "/");
    }
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }

    config.validate()?;
    Ok(config)
}

/// A documented stock configuration, printed by `minisite gen-config`.
pub fn stock_config_toml() -> String {
    r#"# minisite configuration
#
# Only project_name and release are required. Every attachment below is
# optional: leaving it out removes both the page section and its entry in
# the table of contents.

project_name = "example"
project_group_name = "com.example"
project_modules = []
release = "0.1.0"

# Path of the project within the central repository.
# Defaults to project_group_name with dots replaced by slashes.
#central_repository_path = "com/example"

# Stylesheets referenced by the generated page, in order.
#css_includes = ["minisite.css", "site.css"]

# Copy the bundled default stylesheet into the output directory.
#css_generate_style = true

# XHTML fragment files, resolved relative to this file.
#overview = "src/site/overview.xml"
#features = "src/site/features.xml"
#header = "src/site/header.xml"

# Plain-text license file.
#license = "README-LICENSE.txt"

# Directory whose contents are copied verbatim into the output directory.
#resource_directory = "src/site/resources"

#[changelog]
#file = "README-CHANGES.xml"
#feed_email = "nobody@example.com"

#[bug_tracker]
#system = "GitHub Issues"
#uri = "https://github.com/example/example/issues"

#[sources]
#system = "Git"
#uri = "https://github.com/example/example"

#[[documentation]]
#name = "User Manual"
#formats = [
#  { name = "XHTML", path = "documentation/index.xhtml" },
#]
"#
    .to_string()
}
