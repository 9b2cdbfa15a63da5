//! Site output stage.
//!
//! Takes a validated [`SiteConfig`] and writes the finished site:
//!
//! ```text
//! minisite/
//! ├── index.xhtml      # the assembled page
//! ├── minisite.css     # bundled default stylesheet (css_generate_style)
//! ├── releases.atom    # release feed (when a changelog is configured)
//! └── ...              # resource_directory tree, copied verbatim
//! ```
//!
//! Assembly itself lives in [`crate::site`]; this module only wires the
//! default collaborators (provider registry, changelog renderer), serializes
//! the document, and performs the file writes.

use crate::changes::{self, XmlChangelog};
use crate::config::SiteConfig;
use crate::site::{Site, SiteError};
use crate::sources::SourcesRegistry;
use crate::xhtml;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Site(#[from] SiteError),
    #[error(transparent)]
    Changes(#[from] changes::ChangesError),
    #[error("failed to walk resource directory: {0}")]
    Resources(#[from] walkdir::Error),
}

const DEFAULT_CSS: &str = include_str!("../static/minisite.css");

/// Generate the complete site into `output_dir`.
pub fn generate(config: &SiteConfig, output_dir: &Path) -> Result<(), GenerateError> {
    let registry = SourcesRegistry::with_defaults();
    let renderer = XmlChangelog;
    let document = Site::new(config, &registry)
        .with_changelog(&renderer)
        .document()?;

    fs::create_dir_all(output_dir)?;
    fs::write(
        output_dir.join("index.xhtml"),
        xhtml::to_document_string(&document),
    )?;
    println!("Generated index.xhtml");

    if config.css_generate_style {
        fs::write(output_dir.join("minisite.css"), DEFAULT_CSS)?;
        println!("Generated minisite.css");
    }

    if let Some(changes_config) = &config.changelog {
        let changelog = changes::parse_changelog(&changes_config.file)?;
        let feed = changes::write_feed(&changelog, changes_config, &config.project_name);
        fs::write(
            output_dir.join("releases.atom"),
            xhtml::to_xml_string(&feed),
        )?;
        println!("Generated releases.atom");
    }

    if let Some(resources) = &config.resource_directory {
        copy_resources(resources, output_dir)?;
        println!("Copied resources from {}", resources.display());
    }

    Ok(())
}

fn copy_resources(src: &Path, dst: &Path) -> Result<(), GenerateError> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .expect("resource paths are rooted under the source directory");
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minimal_config() -> SiteConfig {
        SiteConfig {
            project_name: "example".to_string(),
            project_group_name: "com.example".to_string(),
            release: "1.0.0".to_string(),
            central_repository_path: "com/example".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn writes_page_and_default_stylesheet() {
        let out = TempDir::new().unwrap();
        generate(&minimal_config(), out.path()).unwrap();

        let page = fs::read_to_string(out.path().join("index.xhtml")).unwrap();
        assert!(page.contains("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\""));
        assert!(out.path().join("minisite.css").exists());
        assert!(!out.path().join("releases.atom").exists());
    }

    #[test]
    fn respects_css_generate_style_flag() {
        let out = TempDir::new().unwrap();
        let config = SiteConfig {
            css_generate_style: false,
            ..minimal_config()
        };
        generate(&config, out.path()).unwrap();
        assert!(!out.path().join("minisite.css").exists());
    }

    #[test]
    fn copies_resource_tree() {
        let resources = TempDir::new().unwrap();
        fs::create_dir_all(resources.path().join("images")).unwrap();
        fs::write(resources.path().join("icon.png"), b"png").unwrap();
        fs::write(resources.path().join("images/logo.png"), b"png").unwrap();

        let out = TempDir::new().unwrap();
        let config = SiteConfig {
            resource_directory: Some(resources.path().to_path_buf()),
            ..minimal_config()
        };
        generate(&config, out.path()).unwrap();

        assert!(out.path().join("icon.png").exists());
        assert!(out.path().join("images/logo.png").exists());
    }
}
