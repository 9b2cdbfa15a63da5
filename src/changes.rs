//! Changelog parsing and rendering.
//!
//! The release history lives in a standalone XML file:
//!
//! ```xml
//! <changelog>
//!   <release version="1.2.0" date="2026-03-01T00:00:00+00:00">
//!     <change type="added">Added the export command.</change>
//!     <change type="fixed" module="core">Fixed a parsing defect.</change>
//!   </release>
//! </changelog>
//! ```
//!
//! Releases and their changes preserve file order. The same parsed
//! [`Changelog`] feeds two independent artifacts: the release table spliced
//! into the "Changes" page section, and the `releases.atom` feed written next
//! to the page ([`write_feed`]).
//!
//! The assembler never parses changelogs itself; it goes through the
//! [`ChangelogRenderer`] collaborator it was constructed with. Section
//! placement, the feed-subscription lead, and the no-releases fallback are
//! the assembler's concern, not this module's.

use crate::config::ChangesConfig;
use crate::embed;
use crate::xhtml::Element;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChangesError {
    /// The assembler was asked for a "Changes" section without a changelog
    /// renderer collaborator.
    #[error("no changelog renderer is available")]
    Unavailable,
    #[error("failed to read changelog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse changelog {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// A parsed release history.
#[derive(Debug, Clone, PartialEq)]
pub struct Changelog {
    pub releases: Vec<Release>,
}

/// One release: a version label, an ISO-8601 timestamp, and its changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub version: String,
    pub date: String,
    pub changes: Vec<Change>,
}

/// One change within a release.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    pub summary: String,
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Changed,
    Fixed,
    Removed,
}

impl ChangeKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "added" => Some(Self::Added),
            "changed" => Some(Self::Changed),
            "fixed" => Some(Self::Fixed),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Fixed => "fixed",
            Self::Removed => "removed",
        }
    }
}

/// Parses changelogs and renders release tables. Injected into the
/// assembler; [`XmlChangelog`] is the implementation used by the CLI.
pub trait ChangelogRenderer: Send + Sync {
    fn parse(&self, file: &Path) -> Result<Changelog, ChangesError>;
    fn render(&self, changelog: &Changelog) -> Element;
}

/// The default changelog collaborator, backed by the XML format above.
pub struct XmlChangelog;

impl ChangelogRenderer for XmlChangelog {
    fn parse(&self, file: &Path) -> Result<Changelog, ChangesError> {
        parse_changelog(file)
    }

    fn render(&self, changelog: &Changelog) -> Element {
        render_releases(changelog)
    }
}

/// Parse the changelog file at `path`.
pub fn parse_changelog(path: &Path) -> Result<Changelog, ChangesError> {
    let content = std::fs::read_to_string(path).map_err(|source| ChangesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_changelog_str(&content, path)
}

fn parse_changelog_str(content: &str, origin: &Path) -> Result<Changelog, ChangesError> {
    let root = match embed::parse_fragment(content, origin) {
        Ok(root) => root,
        Err(embed::EmbedError::Parse { path, message }) => {
            return Err(ChangesError::Parse { path, message });
        }
        Err(embed::EmbedError::Read { path, source }) => {
            return Err(ChangesError::Read { path, source });
        }
    };

    let malformed = |message: String| ChangesError::Parse {
        path: origin.to_path_buf(),
        message,
    };

    if root.name() != "changelog" {
        return Err(malformed(format!(
            "expected root element <changelog>, found <{}>",
            root.name()
        )));
    }

    let mut releases = Vec::new();
    for release in root.child_elements() {
        if release.name() != "release" {
            return Err(malformed(format!(
                "expected <release>, found <{}>",
                release.name()
            )));
        }
        let version = release
            .attribute("version")
            .ok_or_else(|| malformed("<release> is missing a version attribute".to_string()))?
            .to_string();
        let date = release
            .attribute("date")
            .ok_or_else(|| malformed("<release> is missing a date attribute".to_string()))?
            .to_string();

        let mut changes = Vec::new();
        for change in release.child_elements() {
            if change.name() != "change" {
                return Err(malformed(format!(
                    "expected <change>, found <{}>",
                    change.name()
                )));
            }
            let kind = change
                .attribute("type")
                .and_then(ChangeKind::parse)
                .ok_or_else(|| {
                    malformed(format!(
                        "<change> in release {version} has a missing or unknown type"
                    ))
                })?;
            changes.push(Change {
                kind,
                summary: change.text().trim().to_string(),
                module: change.attribute("module").map(str::to_string),
            });
        }

        releases.push(Release {
            version,
            date,
            changes,
        });
    }

    Ok(Changelog { releases })
}

/// Render the release history as a table: one row per change, showing the
/// release date, version, and summary.
pub fn render_releases(changelog: &Changelog) -> Element {
    let mut table = Element::new("table").with_attribute("class", "changelog");

    for release in &changelog.releases {
        for change in &release.changes {
            let mut row = Element::new("tr").with_attribute("class", change.kind.label());
            row.append(Element::with_text("td", date_portion(&release.date)));
            row.append(Element::with_text("td", release.version.as_str()));

            let summary = match &change.module {
                Some(module) => format!("{module}: {}", change.summary),
                None => change.summary.clone(),
            };
            row.append(Element::with_text("td", summary));
            table.append(row);
        }
    }

    table
}

/// Build the Atom release feed for `releases.atom`.
///
/// The feed is derived entirely from the changelog content: `updated` comes
/// from the newest release rather than the wall clock, so regenerating an
/// unchanged site produces an identical feed.
pub fn write_feed(changelog: &Changelog, config: &ChangesConfig, project_name: &str) -> Element {
    let mut feed =
        Element::new("feed").with_attribute("xmlns", "http://www.w3.org/2005/Atom");

    feed.append(Element::with_text(
        "id",
        format!("urn:{project_name}:releases"),
    ));
    feed.append(Element::with_text(
        "title",
        format!("{project_name} Releases"),
    ));

    let updated = changelog
        .releases
        .first()
        .map(|r| r.date.as_str())
        .unwrap_or("1970-01-01T00:00:00+00:00");
    feed.append(Element::with_text("updated", updated));

    {
        let mut author = Element::new("author");
        author.append(Element::with_text("name", "minisite"));
        author.append(Element::with_text("email", config.feed_email.as_str()));
        feed.append(author);
    }

    for release in &changelog.releases {
        let mut entry = Element::new("entry");
        entry.append(Element::with_text(
            "id",
            format!("urn:{project_name}:release:{}", release.version),
        ));
        entry.append(Element::with_text(
            "title",
            format!("{project_name} {}", release.version),
        ));
        entry.append(Element::with_text("updated", release.date.as_str()));

        let mut summary = String::new();
        for change in &release.changes {
            if !summary.is_empty() {
                summary.push('\n');
            }
            summary.push_str(change.kind.label());
            summary.push_str(": ");
            if let Some(module) = &change.module {
                summary.push_str(module);
                summary.push_str(": ");
            }
            summary.push_str(&change.summary);
        }
        entry.append(Element::with_text("summary", summary));
        feed.append(entry);
    }

    feed
}

fn date_portion(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xhtml::to_xml_string;

    const SAMPLE: &str = r#"
        <changelog>
          <release version="1.1.0" date="2026-03-01T00:00:00+00:00">
            <change type="added">Added the export command.</change>
            <change type="fixed" module="core">Fixed a parsing defect.</change>
          </release>
          <release version="1.0.0" date="2026-01-15T00:00:00+00:00">
            <change type="added">Initial release.</change>
          </release>
        </changelog>
    "#;

    fn sample() -> Changelog {
        parse_changelog_str(SAMPLE, Path::new("test-changes.xml")).unwrap()
    }

    #[test]
    fn parses_releases_in_file_order() {
        let changelog = sample();
        assert_eq!(changelog.releases.len(), 2);
        assert_eq!(changelog.releases[0].version, "1.1.0");
        assert_eq!(changelog.releases[1].version, "1.0.0");
        assert_eq!(changelog.releases[0].changes.len(), 2);
        assert_eq!(
            changelog.releases[0].changes[1].module.as_deref(),
            Some("core")
        );
        assert_eq!(changelog.releases[0].changes[0].kind, ChangeKind::Added);
    }

    #[test]
    fn empty_changelog_has_no_releases() {
        let changelog =
            parse_changelog_str("<changelog/>", Path::new("empty.xml")).unwrap();
        assert!(changelog.releases.is_empty());
    }

    #[test]
    fn wrong_root_element_is_rejected() {
        let err = parse_changelog_str("<releases/>", Path::new("bad.xml")).unwrap_err();
        assert!(err.to_string().contains("changelog"));
    }

    #[test]
    fn release_without_version_is_rejected() {
        let err = parse_changelog_str(
            "<changelog><release date=\"2026-01-01T00:00:00+00:00\"/></changelog>",
            Path::new("bad.xml"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn unknown_change_type_is_rejected() {
        let err = parse_changelog_str(
            "<changelog><release version=\"1.0.0\" date=\"2026-01-01T00:00:00+00:00\">\
             <change type=\"improved\">x</change></release></changelog>",
            Path::new("bad.xml"),
        )
        .unwrap_err();
        assert!(matches!(err, ChangesError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = parse_changelog(Path::new("/nonexistent/changes.xml")).unwrap_err();
        assert!(matches!(err, ChangesError::Read { .. }));
    }

    #[test]
    fn renders_one_row_per_change() {
        let table = render_releases(&sample());
        let rendered = to_xml_string(&table);

        assert_eq!(table.child_elements().count(), 3);
        assert!(rendered.contains("<td>2026-03-01</td>"));
        assert!(rendered.contains("<td>1.1.0</td>"));
        assert!(rendered.contains("core: Fixed a parsing defect."));
        assert!(rendered.contains("class=\"fixed\""));
    }

    #[test]
    fn feed_takes_updated_from_newest_release() {
        let config = ChangesConfig {
            file: PathBuf::from("changes.xml"),
            feed_email: "releases@example.com".to_string(),
        };
        let feed = write_feed(&sample(), &config, "example");
        let rendered = to_xml_string(&feed);

        assert!(rendered.contains("xmlns=\"http://www.w3.org/2005/Atom\""));
        assert!(rendered.contains("<title>example Releases</title>"));
        assert!(rendered.contains("<updated>2026-03-01T00:00:00+00:00</updated>"));
        assert!(rendered.contains("<email>releases@example.com</email>"));
        assert!(rendered.contains("<title>example 1.0.0</title>"));
        assert!(rendered.contains("added: Initial release."));
    }

    #[test]
    fn feed_for_empty_changelog_has_no_entries() {
        let config = ChangesConfig {
            file: PathBuf::from("changes.xml"),
            feed_email: default_email(),
        };
        let feed = write_feed(&Changelog { releases: vec![] }, &config, "example");
        assert!(feed.child_elements().all(|e| e.name() != "entry"));
    }

    fn default_email() -> String {
        "nobody@example.com".to_string()
    }
}
