//! Document assembly.
//!
//! [`Site`] turns one [`SiteConfig`] into one XHTML document tree. The page
//! is a fixed skeleton (head, overview block, table of contents) followed by
//! a sequence of sections in a fixed order; optional sections appear exactly
//! when their configuration attachment is present.
//!
//! The table of contents and the section sequence are both derived from the
//! single [`Site::sections`] computation, so an entry can never appear in one
//! without the other.
//!
//! Assembly either produces a complete document or fails: fragment, license,
//! changelog, and provider errors all abort the call, and no partial page is
//! ever returned.

use crate::changes::{ChangelogRenderer, ChangesError};
use crate::config::{
    BugTrackerConfig, ChangesConfig, DocumentationItem, SiteConfig, SourcesConfig,
};
use crate::embed::{self, EmbedError};
use crate::sources::{NoProviderError, SourcesRegistry};
use crate::xhtml::{self, Element, XHTML_NS, div_id};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CENTRAL_REPOSITORY_BASE: &str = "https://repo1.maven.org/maven2/";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Fragment(#[from] EmbedError),
    #[error(transparent)]
    Sources(#[from] NoProviderError),
    #[error(transparent)]
    Changes(#[from] ChangesError),
    #[error("failed to read license {path}: {source}")]
    License {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A site generator for one configuration.
///
/// Collaborators are injected at construction: the provider registry for the
/// "Sources" section, and optionally a changelog renderer for the "Changes"
/// section. A configuration that declares a changelog while no renderer was
/// injected fails assembly with [`ChangesError::Unavailable`].
pub struct Site<'a> {
    config: &'a SiteConfig,
    sources: &'a SourcesRegistry,
    changelog: Option<&'a dyn ChangelogRenderer>,
}

/// One body section, in page order. Mandatory sections carry no data;
/// optional sections borrow the attachment that switched them on.
enum Section<'a> {
    Features(&'a Path),
    Releases,
    Documentation(&'a [DocumentationItem]),
    Maven,
    Changes(&'a ChangesConfig),
    Sources(&'a SourcesConfig),
    License(&'a Path),
    BugTracker(&'a BugTrackerConfig),
}

impl Section<'_> {
    /// The section's DOM id, also used as its contents anchor target.
    fn id(&self) -> &'static str {
        match self {
            Section::Features(_) => "features",
            Section::Releases => "releases",
            Section::Documentation(_) => "documentation",
            Section::Maven => "maven",
            Section::Changes(_) => "changes",
            Section::Sources(_) => "sources",
            Section::License(_) => "license",
            Section::BugTracker(_) => "bug-tracker",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Section::Features(_) => "Features",
            Section::Releases => "Releases",
            Section::Documentation(_) => "Documentation",
            Section::Maven => "Maven",
            Section::Changes(_) => "Changes",
            Section::Sources(_) => "Sources",
            Section::License(_) => "License",
            Section::BugTracker(_) => "Bug Tracker",
        }
    }
}

impl<'a> Site<'a> {
    pub fn new(config: &'a SiteConfig, sources: &'a SourcesRegistry) -> Self {
        Self {
            config,
            sources,
            changelog: None,
        }
    }

    /// Inject the changelog renderer collaborator.
    pub fn with_changelog(mut self, renderer: &'a dyn ChangelogRenderer) -> Self {
        self.changelog = Some(renderer);
        self
    }

    /// Assemble the complete document.
    pub fn document(&self) -> Result<Element, SiteError> {
        let mut html = Element::new("html").with_attribute("xmlns", XHTML_NS);
        html.append(self.head());
        html.append(self.body()?);
        Ok(html)
    }

    fn head(&self) -> Element {
        let mut head = Element::new("head");
        head.append(Element::with_text("title", self.config.project_name.as_str()));

        head.append(
            Element::new("meta")
                .with_attribute("name", "generator")
                .with_attribute(
                    "content",
                    concat!("minisite; ", env!("CARGO_PKG_VERSION")),
                ),
        );
        head.append(
            Element::new("meta")
                .with_attribute("http-equiv", "Content-Type")
                .with_attribute("content", "application/xhtml+xml; charset=UTF-8"),
        );

        for css in &self.config.css_includes {
            head.append(
                Element::new("link")
                    .with_attribute("rel", "stylesheet")
                    .with_attribute("type", "text/css")
                    .with_attribute("href", css),
            );
        }

        head
    }

    fn body(&self) -> Result<Element, SiteError> {
        let mut body = Element::new("body");
        body.append(self.main_content()?);
        Ok(body)
    }

    fn main_content(&self) -> Result<Element, SiteError> {
        let mut main = div_id("main");

        if let Some(path) = &self.config.header {
            let mut header = div_id("header");
            header.append(embed::parse_fragment_file(path)?);
            main.append(header);
        }

        main.append(self.overview()?);
        main.append(self.contents());

        for section in self.sections() {
            main.append(self.render_section(&section)?);
        }

        Ok(main)
    }

    /// The body sections in page order. The contents list and the body are
    /// both generated from this one sequence.
    fn sections(&self) -> Vec<Section<'_>> {
        let config = self.config;
        let mut sections = Vec::new();

        if let Some(path) = &config.features {
            sections.push(Section::Features(path));
        }
        sections.push(Section::Releases);
        if !config.documentation.is_empty() {
            sections.push(Section::Documentation(&config.documentation));
        }
        sections.push(Section::Maven);
        if let Some(changes) = &config.changelog {
            sections.push(Section::Changes(changes));
        }
        if let Some(sources) = &config.sources {
            sections.push(Section::Sources(sources));
        }
        if let Some(path) = &config.license {
            sections.push(Section::License(path));
        }
        if let Some(tracker) = &config.bug_tracker {
            sections.push(Section::BugTracker(tracker));
        }

        sections
    }

    fn render_section(&self, section: &Section<'_>) -> Result<Element, SiteError> {
        match section {
            Section::Features(path) => self.features(path),
            Section::Releases => Ok(self.releases()),
            Section::Documentation(items) => Ok(self.documentation(items)),
            Section::Maven => Ok(self.maven()),
            Section::Changes(config) => self.changes(config),
            Section::Sources(config) => Ok(self.sources.render(config)?),
            Section::License(path) => self.license(path),
            Section::BugTracker(tracker) => Ok(self.bug_tracker(tracker)),
        }
    }

    fn overview(&self) -> Result<Element, SiteError> {
        let mut overview = div_id("overview");

        {
            let mut area = Element::new("div").with_attribute("class", "overview_title_area");
            area.append(
                Element::new("img")
                    .with_attribute("src", "icon.png")
                    .with_attribute("width", "64")
                    .with_attribute("height", "64")
                    .with_attribute("class", "icon")
                    .with_attribute("alt", "Project icon"),
            );
            area.append(xhtml::h1(&self.config.project_name));
            overview.append(area);
        }

        {
            let mut area = Element::new("div").with_attribute("class", "overview_content_area");
            if let Some(path) = &self.config.overview {
                area.append(embed::parse_fragment_file(path)?);
            }
            overview.append(area);
        }

        Ok(overview)
    }

    fn contents(&self) -> Element {
        let mut area = Element::new("div");
        area.append(xhtml::h2("Contents"));

        let mut list = Element::new("ul");
        for section in self.sections() {
            list.append(xhtml::list_item(xhtml::link(
                &format!("#{}", section.id()),
                section.title(),
            )));
        }
        area.append(list);

        area
    }

    fn features(&self, path: &Path) -> Result<Element, SiteError> {
        let mut features = div_id("features");
        features.append(xhtml::h2("Features"));
        features.append(embed::parse_fragment_file(path)?);
        Ok(features)
    }

    fn releases(&self) -> Element {
        let mut releases = div_id("releases");
        releases.append(xhtml::h2("Releases"));

        {
            let mut p = Element::new("p");
            p.append_text("The current release is ");
            p.append(Element::with_text("tt", self.config.release.as_str()));
            p.append_text(".");
            releases.append(p);
        }

        {
            let mut p = Element::new("p");
            p.append_text("Source code and binaries are available from the ");
            p.append(xhtml::link(&self.central_repository_url(), "repository"));
            p.append_text(".");
            releases.append(p);
        }

        releases
    }

    fn documentation(&self, items: &[DocumentationItem]) -> Element {
        let mut documentation = div_id("documentation");
        documentation.append(xhtml::h2("Documentation"));

        {
            let mut p = Element::new("p");
            p.append_text("Documentation for the ");
            p.append(Element::with_text("tt", self.config.release.as_str()));
            p.append_text(" release is available for reading online.");
            documentation.append(p);
        }

        {
            let mut p = Element::new("p");
            p.append_text("Documentation for current and older releases is archived in the ");
            p.append(xhtml::link(&self.central_repository_url(), "repository"));
            p.append_text(".");
            documentation.append(p);
        }

        for item in items {
            documentation.append(xhtml::h3(&item.name));
            let mut list = Element::new("ul");
            for format in &item.formats {
                list.append(xhtml::list_item(xhtml::link(&format.path, &format.name)));
            }
            documentation.append(list);
        }

        documentation
    }

    fn maven(&self) -> Element {
        let mut maven = div_id("maven");
        maven.append(xhtml::h2("Maven"));

        maven.append(xhtml::para(
            "The following is a complete list of the project's modules expressed as Maven dependencies: ",
        ));

        {
            let mut pre = Element::new("pre");
            let group = &self.config.project_group_name;
            let version = &self.config.release;
            maven_dependency(&mut pre, &self.config.project_name, group, version);
            for module in &self.config.project_modules {
                maven_dependency(&mut pre, module, group, version);
            }
            maven.append(pre);
        }

        {
            let mut p = Element::new("p");
            p.append_text("Each release of the project is made available on ");
            p.append(xhtml::link("http://search.maven.org", "Maven Central"));
            p.append_text(" within ten minutes of the release announcement.");
            maven.append(p);
        }

        maven
    }

    fn changes(&self, config: &ChangesConfig) -> Result<Element, SiteError> {
        let renderer = self.changelog.ok_or(ChangesError::Unavailable)?;
        let changelog = renderer.parse(&config.file)?;

        let mut changes = div_id("changes");
        changes.append(xhtml::h2("Changes"));

        {
            let mut p = Element::new("p");
            p.append_text("Subscribe to the releases ");
            p.append(xhtml::link("releases.atom", "atom feed"));
            p.append_text(".");
            changes.append(p);
        }

        if changelog.releases.is_empty() {
            changes.append(xhtml::para("No formal releases have been made."));
        } else {
            changes.append(renderer.render(&changelog));
        }

        Ok(changes)
    }

    fn license(&self, path: &Path) -> Result<Element, SiteError> {
        let text = std::fs::read_to_string(path).map_err(|source| SiteError::License {
            path: path.to_path_buf(),
            source,
        })?;

        let mut license = div_id("license");
        license.append(xhtml::h2("License"));
        license.append(Element::with_text("pre", text));
        Ok(license)
    }

    fn bug_tracker(&self, tracker: &BugTrackerConfig) -> Element {
        let mut container = div_id("bug-tracker");
        container.append(xhtml::h2("Bug Tracker"));

        let mut p = Element::new("p");
        p.append_text("The project uses ");
        p.append(xhtml::link(&tracker.uri, &tracker.system));
        p.append_text(" to track issues.");
        container.append(p);

        container
    }

    fn central_repository_url(&self) -> String {
        format!(
            "{CENTRAL_REPOSITORY_BASE}{}",
            clean_repository_path(&self.config.central_repository_path)
        )
    }
}

/// Strip leading slashes; no other characters are altered.
fn clean_repository_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Append one dependency stanza to the `pre` block. The groupId, artifactId,
/// and version texts double as links into the package search service, each
/// with its own query URL.
fn maven_dependency(pre: &mut Element, module: &str, group: &str, version: &str) {
    let link_group = format!("http://search.maven.org/#search%7Cga%7C1%7Cg%3A%22{group}%22");
    let link_artifact = format!("http://search.maven.org/#search%7Cga%7C1%7Ca%3A%22{module}%22");
    let link_version =
        format!("http://search.maven.org/#artifactdetails%7C{group}%7C{module}%7C{version}%7Cjar");

    pre.append_text("<dependency>\n  <groupId>");
    pre.append(xhtml::link(&link_group, group));
    pre.append_text("</groupId>\n  <artifactId>");
    pre.append(xhtml::link(&link_artifact, module));
    pre.append_text("</artifactId>\n  <version>");
    pre.append(xhtml::link(&link_version, version));
    pre.append_text("</version>\n</dependency>\n\n");
}
