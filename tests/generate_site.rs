//! End-to-end generation over a realistic project layout.
//!
//! Builds a complete site fixture in a temp directory (configuration file,
//! fragment attachments, changelog, resources), runs the full pipeline the
//! way the CLI does, and checks the written artifacts.

use minisite::config::load_config;
use minisite::generate::generate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SITE_TOML: &str = r#"
project_name = "frobnicator"
project_group_name = "com.example.frobnicator"
project_modules = ["frobnicator-core", "frobnicator-cli"]
release = "1.1.0"

overview = "site/overview.xml"
features = "site/features.xml"
license = "README-LICENSE.txt"
resource_directory = "site/resources"

[changelog]
file = "README-CHANGES.xml"
feed_email = "releases@example.com"

[bug_tracker]
system = "GitHub Issues"
uri = "https://github.com/example/frobnicator/issues"

[sources]
system = "Git"
uri = "https://github.com/example/frobnicator"

[[documentation]]
name = "User Manual"
formats = [
  { name = "XHTML", path = "documentation/index.xhtml" },
  { name = "Plain text", path = "documentation/manual.txt" },
]
"#;

const CHANGES_XML: &str = r#"<changelog>
  <release version="1.1.0" date="2026-03-01T00:00:00+00:00">
    <change type="added">Added the export command.</change>
  </release>
  <release version="1.0.0" date="2026-01-15T00:00:00+00:00">
    <change type="added">Initial release.</change>
  </release>
</changelog>
"#;

fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("site/resources")).unwrap();
    fs::write(root.join("site.toml"), SITE_TOML).unwrap();
    fs::write(
        root.join("site/overview.xml"),
        "<p>The frobnicator frobnicates.</p>",
    )
    .unwrap();
    fs::write(
        root.join("site/features.xml"),
        "<ul><li>Frobnicates quickly.</li><li>No dependencies.</li></ul>",
    )
    .unwrap();
    fs::write(root.join("README-LICENSE.txt"), "Copyright 2026 Example.").unwrap();
    fs::write(root.join("README-CHANGES.xml"), CHANGES_XML).unwrap();
    fs::write(root.join("site/resources/icon.png"), b"\x89PNG").unwrap();

    dir
}

fn build(root: &Path) -> TempDir {
    let out = TempDir::new().unwrap();
    let config = load_config(&root.join("site.toml")).unwrap();
    generate(&config, out.path()).unwrap();
    out
}

#[test]
fn generates_all_artifacts() {
    let project = setup_project();
    let out = build(project.path());

    assert!(out.path().join("index.xhtml").exists());
    assert!(out.path().join("minisite.css").exists());
    assert!(out.path().join("releases.atom").exists());
    assert!(out.path().join("icon.png").exists());
}

#[test]
fn page_contains_every_configured_section_and_matching_contents() {
    let project = setup_project();
    let out = build(project.path());
    let page = fs::read_to_string(out.path().join("index.xhtml")).unwrap();

    for id in [
        "features",
        "releases",
        "documentation",
        "maven",
        "changes",
        "sources",
        "license",
        "bug-tracker",
    ] {
        assert!(
            page.contains(&format!("id=\"{id}\"")),
            "missing section {id}"
        );
        assert!(
            page.contains(&format!("href=\"#{id}\"")),
            "missing contents entry for {id}"
        );
    }
}

#[test]
fn page_has_strict_doctype_and_namespace() {
    let project = setup_project();
    let out = build(project.path());
    let page = fs::read_to_string(out.path().join("index.xhtml")).unwrap();

    assert!(page.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(page.contains(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">"
    ));
    assert!(page.contains("<html xmlns=\"http://www.w3.org/1999/xhtml\">"));
}

#[test]
fn page_embeds_fragments_and_release_history() {
    let project = setup_project();
    let out = build(project.path());
    let page = fs::read_to_string(out.path().join("index.xhtml")).unwrap();

    assert!(page.contains("The frobnicator frobnicates."));
    assert!(page.contains("Frobnicates quickly."));
    assert!(page.contains("Copyright 2026 Example."));
    assert!(page.contains("Added the export command."));
    assert!(page.contains("$ git clone https://github.com/example/frobnicator"));
    assert!(page.contains("GitHub Issues"));
    // Dependency stanzas are text inside pre, escaped in the serialized page.
    assert!(page.contains("&lt;dependency&gt;"));
    assert!(page.contains("frobnicator-core"));
    assert!(page.contains("frobnicator-cli"));
}

#[test]
fn feed_lists_releases_newest_first() {
    let project = setup_project();
    let out = build(project.path());
    let feed = fs::read_to_string(out.path().join("releases.atom")).unwrap();

    assert!(feed.contains("xmlns=\"http://www.w3.org/2005/Atom\""));
    assert!(feed.contains("<title>frobnicator Releases</title>"));
    assert!(feed.contains("<email>releases@example.com</email>"));

    let first = feed.find("frobnicator 1.1.0").unwrap();
    let second = feed.find("frobnicator 1.0.0").unwrap();
    assert!(first < second);
}

#[test]
fn missing_changelog_file_fails_the_build() {
    let project = setup_project();
    fs::remove_file(project.path().join("README-CHANGES.xml")).unwrap();

    let out = TempDir::new().unwrap();
    let config = load_config(&project.path().join("site.toml")).unwrap();
    let err = generate(&config, out.path()).unwrap_err();

    assert!(err.to_string().contains("README-CHANGES.xml"));
    assert!(!out.path().join("index.xhtml").exists());
}

#[test]
fn malformed_fragment_fails_the_build() {
    let project = setup_project();
    fs::write(
        project.path().join("site/features.xml"),
        "<ul><li>unclosed</ul>",
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let config = load_config(&project.path().join("site.toml")).unwrap();
    let err = generate(&config, out.path()).unwrap_err();

    assert!(err.to_string().contains("features.xml"));
}
