//! Source repository providers.
//!
//! The "Sources" section of a generated page depends on which source-control
//! system the project uses. Each system is handled by a [`SourcesProvider`]
//! registered in a [`SourcesRegistry`] under its exact system name; the
//! assembler looks the provider up by the configured `system` string and
//! splices whatever the provider renders. An unrecognized system is a
//! configuration error, never a silently missing section.
//!
//! The registry is built once at startup and read-only afterwards; it is
//! passed into the assembler explicitly rather than consulted as global
//! state.

use crate::config::SourcesConfig;
use crate::xhtml::{self, Element, div_id};
use thiserror::Error;

/// No registered provider matched the configured source-control system.
#[derive(Error, Debug)]
#[error("no provider is available for source repositories of type: {0}")]
pub struct NoProviderError(pub String);

/// Renders the "Sources" section for one source-control system.
///
/// Providers are stateless and may be consulted concurrently by independent
/// assembly calls.
pub trait SourcesProvider: Send + Sync {
    /// The exact system name this provider handles, e.g. `"Git"`.
    fn system(&self) -> &str;

    /// Render the section for the given repository configuration.
    fn render(&self, sources: &SourcesConfig) -> Element;
}

/// Registry of source repository providers.
pub struct SourcesRegistry {
    providers: Vec<Box<dyn SourcesProvider>>,
}

impl SourcesRegistry {
    /// An empty registry with no providers.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// A registry with the built-in providers registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GitProvider));
        registry
    }

    /// Register a provider. Registration order is lookup order; the first
    /// provider whose system name matches wins.
    pub fn register(&mut self, provider: Box<dyn SourcesProvider>) {
        self.providers.push(provider);
    }

    /// Render the "Sources" section via the provider registered for
    /// `sources.system`.
    pub fn render(&self, sources: &SourcesConfig) -> Result<Element, NoProviderError> {
        self.providers
            .iter()
            .find(|p| p.system() == sources.system)
            .map(|p| p.render(sources))
            .ok_or_else(|| NoProviderError(sources.system.clone()))
    }
}

impl Default for SourcesRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Provider for Git repositories.
pub struct GitProvider;

impl SourcesProvider for GitProvider {
    fn system(&self) -> &str {
        "Git"
    }

    fn render(&self, sources: &SourcesConfig) -> Element {
        let mut section = div_id("sources");
        section.append(xhtml::h2("Sources"));

        {
            let mut p = Element::new("p");
            p.append_text("This project uses ");
            p.append(xhtml::link("https://www.git-scm.com", "Git"));
            p.append_text(" to manage source code.");
            section.append(p);
        }

        {
            let mut p = Element::new("p");
            p.append_text("Repository: ");
            p.append(xhtml::link(&sources.uri, &sources.uri));
            section.append(p);
        }

        {
            let mut pre = Element::new("pre");
            pre.append_text("$ git clone ");
            pre.append_text(sources.uri.clone());
            section.append(pre);
        }

        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_config() -> SourcesConfig {
        SourcesConfig {
            system: "Git".to_string(),
            uri: "https://example.com/project.git".to_string(),
        }
    }

    #[test]
    fn git_provider_renders_clone_instructions() {
        let section = SourcesRegistry::with_defaults()
            .render(&git_config())
            .unwrap();

        assert_eq!(section.attribute("id"), Some("sources"));
        let rendered = crate::xhtml::to_xml_string(&section);
        assert!(rendered.contains("$ git clone https://example.com/project.git"));
        assert!(rendered.contains("https://www.git-scm.com"));
    }

    #[test]
    fn unknown_system_is_an_error_naming_the_system() {
        let config = SourcesConfig {
            system: "Pijul".to_string(),
            uri: "https://example.com/repo".to_string(),
        };
        let err = SourcesRegistry::with_defaults().render(&config).unwrap_err();
        assert!(err.to_string().contains("Pijul"));
    }

    #[test]
    fn first_registered_provider_wins() {
        struct Shadow;
        impl SourcesProvider for Shadow {
            fn system(&self) -> &str {
                "Git"
            }
            fn render(&self, _: &SourcesConfig) -> Element {
                Element::with_text("div", "shadowed")
            }
        }

        let mut registry = SourcesRegistry::new();
        registry.register(Box::new(Shadow));
        registry.register(Box::new(GitProvider));

        let section = registry.render(&git_config()).unwrap();
        assert_eq!(section.text(), "shadowed");
    }
}
