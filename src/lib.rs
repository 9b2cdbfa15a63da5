//! # minisite
//!
//! A minimal static site generator for software projects. One declarative
//! `site.toml` describing a project (name, version, modules, and a set of
//! optional attachments) becomes one XHTML project page plus an Atom release
//! feed.
//!
//! # Architecture
//!
//! The generator is a single pure assembly pass over already-resolved
//! configuration:
//!
//! ```text
//! site.toml  →  SiteConfig  →  Site::document()  →  index.xhtml
//!                                              ↘  releases.atom
//! ```
//!
//! Assembly composes a fixed set of sections in a fixed order. Each optional
//! attachment (overview, features, header, documentation, changelog, sources,
//! license, bug tracker) switches exactly one section on; the table of
//! contents and the section sequence are derived from the same computation,
//! so they can never disagree.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`xhtml`] | Document tree, markup constructors, XML/XHTML serialization |
//! | [`embed`] | Parses externally-authored XHTML fragments for verbatim splicing |
//! | [`sources`] | Source-repository providers, looked up by system name |
//! | [`changes`] | Changelog parsing, release table rendering, Atom feed |
//! | [`config`] | `site.toml` loading, path resolution, validation |
//! | [`site`] | The document assembler |
//! | [`generate`] | Output stage: writes the page, stylesheet, feed, resources |
//!
//! # Design Decisions
//!
//! ## A Document Tree Instead of Templates
//!
//! Pages are built as an explicit element tree rather than through a string
//! template engine. The generator's defining feature is splicing
//! externally-parsed XHTML fragments into generated markup, and a tree keeps
//! that purely structural: a fragment survives embedding with the same tags,
//! attributes, text, and order it was authored with, and text can never leak
//! into markup unescaped.
//!
//! ## Failing Instead of Degrading
//!
//! A configured attachment that cannot be read or parsed aborts the whole
//! build. Every input names something the author explicitly declared, so a
//! failure is a configuration defect; emitting a page with a silently missing
//! section would hide it.
//!
//! ## Collaborators by Injection
//!
//! The assembler never consults global state. The source-provider registry
//! and the changelog renderer are passed in at construction, which keeps
//! provider discovery out of the core and lets tests substitute both.

pub mod changes;
pub mod config;
pub mod embed;
pub mod generate;
pub mod site;
pub mod sources;
pub mod xhtml;
