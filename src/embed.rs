//! Fragment embedding.
//!
//! Optional page sections (overview, features, header) are authored as
//! standalone XHTML fragment files. This module parses such a fragment into a
//! detached [`Element`] subtree that the assembler splices into the generated
//! document as-is: same tag names, attributes, text, and order.
//!
//! Parsing never loads a DTD and never resolves external entities, so a
//! hostile or malformed fragment cannot trigger network access. The XML
//! built-in and numeric character references are resolved; any other entity
//! reference is a parse error.

use crate::xhtml::{Element, XHTML_NS};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to embed a fragment. Read and parse failures are distinguished for
/// diagnostics; both abort the assembly that requested the fragment.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("failed to read fragment {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse fragment {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Parse the fragment file at `path` into a detached element.
pub fn parse_fragment_file(path: &Path) -> Result<Element, EmbedError> {
    let content = std::fs::read_to_string(path).map_err(|source| EmbedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_fragment(&content, path)
}

/// Parse fragment content into a detached element. `origin` labels parse
/// errors; no file access happens here.
pub fn parse_fragment(content: &str, origin: &Path) -> Result<Element, EmbedError> {
    parse_root(content).map_err(|message| EmbedError::Parse {
        path: origin.to_path_buf(),
        message,
    })
}

fn parse_root(content: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    // Elements whose closing tags are still pending.
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_from_tag(&e)?);
            }
            Ok(Event::End(e)) => {
                let element = stack.pop().ok_or_else(|| {
                    format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_tag(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|err| format!("invalid text content: {err}"))?;
                if let Some(parent) = stack.last_mut() {
                    parent.append_text(text.into_owned());
                } else if !text.trim().is_empty() {
                    return Err("text content outside of the root element".to_string());
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(&e).into_owned();
                let resolved = resolve_reference(&name)
                    .ok_or_else(|| format!("unresolvable entity reference &{name};"))?;
                match stack.last_mut() {
                    Some(parent) => parent.append_text(resolved),
                    None => {
                        return Err("entity reference outside of the root element".to_string());
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    parent.append_text(String::from_utf8_lossy(&e).into_owned());
                }
            }
            Ok(Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.to_string()),
        }
    }

    if let Some(unclosed) = stack.last() {
        return Err(format!("missing closing tag </{}>", unclosed.name()));
    }

    root.ok_or_else(|| "fragment contains no root element".to_string())
}

/// Attach a completed element to its parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.append(element),
        None => {
            if root.is_some() {
                return Err(format!(
                    "fragment has more than one root element (second root <{}>)",
                    element.name()
                ));
            }
            // The generated document declares the XHTML namespace on its own
            // root; a matching redeclaration on the fragment root is dropped.
            if element.attribute("xmlns") == Some(XHTML_NS) {
                element.remove_attribute("xmlns");
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn element_from_tag(tag: &quick_xml::events::BytesStart<'_>) -> Result<Element, String> {
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
    let mut element = Element::new(name);

    for attr in tag.attributes() {
        let attr = attr.map_err(|err| format!("invalid attribute: {err}"))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| format!("invalid attribute value: {err}"))?
            .into_owned();
        element.set_attribute(key, value);
    }

    Ok(element)
}

/// Resolve the XML built-in entities and numeric character references.
/// Anything else would require DTD knowledge, which is deliberately absent.
fn resolve_reference(name: &str) -> Option<String> {
    match name {
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "amp" => Some("&".to_string()),
        "apos" => Some("'".to_string()),
        "quot" => Some("\"".to_string()),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32).map(|c| c.to_string())
        }
        _ => None,
    }
}
