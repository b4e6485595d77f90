//! Format-conversion engine: legality checks + the implemented-converter set.
//!
//! Legality and availability are two separate tables.  The registry's
//! conversion graph answers "may this pair ever be converted"; the
//! [`converter`] factory here answers "does this build have a body for it".
//! The image row of the graph is legal but has no bodies, so image requests
//! come back [`ConvertError::NotImplemented`] — deliberately distinct from
//! [`ConvertError::IllegalTarget`], which is a graph violation.
//!
//! Conversions are pure functions over byte slices: no I/O, no shared state,
//! safe to run concurrently across fragments.
//!
//! # Text renderings
//! Plain-text output (`markdown → txt`, `html → txt`) goes through one HTML
//! stripper: markdown is first rendered to HTML, then stripped, so both paths
//! produce identical text for equivalent input.  The stripper emits one
//! paragraph per block element, uppercases heading content, decodes the basic
//! character entities, and word-wraps at [`WRAP_COLUMNS`].

use thiserror::Error;

use crate::registry::BaseType;

/// Column width for plain-text renderings.
pub const WRAP_COLUMNS: usize = 80;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// The requested extension maps to no known MIME type.
    #[error("unknown target extension: .{0}")]
    UnknownExtension(String),
    /// The source type is outside the registry vocabulary.
    #[error("unknown source type: {0}")]
    UnknownSourceType(String),
    /// The conversion graph has no edge from source to target.
    #[error("cannot convert {from} to {to}")]
    IllegalTarget { from: &'static str, to: &'static str },
    /// Graph-legal pair with no converter body in this build (the reserved
    /// image row lands here).
    #[error("conversion from {from} to {to} is not implemented")]
    NotImplemented { from: &'static str, to: &'static str },
    /// A text conversion was asked to read a payload that is not UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    /// The payload does not parse as its declared type (e.g. invalid JSON).
    #[error("malformed JSON payload: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

impl ConvertError {
    /// True for the "unsupported conversion" class of failures — the request
    /// itself was unsatisfiable.  False for payload-level failures, where the
    /// request was fine but the stored bytes were not.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            ConvertError::UnknownExtension(_)
                | ConvertError::UnknownSourceType(_)
                | ConvertError::IllegalTarget { .. }
                | ConvertError::NotImplemented { .. }
        )
    }
}

// ── Engine entry point ───────────────────────────────────────────────────────

/// Convert `data` from `source` to the type named by `extension`.
///
/// Identity conversions return the bytes unchanged without inspecting them,
/// so a fragment that is not valid UTF-8 can still be served as itself.
pub fn convert(data: &[u8], source: BaseType, extension: &str) -> Result<Vec<u8>, ConvertError> {
    let target = BaseType::from_extension(extension)
        .ok_or_else(|| ConvertError::UnknownExtension(extension.to_owned()))?;

    if !source.conversion_targets().contains(&target) {
        return Err(ConvertError::IllegalTarget {
            from: source.mime(),
            to: target.mime(),
        });
    }
    if source == target {
        return Ok(data.to_vec());
    }
    match converter(source, target) {
        Some(body) => body(data),
        None => Err(ConvertError::NotImplemented {
            from: source.mime(),
            to: target.mime(),
        }),
    }
}

type Converter = fn(&[u8]) -> Result<Vec<u8>, ConvertError>;

/// The implemented-converter table.  Identity pairs never get here; a `None`
/// for a graph-legal pair means "reserved, no body yet".
fn converter(source: BaseType, target: BaseType) -> Option<Converter> {
    match (source, target) {
        (BaseType::TextMarkdown, BaseType::TextHtml) => Some(markdown_to_html),
        (BaseType::TextMarkdown, BaseType::TextPlain) => Some(markdown_to_text),
        (BaseType::TextHtml, BaseType::TextPlain) => Some(html_to_text),
        (BaseType::ApplicationJson, BaseType::TextPlain) => Some(json_to_text),
        _ => None,
    }
}

// ── Converter bodies ─────────────────────────────────────────────────────────

fn markdown_to_html(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let markdown = std::str::from_utf8(data)?;
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(markdown));
    Ok(html.into_bytes())
}

/// Markdown renders through HTML so both plain-text paths share one stripper.
fn markdown_to_text(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    html_to_text(&markdown_to_html(data)?)
}

fn html_to_text(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let html = std::str::from_utf8(data)?;
    Ok(strip_html(html, WRAP_COLUMNS).into_bytes())
}

/// Parse, then re-serialize.  Malformed JSON MUST fail here — passing the
/// bytes through untouched would serve a `text/plain` body that claims to be
/// the fragment's JSON form but is not.
fn json_to_text(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    Ok(serde_json::to_string(&value)?.into_bytes())
}

// ── HTML stripper ────────────────────────────────────────────────────────────

// Elements that terminate the current text block.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "hr", "li", "ul", "ol", "dl", "dt", "dd", "table", "tr",
    "td", "th", "blockquote", "pre", "section", "article", "header", "footer",
];

fn is_heading(name: &str) -> bool {
    let b = name.as_bytes();
    b.len() == 2 && b[0] == b'h' && (b'1'..=b'6').contains(&b[1])
}

fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name) || is_heading(name)
}

/// Reduce an HTML document to plain text.
///
/// One output paragraph per block element, paragraphs separated by a blank
/// line, each wrapped at `width` columns.  Heading content is uppercased.
/// `script`/`style` bodies and comments are dropped.  No trailing newline.
fn strip_html(html: &str, width: usize) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut pending_space = false;
    let mut heading = false;
    // Raw-text element currently being skipped (script/style), if any.
    let mut skipping: Option<&'static str> = None;

    let mut rest = html;
    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            if skipping.is_none() {
                append_text(rest, &mut current, &mut pending_space, heading);
            }
            break;
        };

        let (text, tag_start) = rest.split_at(lt);
        if skipping.is_none() {
            append_text(text, &mut current, &mut pending_space, heading);
        }

        let after_lt = &tag_start[1..];
        if let Some(comment) = after_lt.strip_prefix("!--") {
            // Comments may contain '>' freely; scan for the full terminator.
            match comment.find("-->") {
                Some(end) => rest = &comment[end + 3..],
                None => break,
            }
            continue;
        }

        let Some(gt) = after_lt.find('>') else {
            // Unterminated tag: nothing after it can be text.
            break;
        };
        let tag_body = &after_lt[..gt];
        rest = &after_lt[gt + 1..];

        let closing = tag_body.starts_with('/');
        let name: String = tag_body
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(raw) = skipping {
            if closing && name == raw {
                skipping = None;
            }
            continue;
        }
        match name.as_str() {
            "script" if !closing => {
                skipping = Some("script");
                continue;
            }
            "style" if !closing => {
                skipping = Some("style");
                continue;
            }
            _ => {}
        }

        if is_block(&name) {
            flush_block(&mut current, &mut pending_space, &mut blocks, width);
        }
        if is_heading(&name) {
            heading = !closing;
        }
    }

    flush_block(&mut current, &mut pending_space, &mut blocks, width);
    blocks.join("\n\n")
}

/// Close the current text block: trim, wrap, append.
fn flush_block(
    current: &mut String,
    pending_space: &mut bool,
    blocks: &mut Vec<String>,
    width: usize,
) {
    let text = current.trim();
    if !text.is_empty() {
        blocks.push(textwrap::fill(text, width));
    }
    current.clear();
    *pending_space = false;
}

/// Append a text run, collapsing whitespace and decoding entities.
fn append_text(text: &str, current: &mut String, pending_space: &mut bool, heading: bool) {
    let mut i = 0;
    while let Some(c) = text[i..].chars().next() {
        // Entity references: `&name;` or `&#N;` / `&#xN;`, at most 8 chars
        // between the markers.  Anything else is a literal ampersand.
        if c == '&' {
            if let Some(semi) = text[i + 1..].find(';').filter(|&n| n <= 8) {
                if let Some(decoded) = decode_entity(&text[i + 1..i + 1 + semi]) {
                    push_char(decoded, current, pending_space, heading);
                    i += semi + 2;
                    continue;
                }
            }
        }
        if c.is_whitespace() {
            if !current.is_empty() {
                *pending_space = true;
            }
        } else {
            push_char(c, current, pending_space, heading);
        }
        i += c.len_utf8();
    }
}

fn push_char(c: char, current: &mut String, pending_space: &mut bool, heading: bool) {
    if *pending_space {
        current.push(' ');
        *pending_space = false;
    }
    if heading {
        current.extend(c.to_uppercase());
    } else {
        current.push(c);
    }
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
                Some(hexadecimal) => u32::from_str_radix(hexadecimal, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
