//! Content-type registry: frozen supported-type literals + the conversion graph.
//!
//! # Identity rules
//! A fragment's stored `type` is the exact string the caller supplied at
//! creation.  Support is decided by literal comparison against
//! [`SUPPORTED_TYPES`] — including the one parameterized variant — never by
//! semantic MIME equivalence.  `text/plain;charset=utf-8` (no space) is NOT
//! supported; `text/plain; charset=utf-8` is.
//!
//! # Conversion graph
//! The graph is a fixed, directed, reflexive table from a [`BaseType`] to the
//! base types it may legally be rendered as.  Legality is a separate question
//! from availability: the convert module keeps its own table of conversions
//! that actually have a body, and a graph-legal pair without one is reported
//! as unimplemented rather than illegal.  The image row below is entirely in
//! that reserved state.

// ── Supported type literals ──────────────────────────────────────────────────
//
// These strings are matched byte-for-byte against incoming Content-Type
// values.  Adding an entry here widens what `Fragment::new` accepts, so every
// addition must come with a row in the conversion graph.

/// Content-Type values accepted at fragment creation, as exact literals.
pub const SUPPORTED_TYPES: &[&str] = &[
    "text/plain",
    "text/plain; charset=utf-8",
    "text/markdown",
    "text/html",
    "application/json",
];

/// True if `value` is a creatable Content-Type (exact literal match).
pub fn is_supported(value: &str) -> bool {
    SUPPORTED_TYPES.contains(&value)
}

// ── BaseType ─────────────────────────────────────────────────────────────────

/// A parameter-free `type/subtype` pair known to the registry.
///
/// Covers both the creatable types and the reserved image row of the
/// conversion graph.  Note that image types appear here without being in
/// [`SUPPORTED_TYPES`]: they are conversion-graph vocabulary only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    TextPlain,
    TextMarkdown,
    TextHtml,
    ApplicationJson,
    ImagePng,
    ImageJpeg,
    ImageWebp,
    ImageGif,
}

// Graph rows.  Each row lists the legal targets for one source, source first
// (the graph is reflexive — identity is always legal).  Row order is frozen:
// it is the order `formats` listings are reported in.
const TARGETS_PLAIN:    &[BaseType] = &[BaseType::TextPlain];
const TARGETS_MARKDOWN: &[BaseType] = &[BaseType::TextMarkdown, BaseType::TextHtml, BaseType::TextPlain];
const TARGETS_HTML:     &[BaseType] = &[BaseType::TextHtml, BaseType::TextPlain];
const TARGETS_JSON:     &[BaseType] = &[BaseType::ApplicationJson, BaseType::TextPlain];
const TARGETS_IMAGE:    &[BaseType] = &[BaseType::ImagePng, BaseType::ImageJpeg, BaseType::ImageWebp, BaseType::ImageGif];

impl BaseType {
    /// The canonical `type/subtype` string.
    pub fn mime(self) -> &'static str {
        match self {
            BaseType::TextPlain       => "text/plain",
            BaseType::TextMarkdown    => "text/markdown",
            BaseType::TextHtml        => "text/html",
            BaseType::ApplicationJson => "application/json",
            BaseType::ImagePng        => "image/png",
            BaseType::ImageJpeg       => "image/jpeg",
            BaseType::ImageWebp       => "image/webp",
            BaseType::ImageGif        => "image/gif",
        }
    }

    /// Resolve a parameter-free `type/subtype` string.
    /// Returns `None` for anything outside the registry vocabulary.
    pub fn from_mime(value: &str) -> Option<Self> {
        match value {
            "text/plain"       => Some(BaseType::TextPlain),
            "text/markdown"    => Some(BaseType::TextMarkdown),
            "text/html"        => Some(BaseType::TextHtml),
            "application/json" => Some(BaseType::ApplicationJson),
            "image/png"        => Some(BaseType::ImagePng),
            "image/jpeg"       => Some(BaseType::ImageJpeg),
            "image/webp"       => Some(BaseType::ImageWebp),
            "image/gif"        => Some(BaseType::ImageGif),
            _                  => None,
        }
    }

    /// Resolve a target file extension (`txt`, `md`, `html`, ...).
    /// Case-sensitive on purpose — extensions arrive lowercased from URLs.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt"          => Some(BaseType::TextPlain),
            "md"           => Some(BaseType::TextMarkdown),
            "html"         => Some(BaseType::TextHtml),
            "json"         => Some(BaseType::ApplicationJson),
            "png"          => Some(BaseType::ImagePng),
            "jpg" | "jpeg" => Some(BaseType::ImageJpeg),
            "webp"         => Some(BaseType::ImageWebp),
            "gif"          => Some(BaseType::ImageGif),
            _              => None,
        }
    }

    /// The graph row for this source: every base type it may legally be
    /// converted to, self included, in frozen listing order.
    pub fn conversion_targets(self) -> &'static [BaseType] {
        match self {
            BaseType::TextPlain       => TARGETS_PLAIN,
            BaseType::TextMarkdown    => TARGETS_MARKDOWN,
            BaseType::TextHtml        => TARGETS_HTML,
            BaseType::ApplicationJson => TARGETS_JSON,
            BaseType::ImagePng
            | BaseType::ImageJpeg
            | BaseType::ImageWebp
            | BaseType::ImageGif      => TARGETS_IMAGE,
        }
    }

    /// True iff the top-level component is `text`.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            BaseType::TextPlain | BaseType::TextMarkdown | BaseType::TextHtml
        )
    }
}

// ── Parameter stripping ──────────────────────────────────────────────────────

/// Strip parameters from a full Content-Type value, returning the registry's
/// [`BaseType`] for it.
///
/// Parsing is delegated to the `mime` crate — the registry does not carry a
/// MIME grammar of its own.  `None` means the value either fails to parse or
/// parses to a `type/subtype` outside the registry vocabulary.
pub fn base_type(value: &str) -> Option<BaseType> {
    let parsed: mime::Mime = value.parse().ok()?;
    BaseType::from_mime(parsed.essence_str())
}
