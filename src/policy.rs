// src/policy.rs
//
// Tag policy: which element names survive into bot markup, which are
// rewritten, which are flattened and which are dropped with their subtree.
// The fixed sets below are process-wide constants; `PolicyConfig` carries the
// per-conversion knobs (budgets, allow-list, spoiler marker).

use serde::Deserialize;

/* =============================== Core sets =============================== */

/// Tags the bot API understands in HTML parse mode.
pub const DEFAULT_ALLOWED: &[&str] = &[
    "b", "strong", "i", "em", "u", "ins", "s", "strike", "del", "a", "code", "pre", "span",
    "tg-spoiler",
];

/// Class the bot API recognises on a spoiler <span>. Input marker classes
/// (`PolicyConfig::spoiler_class`) are always rewritten to this.
pub const OUTPUT_SPOILER_CLASS: &str = "tg-spoiler";

pub const DEFAULT_SPOILER_CLASS: &str = OUTPUT_SPOILER_CLASS;

pub fn is_heading(name: &str) -> bool {
    matches_ignore_ascii_case(name, &["h1", "h2", "h3", "h4", "h5", "h6", "th"])
}

pub fn is_hard_drop(name: &str) -> bool {
    matches_ignore_ascii_case(
        name,
        &[
            "style", "script", "iframe", "head", "noscript", "template", "title", "object",
        ],
    )
}

pub fn is_block_level(name: &str) -> bool {
    matches_ignore_ascii_case(
        name,
        &[
            "p", "div", "table", "tr", "li", "ul", "ol", "blockquote", "section", "article",
            "header", "footer", "center", "hr", "dl", "dt", "dd", "address", "form",
        ],
    )
}

#[inline]
pub fn is_list_item(name: &str) -> bool {
    name.eq_ignore_ascii_case("li")
}

/// Content of these is copied as-is: no whitespace collapsing, no highlighting.
#[inline]
pub fn is_verbatim(name: &str) -> bool {
    matches_ignore_ascii_case(name, &["code", "pre"])
}

#[inline]
pub fn is_line_break(name: &str) -> bool {
    name.eq_ignore_ascii_case("br")
}

#[inline]
pub fn is_link(name: &str) -> bool {
    name.eq_ignore_ascii_case("a")
}

#[inline]
pub fn is_span(name: &str) -> bool {
    name.eq_ignore_ascii_case("span")
}

fn matches_ignore_ascii_case(name: &str, set: &[&str]) -> bool {
    set.iter().any(|s| name.eq_ignore_ascii_case(s))
}

/* ============================ Inline style scan ========================== */

/// True when a `style` attribute value hides the element, i.e. it declares
/// `display: none` or `visibility: hidden`. Later declarations win, as in CSS.
pub fn style_hides(style: &str) -> bool {
    let mut display_none = false;
    let mut visibility_hidden = false;
    for decl in style.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim();
        let value = value.trim().trim_end_matches("!important").trim();
        if prop.eq_ignore_ascii_case("display") {
            display_none = value.eq_ignore_ascii_case("none");
        } else if prop.eq_ignore_ascii_case("visibility") {
            visibility_hidden = value.eq_ignore_ascii_case("hidden");
        }
    }
    display_none || visibility_hidden
}

/// True when a whitespace-separated `class` attribute contains `marker`.
pub fn has_class(class_attr: &str, marker: &str) -> bool {
    class_attr.split_ascii_whitespace().any(|c| c == marker)
}

/* ================================ Config ================================= */

/// Per-conversion policy. Thresholds and the allow-list are configuration
/// rather than constants; see `Default` for the stock bot values.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub max_chars: usize,
    pub max_lines: usize,
    /// Lowercase tag names allowed verbatim in the output.
    pub allowed_tags: Vec<String>,
    pub spoiler_class: String,
    /// Elements nested deeper than this render as nothing.
    pub max_depth: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_chars: 2000,
            max_lines: 10,
            allowed_tags: DEFAULT_ALLOWED.iter().map(|s| s.to_string()).collect(),
            spoiler_class: DEFAULT_SPOILER_CLASS.to_string(),
            max_depth: 128,
        }
    }
}

impl PolicyConfig {
    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Parse a TOML policy file. Missing keys keep their defaults.
    pub fn from_toml(src: &str) -> Result<Self, crate::Error> {
        Ok(toml::from_str(src)?)
    }
}
