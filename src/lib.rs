// src/lib.rs
//
// botmarkup: email HTML → chat-bot restricted HTML.
//
// - Parses with html5ever and renders the <body> subtree (or the whole
//   document when there is none) through the tag policy in `policy`.
// - Output is bounded by a char budget and an estimated-line budget; the walk
//   stops extending output at the first chunk over budget.
// - Standalone digit runs (one-time codes) are wrapped in <code>.
// - The rendered string is normalized once at the end: empty tag pairs go,
//   blank-line runs collapse.
//
// Each conversion owns its state; nothing mutable is shared between calls.

mod budget;
pub mod dispatch;
mod error;
mod highlight;
pub mod message;
mod normalize;
pub mod policy;
mod render;
pub mod signature;

use std::io::Read;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::RcDom;

pub use crate::budget::ConversionState;
pub use crate::error::{Error, Result};
pub use crate::highlight::highlight_codes;
pub use crate::normalize::normalize;
pub use crate::policy::PolicyConfig;

use crate::render::{find_body, Renderer};

/// Rendered markup plus the budget counters of the conversion that made it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    pub markup: String,
    pub state: ConversionState,
}

/// Render a parsed document. Never fails; malformed trees still render to
/// something, possibly the empty string.
pub fn convert(dom: &RcDom, config: &PolicyConfig) -> Conversion {
    let root = find_body(&dom.document).unwrap_or_else(|| dom.document.clone());

    let mut renderer = Renderer::new(config);
    let rendered = renderer.render(&root, 0);

    Conversion {
        markup: normalize(&rendered),
        state: renderer.finish(),
    }
}

/// Parse and render an HTML string.
pub fn convert_html(html: &str, config: &PolicyConfig) -> Result<Conversion> {
    let dom = parse_html(html.as_bytes())?;
    Ok(convert(&dom, config))
}

/// Build a DOM from raw HTML. html5ever recovers from malformed markup, so
/// this only fails when the input cannot be read.
pub fn parse_html(mut html: impl Read) -> Result<RcDom> {
    let parse_options = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), parse_options)
        .from_utf8()
        .read_from(&mut html)?;

    Ok(dom)
}
