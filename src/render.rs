// src/render.rs
//
// Tree transformer. Walks a parsed DOM and renders every node to bot markup
// according to the tag policy. Rules per node, first match wins:
//   1. conversion already truncated → nothing
//   2. text → collapsed, trimmed, charged to the budget, escaped, highlighted
//   3. comment / doctype / PI → nothing
//   4. hidden via inline style → nothing (span) or a line break (others)
//   5. <br> → line break
//   6. hard-drop tags → nothing, subtree skipped
//   7. headings → <b>
//   8. not allow-listed → flattened into children (block: line break first)
//   9. <a> → <a href> around the subtree's plain text
//  10. <span> without the spoiler class → flattened
//  11. allow-listed → same tag around the children
// Children are joined with a single space; empty renders are skipped.

use html5ever::Attribute;
use log::{debug, trace, warn};
use markup5ever_rcdom::{Handle, NodeData};

use crate::budget::{Budget, ConversionState};
use crate::highlight::highlight_codes;
use crate::policy::{
    has_class, is_block_level, is_hard_drop, is_heading, is_line_break, is_link, is_list_item,
    is_span, is_verbatim, style_hides, PolicyConfig, OUTPUT_SPOILER_CLASS,
};

const LINE_BREAK: &str = "\n";
const BULLET: &str = "• ";

pub(crate) struct Renderer<'a> {
    config: &'a PolicyConfig,
    budget: Budget,
    /// Open <code>/<pre> elements above the current node.
    verbatim_depth: usize,
    depth_warned: bool,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(config: &'a PolicyConfig) -> Self {
        Self {
            config,
            budget: Budget::new(config.max_chars, config.max_lines),
            verbatim_depth: 0,
            depth_warned: false,
        }
    }

    pub(crate) fn finish(self) -> ConversionState {
        self.budget.state()
    }

    pub(crate) fn render(&mut self, node: &Handle, depth: usize) -> String {
        if self.budget.truncated() {
            return String::new();
        }
        if depth > self.config.max_depth {
            if !self.depth_warned {
                warn!(
                    "markup nested deeper than {} levels, skipping the excess",
                    self.config.max_depth
                );
                self.depth_warned = true;
            }
            return String::new();
        }

        match &node.data {
            NodeData::Text { contents } => self.render_text(&contents.borrow()),
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => String::new(),
            NodeData::Document => self.render_children(node, depth),
            NodeData::Element { name, attrs, .. } => {
                self.render_element(node, &name.local, &attrs.borrow(), depth)
            }
        }
    }

    fn render_text(&mut self, raw: &str) -> String {
        let verbatim = self.verbatim_depth > 0;
        let text = if verbatim {
            raw.trim().to_string()
        } else {
            collapse_whitespace(raw)
        };
        if text.is_empty() || !self.charge(&text) {
            return String::new();
        }

        let escaped = escape_text(&text);
        if verbatim {
            escaped
        } else {
            highlight_codes(&escaped).into_owned()
        }
    }

    fn render_element(
        &mut self,
        node: &Handle,
        tag: &str,
        attrs: &[Attribute],
        depth: usize,
    ) -> String {
        if attr(attrs, "style").is_some_and(style_hides) {
            trace!("dropping hidden <{tag}>");
            return if is_span(tag) {
                String::new()
            } else {
                LINE_BREAK.to_string()
            };
        }
        if is_line_break(tag) {
            return LINE_BREAK.to_string();
        }
        if is_hard_drop(tag) {
            trace!("dropping <{tag}> subtree");
            return String::new();
        }
        if is_heading(tag) {
            let inner = self.render_children(node, depth);
            return format!("<b>{inner}</b>");
        }
        if !self.config.is_allowed(tag) {
            return self.flatten(node, tag, depth);
        }
        if is_link(tag) {
            return self.render_link(node, attrs);
        }
        let spoiler = &self.config.spoiler_class;
        if is_span(tag) && !attr(attrs, "class").is_some_and(|c| has_class(c, spoiler)) {
            return self.render_children(node, depth);
        }

        let verbatim = is_verbatim(tag);
        if verbatim {
            self.verbatim_depth += 1;
        }
        let inner = self.render_children(node, depth);
        if verbatim {
            self.verbatim_depth -= 1;
        }

        let tag = tag.to_ascii_lowercase();
        if is_span(&tag) {
            format!("<span class=\"{OUTPUT_SPOILER_CLASS}\">{inner}</span>")
        } else {
            format!("<{tag}>{inner}</{tag}>")
        }
    }

    /// Drop an unsupported tag but keep its content in place.
    fn flatten(&mut self, node: &Handle, tag: &str, depth: usize) -> String {
        if node.children.borrow().is_empty() {
            return LINE_BREAK.to_string();
        }
        let inner = self.render_children(node, depth);
        let mut out = String::with_capacity(inner.len() + 4);
        if is_block_level(tag) {
            out.push_str(LINE_BREAK);
        }
        if is_list_item(tag) && !inner.is_empty() {
            out.push_str(BULLET);
        }
        out.push_str(&inner);
        out
    }

    fn render_link(&mut self, node: &Handle, attrs: &[Attribute]) -> String {
        let text = visible_text(node);
        if text.is_empty() || !self.charge(&text) {
            return String::new();
        }
        let text = escape_text(&text);
        match attr(attrs, "href") {
            Some(href) => format!("<a href=\"{}\">{text}</a>", escape_attr(href)),
            None => text,
        }
    }

    fn render_children(&mut self, node: &Handle, depth: usize) -> String {
        let mut out = String::new();
        for child in node.children.borrow().iter() {
            let piece = self.render(child, depth + 1);
            if piece.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&piece);
        }
        out
    }

    fn charge(&mut self, text: &str) -> bool {
        if self.budget.accept(text.chars().count()) {
            return true;
        }
        let state = self.budget.state();
        debug!(
            "output budget exhausted at {} chars / {} lines, truncating",
            state.chars_used, state.lines_used
        );
        false
    }
}

/* ============================ Node utilities ============================= */

fn attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| (*a.name.local).eq_ignore_ascii_case(name))
        .map(|a| &*a.value)
}

/// First <body> element in document order, if any.
pub(crate) fn find_body(root: &Handle) -> Option<Handle> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if let NodeData::Element { name, .. } = &node.data {
            if (*name.local).eq_ignore_ascii_case("body") {
                return Some(node);
            }
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    None
}

/// Plain text of a subtree as a reader would see it: hidden and hard-drop
/// subtrees skipped, whitespace collapsed. Iterative, so depth is not a concern.
fn visible_text(root: &Handle) -> String {
    let mut raw = String::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        match &node.data {
            NodeData::Text { contents } => raw.push_str(&contents.borrow()),
            NodeData::Element { name, attrs, .. } => {
                let tag = &*name.local;
                if is_hard_drop(tag) || attr(&attrs.borrow(), "style").is_some_and(style_hides) {
                    continue;
                }
                if is_line_break(tag) || is_block_level(tag) {
                    raw.push(' ');
                }
                stack.extend(node.children.borrow().iter().rev().cloned());
            }
            _ => {}
        }
    }
    collapse_whitespace(&raw)
}

/* ================================ Text =================================== */

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
