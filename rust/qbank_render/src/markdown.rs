//! A deliberately small Markdown dialect: headings, emphasis, strikethrough,
//! code, blockquotes, flat lists, links and rules. Nested structures such as
//! a list inside a blockquote are not recognized.
//!
//! Text is not escaped here. The display pipeline escapes it before this
//! pass, which is why a blockquote marker may also arrive as `&gt; `.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::RenderConfig;

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"^(#{1,6}) (.*)$").unwrap();
    static ref QUOTE: Regex = Regex::new(r"^(?:>|&gt;) (.*)$").unwrap();
    static ref UNORDERED_ITEM: Regex = Regex::new(r"^- (.*)$").unwrap();
    static ref ORDERED_ITEM: Regex = Regex::new(r"^\d+\. (.*)$").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*([^*]+)\*").unwrap();
    static ref STRIKE: Regex = Regex::new(r"~~([^~]+)~~").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    static ref CODE_SLOT: Regex = Regex::new("\u{E000}(\\d+)\u{E001}").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// How a single source line is treated by the block pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line<'a> {
    FenceOpen { info: &'a str },
    FenceInline(&'a str),
    Heading(usize, &'a str),
    Rule,
    Quote(&'a str),
    Item(ListKind, &'a str),
    Text(&'a str),
}

pub fn classify_line(line: &str) -> Line<'_> {
    if let Some(rest) = line.trim_start().strip_prefix("```") {
        return match rest.find("```") {
            Some(end) => Line::FenceInline(&rest[..end]),
            None => Line::FenceOpen { info: rest.trim() },
        };
    }
    if line == "---" {
        return Line::Rule;
    }
    if let Some(caps) = HEADING.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.len());
        let body = caps.get(2).map_or("", |m| m.as_str());
        return Line::Heading(level, body);
    }
    if let Some(body) = QUOTE.captures(line).and_then(|c| c.get(1)) {
        return Line::Quote(body.as_str());
    }
    if let Some(body) = UNORDERED_ITEM.captures(line).and_then(|c| c.get(1)) {
        return Line::Item(ListKind::Unordered, body.as_str());
    }
    if let Some(body) = ORDERED_ITEM.captures(line).and_then(|c| c.get(1)) {
        return Line::Item(ListKind::Ordered, body.as_str());
    }
    Line::Text(line)
}

/// Attribute values arrive with `&`, `<` and `>` already escaped by the
/// display pipeline; only the quote is left to close off.
fn quote_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

fn sanitize_href(href: &str) -> Option<String> {
    let h = href.trim();
    if h.is_empty() {
        return None;
    }
    let low = h.to_ascii_lowercase();
    if low.starts_with("javascript:") || low.starts_with("data:") || low.starts_with("vbscript:") {
        return None;
    }
    Some(h.to_string())
}

/// Inline rules, in order: code spans (set aside), bold, italic,
/// strikethrough, links.
pub fn render_inline(text: &str, cfg: &RenderConfig) -> String {
    let mut code_spans: Vec<String> = Vec::new();
    let s = INLINE_CODE.replace_all(text, |caps: &Captures| {
        code_spans.push(format!("<code>{}</code>", &caps[1]));
        format!("\u{E000}{}\u{E001}", code_spans.len() - 1)
    });

    let s = BOLD.replace_all(&s, "<strong>${1}</strong>");
    let s = ITALIC.replace_all(&s, "<em>${1}</em>");
    let s = STRIKE.replace_all(&s, "<del>${1}</del>");
    let s = LINK.replace_all(&s, |caps: &Captures| match sanitize_href(&caps[2]) {
        Some(href) if cfg.link_target_blank => {
            format!(r#"<a href="{}" target="_blank">{}</a>"#, quote_attr(&href), &caps[1])
        }
        Some(href) => format!(r#"<a href="{}">{}</a>"#, quote_attr(&href), &caps[1]),
        None => caps[1].to_string(),
    });

    if code_spans.is_empty() {
        return s.into_owned();
    }
    CODE_SLOT
        .replace_all(&s, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| code_spans.get(i).cloned())
                .unwrap_or_default()
        })
        .into_owned()
}

fn code_block(info: &str, lines: &[&str]) -> String {
    let open = if info.is_empty() {
        "<pre><code>".to_string()
    } else {
        format!(r#"<pre><code class="language-{}">"#, quote_attr(info))
    };
    format!("{open}{}</code></pre>", lines.join("\n"))
}

fn flush_list(out: &mut Vec<String>, list: &mut Option<(ListKind, Vec<String>)>) {
    if let Some((kind, items)) = list.take() {
        let tag = match kind {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        };
        out.push(format!("<{tag}>{}</{tag}>", items.concat()));
    }
}

pub fn render_markdown_with(text: &str, cfg: &RenderConfig) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut list: Option<(ListKind, Vec<String>)> = None;
    let mut fence: Option<(&str, Vec<&str>)> = None;

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some((info, code)) = fence.as_mut() {
            if line.trim_start().starts_with("```") {
                out.push(code_block(info, code.as_slice()));
                fence = None;
            } else {
                code.push(line);
            }
            continue;
        }

        let kind = classify_line(line);
        let continues_list = matches!(
            (&kind, &list),
            (Line::Item(k, _), Some((open, _))) if k == open
        );
        if !continues_list {
            flush_list(&mut out, &mut list);
        }

        match kind {
            Line::FenceOpen { info } => fence = Some((info, Vec::new())),
            Line::FenceInline(code) => out.push(code_block("", &[code])),
            Line::Heading(level, body) => {
                out.push(format!("<h{level}>{}</h{level}>", render_inline(body, cfg)))
            }
            Line::Rule => out.push("<hr>".to_string()),
            Line::Quote(body) => {
                out.push(format!("<blockquote>{}</blockquote>", render_inline(body, cfg)))
            }
            Line::Item(k, body) => {
                let item = format!("<li>{}</li>", render_inline(body, cfg));
                match list.as_mut() {
                    Some((_, items)) => items.push(item),
                    None => list = Some((k, vec![item])),
                }
            }
            Line::Text(body) => out.push(render_inline(body, cfg)),
        }
    }

    flush_list(&mut out, &mut list);
    if let Some((info, code)) = fence {
        out.push(code_block(info, &code));
    }
    out.join("\n")
}

pub fn render_markdown(text: &str) -> String {
    render_markdown_with(text, RenderConfig::shared())
}
