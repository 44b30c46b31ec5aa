//! Rich-content (Portable Text) rendering with syntax highlighting

use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::image::ImageResolver;
use super::model::{AssetRef, ImageRef};
use crate::error::Result;
use crate::helpers::html_escape;

/// One node of a rich-content body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "code")]
    Code(CodeBlock),
    #[serde(other)]
    Unknown,
}

/// Paragraph, heading, quote or list item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(rename = "listItem", default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<usize>,
}

/// Inline run of text with decorators and annotation keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation referenced from span marks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub asset: AssetRef,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Converts block trees into HTML
pub struct PortableTextRenderer {
    images: ImageResolver,
    image_width: u32,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl PortableTextRenderer {
    pub fn new(images: ImageResolver, image_width: u32) -> Self {
        Self {
            images,
            image_width,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
        }
    }

    /// Render a body to HTML
    pub fn render(&self, blocks: &[Block]) -> Result<String> {
        let mut html = String::new();
        let mut lists: Vec<&'static str> = Vec::new();

        for block in blocks {
            match block {
                Block::Text(text) if text.list_item.is_some() => {
                    self.push_list_item(&mut html, &mut lists, text);
                }
                _ => {
                    close_lists(&mut html, &mut lists, 0);
                    self.push_block(&mut html, block)?;
                }
            }
        }
        close_lists(&mut html, &mut lists, 0);

        Ok(html)
    }

    fn push_list_item(&self, html: &mut String, lists: &mut Vec<&'static str>, text: &TextBlock) {
        let tag = match text.list_item.as_deref() {
            Some("number") => "ol",
            _ => "ul",
        };
        // A list can only nest one level deeper than the innermost open list
        let level = text.level.unwrap_or(1).clamp(1, lists.len() + 1);

        close_lists(html, lists, level);
        if lists.len() == level {
            if lists.last() == Some(&tag) {
                html.push_str("</li>");
            } else {
                close_lists(html, lists, level - 1);
            }
        }
        while lists.len() < level {
            html.push('<');
            html.push_str(tag);
            html.push('>');
            lists.push(tag);
        }

        html.push_str("<li>");
        html.push_str(&render_spans(text));
    }

    fn push_block(&self, html: &mut String, block: &Block) -> Result<()> {
        match block {
            Block::Text(text) => {
                let tag = match text.style.as_deref() {
                    Some(h @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => h,
                    Some("blockquote") => "blockquote",
                    _ => "p",
                };
                html.push_str(&format!("<{tag}>{}</{tag}>", render_spans(text)));
            }
            Block::Image(image) => {
                let image_ref = ImageRef::Image {
                    asset: image.asset.clone(),
                    alt: image.alt.clone(),
                };
                let src = self.images.resolve_width(&image_ref, self.image_width)?;
                let alt = html_escape(image.alt.as_deref().unwrap_or(""));
                html.push_str(&format!(r#"<figure><img src="{src}" alt="{alt}">"#));
                if let Some(caption) = &image.caption {
                    html.push_str(&format!("<figcaption>{}</figcaption>", html_escape(caption)));
                }
                html.push_str("</figure>");
            }
            Block::Code(code) => {
                if let Some(filename) = &code.filename {
                    html.push_str(&format!(
                        r#"<div class="code-filename">{}</div>"#,
                        html_escape(filename)
                    ));
                }
                html.push_str(&self.highlight_code(&code.code, code.language.as_deref()));
            }
            Block::Unknown => {
                tracing::debug!("Skipping unsupported block type");
            }
        }
        Ok(())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
            .and_then(|theme| {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            });

        match highlighted {
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

/// Close open lists until only `depth` remain
fn close_lists(html: &mut String, lists: &mut Vec<&'static str>, depth: usize) {
    while lists.len() > depth {
        if let Some(tag) = lists.pop() {
            html.push_str("</li></");
            html.push_str(tag);
            html.push('>');
        }
    }
}

fn render_spans(block: &TextBlock) -> String {
    block
        .children
        .iter()
        .filter(|span| span.kind.is_empty() || span.kind == "span")
        .map(|span| render_span(span, &block.mark_defs))
        .collect()
}

/// Relative, fragment, and http(s)/mailto/tel links are rendered; other schemes are dropped
fn is_safe_href(href: &str) -> bool {
    let href = href.trim();
    let scheme_end = href.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if href[i..].starts_with(':') => {
            let scheme = href[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel")
        }
        _ => !href.chars().any(|c| c.is_control()),
    }
}

fn render_span(span: &Span, mark_defs: &[MarkDef]) -> String {
    let text = html_escape(&span.text).replace('\n', "<br>");
    let mut open = String::new();
    let mut close = Vec::new();

    for mark in &span.marks {
        let (start, end) = match mark.as_str() {
            "strong" => ("<strong>".to_string(), "</strong>"),
            "em" => ("<em>".to_string(), "</em>"),
            "code" => ("<code>".to_string(), "</code>"),
            "underline" => (r#"<span style="text-decoration:underline">"#.to_string(), "</span>"),
            "strike-through" => ("<del>".to_string(), "</del>"),
            key => match mark_defs.iter().find(|def| def.key == key) {
                Some(MarkDef {
                    kind,
                    href: Some(href),
                    ..
                }) if kind == "link" && is_safe_href(href) => {
                    (format!(r#"<a href="{}">"#, html_escape(href)), "</a>")
                }
                Some(MarkDef { kind, href, .. }) if kind == "link" => {
                    tracing::warn!("Dropping link with unsafe href {:?}", href);
                    continue;
                }
                _ => continue,
            },
        };
        open.push_str(&start);
        close.push(end);
    }

    let mut out = open;
    out.push_str(&text);
    for end in close.into_iter().rev() {
        out.push_str(end);
    }
    out
}
