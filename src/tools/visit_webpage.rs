use super::traits::{required_str, Tool, ToolResult};
use super::web_search::USER_AGENT;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Node};
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

/// Pages longer than this are cut in the middle.
pub const MAX_PAGE_CHARS: usize = 40_000;

const SKIPPED_TAGS: [&str; 6] = ["script", "style", "noscript", "head", "template", "svg"];
const BLOCK_TAGS: [&str; 22] = [
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "header", "footer", "ul", "ol", "table", "blockquote", "pre", "main", "nav",
];

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

/// Links worth keeping: not in-page anchors or script handlers.
fn followable_href(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:")
}

/// The `href` of an `<a>` element that should be rendered as a link.
fn anchor_href(node: &Node) -> Option<&str> {
    node.as_element()
        .filter(|el| el.name() == "a")
        .and_then(|el| el.attr("href"))
        .filter(|href| followable_href(href))
        .map(str::trim)
}

fn push_inline(out: &mut String, words: &str) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push(' ');
    }
    out.push_str(words);
}

/// Readable text of an HTML page, one block element per line. Links are
/// kept as markdown `[text](href)` so they can be visited next.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for node in document.root_element().descendants() {
        let in_skipped = || {
            node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
            })
        };
        match node.value() {
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => out.push('\n'),
            Node::Element(_) => {
                let Some(href) = anchor_href(node.value()) else {
                    continue;
                };
                if in_skipped() {
                    continue;
                }
                let label = ElementRef::wrap(node)
                    .map(|a| a.text().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
                if !label.is_empty() {
                    push_inline(&mut out, &format!("[{label}]({href})"));
                }
            }
            Node::Text(text) => {
                if in_skipped() || node.ancestors().any(|a| anchor_href(a.value()).is_some()) {
                    continue;
                }
                let words = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if words.is_empty() {
                    continue;
                }
                push_inline(&mut out, &words);
            }
            _ => {}
        }
    }

    let lines = out.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    blank_lines_re()
        .replace_all(lines.trim(), "\n\n")
        .into_owned()
}

/// Keep the head and tail of overly long content.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    let total = content.chars().count();
    if total <= max_chars {
        return content.to_string();
    }
    let half = max_chars / 2;
    let head: String = content.chars().take(half).collect();
    let tail: String = content.chars().skip(total - half).collect();
    format!(
        "{head}\n..._This content has been truncated to stay below {max_chars} characters_...\n{tail}"
    )
}

/// Fetches a URL and returns its text content.
pub struct VisitWebpageTool {
    client: Client,
}

impl VisitWebpageTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl Tool for VisitWebpageTool {
    fn name(&self) -> &str {
        "visit_webpage"
    }

    fn description(&self) -> &str {
        "Visits a webpage at the given url and reads its content as text. \
         Use this to browse webpages found with web_search."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The url of the webpage to visit."
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let url = required_str(&args, "url")?;
        tracing::info!(url, "Visiting webpage");

        match self.fetch(url).await {
            Ok(html) => Ok(ToolResult::ok(truncate_content(
                &html_to_text(&html),
                MAX_PAGE_CHARS,
            ))),
            Err(e) if e.is_timeout() => Ok(ToolResult::ok(
                "The request timed out. Please try again later or check the URL.",
            )),
            Err(e) => Ok(ToolResult::ok(format!("Error fetching the webpage: {e}"))),
        }
    }
}
