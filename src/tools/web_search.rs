use super::traits::{required_str, Tool, ToolResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::json;
use std::time::Duration;

const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// DuckDuckGo web search through the no-JavaScript HTML endpoint.
pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(max_results: usize, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: DUCKDUCKGO_HTML_URL.to_string(),
            max_results,
        }
    }
}

/// DuckDuckGo wraps result links in `//duckduckgo.com/l/?uddg=<target>`.
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    if let Ok(url) = reqwest::Url::parse(&absolute) {
        if url.path().starts_with("/l/") {
            if let Some((_, target)) = url.query_pairs().find(|(k, _)| k == "uddg") {
                return target.into_owned();
            }
        }
    }
    absolute
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract organic results from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let (Ok(result_sel), Ok(title_sel), Ok(snippet_sel)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for result in document.select(&result_sel) {
        if result
            .value()
            .attr("class")
            .is_some_and(|class| class.contains("result--ad"))
        {
            continue;
        }
        let Some(anchor) = result.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let title = collapse_whitespace(&anchor.text().collect::<String>());
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(|s| collapse_whitespace(&s.text().collect::<String>()))
            .unwrap_or_default();
        results.push(SearchResult {
            title,
            link: resolve_link(href),
            snippet,
        });
        if results.len() >= max_results {
            break;
        }
    }
    results
}

pub fn format_results(results: &[SearchResult]) -> String {
    let body = results
        .iter()
        .map(|r| format!("[{}]({})\n{}", r.title, r.link, r.snippet))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("## Search Results\n\n{body}")
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Performs a duckduckgo web search based on your query (think a Google search) then returns the top search results."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to perform."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let query = required_str(&args, "query")?;
        tracing::info!(query, "Web search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;

        let results = parse_results(&html, self.max_results);
        if results.is_empty() {
            return Ok(ToolResult::fail(
                "No results found! Try a less restrictive/shorter query.",
            ));
        }
        Ok(ToolResult::ok(format_results(&results)))
    }
}
