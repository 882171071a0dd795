//! HTML to Markdown conversion for fetched pages
//!
//! Rendered Wikipedia HTML is mostly attribute noise. Converting it to a
//! light Markdown keeps headings, lists, emphasis and table cells while
//! cutting the payload the model has to read.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static SCRIPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static STYLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<sup\b[^>]*class="[^"]*reference[^"]*"[^>]*>.*?</sup>"#).unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]>").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<(?:b|strong)\b[^>]*>(.*?)</(?:b|strong)>").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<(?:i|em)\b[^>]*>(.*?)</(?:i|em)>").unwrap());
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li\b[^>]*>").unwrap());
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:p|div|ul|ol|dl|dd|dt|blockquote|table)>").unwrap());
static ROW_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</tr>").unwrap());
static CELL_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</t[dh]>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());
static TRAILING_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Convert an HTML fragment to Markdown
pub fn html_to_markdown(html: &str) -> String {
    let mut text = html.to_string();

    for pattern in [&*COMMENT, &*SCRIPT, &*STYLE, &*REFERENCE] {
        text = pattern.replace_all(&text, "").into_owned();
    }

    text = HEADING
        .replace_all(&text, |caps: &Captures| {
            let level: usize = caps[1].parse().unwrap_or(1);
            format!("\n\n{} {}\n\n", "#".repeat(level), strip_tags(&caps[2]).trim())
        })
        .into_owned();

    text = LINK
        .replace_all(&text, |caps: &Captures| {
            let href = &caps[1];
            let label = strip_tags(&caps[2]);
            if href.starts_with("http://") || href.starts_with("https://") {
                format!("[{}]({})", label.trim(), href)
            } else {
                label
            }
        })
        .into_owned();

    text = BOLD.replace_all(&text, "**$1**").into_owned();
    text = ITALIC.replace_all(&text, "*$1*").into_owned();
    text = LIST_ITEM.replace_all(&text, "\n- ").into_owned();
    text = LINE_BREAK.replace_all(&text, "\n").into_owned();
    text = BLOCK_END.replace_all(&text, "\n\n").into_owned();
    text = ROW_END.replace_all(&text, "\n").into_owned();
    text = CELL_END.replace_all(&text, " | ").into_owned();

    text = decode_entities(&strip_tags(&text));

    text = TRAILING_SPACE.replace_all(&text, "\n").into_owned();
    text = BLANK_LINES.replace_all(&text, "\n\n").into_owned();
    text.trim().to_string()
}

fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Decode the entities MediaWiki emits. `&amp;` goes last so `&amp;lt;`
/// stays a literal `&lt;`.
fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(text, |caps: &Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&amp;", "&")
}
