use std::sync::LazyLock;

use regex::{Captures, Regex};

static TABLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:table|tbody|thead|tr|td|th)\b[^>]*>").expect("valid table tag regex")
});

// Markdown links come first in the alternation so their target is not
// linkified a second time as a bare URL.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[([^\]]+)\]\((https?://[^)]+)\)|(https?://[^\s<]+)")
        .expect("valid link regex")
});

/// Prepares transcript text for HTML display: table markup is stripped and
/// both bare URLs and `[text](url)` links become anchors.
pub fn render_transcript_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = TABLE_TAG_RE.replace_all(text, "");
    LINK_RE
        .replace_all(&stripped, |caps: &Captures| {
            match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(label), Some(url), _) => anchor(url.as_str(), label.as_str()),
                (_, _, Some(url)) => anchor(url.as_str(), url.as_str()),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn anchor(url: &str, label: &str) -> String {
    let href = url.replace('"', "&quot;");
    format!(r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{label}</a>"#)
}

#[cfg(test)]
mod tests {
    use super::render_transcript_html;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(render_transcript_html(""), "");
    }

    #[test]
    fn table_tags_are_stripped_case_insensitively() {
        let html = "<TABLE class=\"x\"><tr><TD>cell</td></tr></table><track>";
        assert_eq!(render_transcript_html(html), "cell<track>");
    }

    #[test]
    fn bare_and_markdown_links_become_anchors() {
        let text = "See https://a.example/x and [docs](https://b.example/d).";
        let html = render_transcript_html(text);
        assert_eq!(
            html,
            "See <a href=\"https://a.example/x\" target=\"_blank\" rel=\"noopener noreferrer\">https://a.example/x</a> \
             and <a href=\"https://b.example/d\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a>."
        );
    }

    #[test]
    fn quotes_in_urls_are_escaped() {
        let html = render_transcript_html("http://q.example/\"x");
        assert!(html.contains("href=\"http://q.example/&quot;x\""));
    }
}
