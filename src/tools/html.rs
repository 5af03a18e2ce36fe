//! HTML to plain text conversion that keeps hyperlinks visible, so the
//! link selector can pick URLs out of search results and fetched pages.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

const SKIPPED: &[&str] = &["script", "style", "noscript", "svg", "head", "template", "iframe"];
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "li", "ul", "ol", "tr", "br", "h1", "h2", "h3", "h4",
    "h5", "h6", "pre", "blockquote", "header", "footer", "table",
];

/// Convert a full HTML document to text.
pub fn to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    walk(document.root_element(), &mut out);
    collapse_lines(&out)
}

/// Convert the first element matching `css` to text. Returns `None` when the
/// selector is invalid or nothing matches.
pub fn region_to_text(html: &str, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let document = Html::parse_document(html);
    let region = document.select(&selector).next()?;
    let mut out = String::new();
    walk(region, &mut out);
    Some(collapse_lines(&out))
}

fn walk(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED.contains(&name) {
        return;
    }

    if name == "a" {
        if let Some(href) = element.value().attr("href") {
            let mut label = String::new();
            walk_children(element, &mut label);
            out.push_str(&format!(" [{}]({}) ", collapse_whitespace(&label), href));
            return;
        }
    }

    let block = BLOCKS.contains(&name);
    if block {
        out.push('\n');
    }
    walk_children(element, out);
    if block {
        out.push('\n');
    }
}

fn walk_children(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            walk(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

/// Collapse every whitespace run into a single space.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace within each line and drop blank lines, keeping the
/// breaks block elements introduced.
pub fn collapse_lines(input: &str) -> String {
    input
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_survive_conversion() {
        let html = r#"<html><head><title>t</title><script>var x = 1;</script></head>
            <body><p>Forecast for   Paris</p>
            <a href="https://weather.example/paris">Paris <b>weather</b></a></body></html>"#;
        let text = to_text(html);
        assert!(text.contains("Forecast for Paris"));
        assert!(text.contains("[Paris weather](https://weather.example/paris)"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn test_region_extraction() {
        let html = r#"<body><nav>menu</nav><div id="urls"><article>
            <a href="https://a.example">A</a> snippet one</article></div></body>"#;
        let text = region_to_text(html, "#urls").unwrap();
        assert!(text.contains("[A](https://a.example) snippet one"));
        assert!(!text.contains("menu"));

        assert!(region_to_text(html, "#missing").is_none());
    }

    #[test]
    fn test_blocks_stay_on_separate_lines() {
        let html = "<body><h2>Release   notes</h2><p>first\n  paragraph</p><ul><li>one</li><li>two</li></ul></body>";
        assert_eq!(to_text(html), "Release notes\nfirst\nparagraph\none\ntwo");
    }
}
