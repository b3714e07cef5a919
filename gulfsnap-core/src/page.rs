//! Parsed page documents and element traversal helpers

use scraper::{ElementRef, Html, Selector};

use crate::normalize::clean;

/// A parsed HTML document scoped to synchronous read-only queries.
///
/// The underlying parse tree is not `Send`; parse a fetched body, query it,
/// and drop it before the next await point.
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// True when at least one element matches `css`. Unparsable CSS matches
    /// nothing.
    pub fn has(&self, css: &str) -> bool {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).next().is_some(),
            Err(_) => false,
        }
    }

    /// Collected text of the first element matching `css`.
    pub fn first_text(&self, css: &str) -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        self.html.select(&selector).next().map(|el| text_of(&el))
    }

    /// All elements matching `css`, in document order.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The document's rendered text with script and style content excluded,
    /// whitespace-collapsed.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_visible(self.html.root_element(), &mut out);
        clean(&out)
    }
}

fn collect_visible(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
        return;
    }
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            collect_visible(child_el, out);
        }
    }
}

/// Concatenated text of an element and its descendants.
pub fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// First direct text-node child, trimmed; text inside child elements is
/// ignored.
pub fn own_text(el: &ElementRef<'_>) -> Option<String> {
    el.children()
        .find_map(|node| node.value().as_text())
        .map(|text| text.trim().to_string())
}

/// Next sibling that is an element, skipping text and comment nodes.
pub fn next_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// First descendant of `el` matching `css`.
pub fn first_element_in<'a>(el: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    el.select(&selector).next()
}

/// All descendants of `el` matching `css`, in document order.
pub fn elements_in<'a>(el: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => el.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collected text of the first descendant of `el` matching `css`.
pub fn first_text_in(el: &ElementRef<'_>, css: &str) -> Option<String> {
    first_element_in(el, css).map(|child| text_of(&child))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <div class="quote">
                <h3>OPEN PRICE</h3> stray text <span>3.14</span>
            </div>
            <div class="price">24.56 <span class="delta">+1.2%</span></div>
            <script>var hidden = 1;</script>
            <p>Hello  <b>world</b></p>
        </body></html>
    "#;

    #[test]
    fn test_has_and_first_text() {
        let doc = PageDocument::parse(PAGE);
        assert!(doc.has(".quote"));
        assert!(!doc.has(".missing"));
        assert_eq!(doc.first_text(".delta"), Some("+1.2%".to_string()));
        assert_eq!(doc.first_text(".missing"), None);
    }

    #[test]
    fn test_unparsable_selector_matches_nothing() {
        let doc = PageDocument::parse(PAGE);
        assert!(!doc.has("p["));
        assert_eq!(doc.first_text("p["), None);
        assert!(doc.select("p[").is_empty());
    }

    #[test]
    fn test_next_element_skips_text_nodes() {
        let doc = PageDocument::parse(PAGE);
        let heading = doc.select("h3")[0];
        let value = next_element(&heading).unwrap();
        assert_eq!(text_of(&value), "3.14");
    }

    #[test]
    fn test_own_text_ignores_child_elements() {
        let doc = PageDocument::parse(PAGE);
        let price = doc.select(".price")[0];
        assert_eq!(own_text(&price), Some("24.56".to_string()));
        assert_eq!(first_text_in(&price, ".delta"), Some("+1.2%".to_string()));
    }

    #[test]
    fn test_visible_text_excludes_script_content() {
        let doc = PageDocument::parse(PAGE);
        let text = doc.visible_text();
        assert!(text.contains("Hello world"));
        assert!(!text.contains("hidden"));
    }
}
