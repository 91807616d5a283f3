use html_scraper::{ElementRef, Html, Node, Selector};

/// Element budget for the main-content scan. Huge pages fall back to body text.
const MAX_SCANNED_ELEMENTS: usize = 20_000;

/// Candidates with less visible text than this are never picked.
const MIN_BLOCK_CHARS: usize = 20;

/// Class/id words that mark page chrome rather than content.
const BOILERPLATE_WORDS: &[&str] = &[
    "nav",
    "navbar",
    "navigation",
    "menu",
    "sidebar",
    "footer",
    "header",
    "masthead",
    "banner",
    "breadcrumb",
    "breadcrumbs",
    "cookie",
    "cookies",
    "consent",
    "ad",
    "ads",
    "advert",
    "advertisement",
    "sponsored",
    "promo",
    "subscribe",
    "newsletter",
];

fn has_any_text(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// "html_main" | "body_text" | "empty"
    pub engine: &'static str,
    pub text: String,
    pub warnings: Vec<&'static str>,
}

/// Lossy UTF-8 decode of a response body, dropping a leading BOM.
pub fn decode_body(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Elements whose text is never shown to a reader.
fn is_non_content_tag(name: &str) -> bool {
    matches!(name, "script" | "style" | "noscript" | "template")
}

/// Navigation, sidebars, headers and footers, by element name.
fn is_chrome_tag(name: &str) -> bool {
    matches!(name, "nav" | "aside" | "header" | "footer")
}

/// Whole-word match of class/id against [`BOILERPLATE_WORDS`].
///
/// `site-nav` and `ad_slot` match; `canvas` and `downloads` do not.
fn is_generic_boilerplate_container(el: &ElementRef) -> bool {
    let v = el.value();
    v.attr("class")
        .into_iter()
        .chain(v.attr("id"))
        .flat_map(|s| s.split(|c: char| c.is_ascii_whitespace() || c == '-' || c == '_'))
        .filter(|w| !w.is_empty())
        .any(|w| {
            BOILERPLATE_WORDS
                .iter()
                .any(|bad| w.eq_ignore_ascii_case(bad))
        })
}

fn is_chrome(el: &ElementRef) -> bool {
    is_chrome_tag(el.value().name()) || is_generic_boilerplate_container(el)
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "br"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "td"
            | "th"
            | "tr"
            | "ul"
    )
}

#[derive(Debug, Default)]
struct Visible {
    /// Raw text with a line break before every block element.
    text: String,
    text_chars: usize,
    link_chars: usize,
}

/// Walk the subtree under `root` in document order, skipping non-content subtrees (and
/// chrome subtrees when `skip_chrome`).
///
/// Iterative so deeply nested markup cannot overflow the stack.
fn visible_text(root: &ElementRef, skip_chrome: bool) -> Visible {
    let mut out = Visible::default();
    let mut stack: Vec<_> = root.children().map(|n| (n, false)).collect();
    stack.reverse();
    while let Some((node, in_link)) = stack.pop() {
        match node.value() {
            Node::Text(t) => {
                let n = t.chars().count();
                out.text_chars += n;
                if in_link {
                    out.link_chars += n;
                }
                out.text.push_str(t);
            }
            Node::Element(e) => {
                let Some(el) = ElementRef::wrap(node) else {
                    continue;
                };
                if is_non_content_tag(e.name()) || (skip_chrome && is_chrome(&el)) {
                    continue;
                }
                if is_block_tag(e.name()) {
                    out.text.push('\n');
                }
                let in_link = in_link || e.name() == "a";
                let first = stack.len();
                stack.extend(node.children().map(|c| (c, in_link)));
                stack[first..].reverse();
            }
            _ => {}
        }
    }
    out
}

/// Trim every line and drop empty ones. Line structure is kept: the normalizer filters
/// whole lines.
fn tidy_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn block_text(el: &ElementRef, skip_chrome: bool) -> String {
    tidy_lines(&visible_text(el, skip_chrome).text)
}

/// True when `el` sits inside chrome or a non-content element.
fn has_excluded_ancestor(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_non_content_tag(a.value().name()) || is_chrome(&a))
}

fn pick_main_element<'a>(doc: &'a Html, max_elems: usize) -> Option<ElementRef<'a>> {
    let sel = Selector::parse("article, main, section, div").ok()?;
    let mut best_score: i64 = 0;
    let mut best: Option<ElementRef<'a>> = None;

    for (seen, el) in doc.select(&sel).enumerate() {
        if seen >= max_elems {
            break;
        }
        if is_generic_boilerplate_container(&el) || has_excluded_ancestor(&el) {
            continue;
        }
        let vis = visible_text(&el, true);
        let txt = vis.text_chars;
        if txt < MIN_BLOCK_CHARS {
            continue;
        }
        let link_txt = vis.link_chars;
        // Dense non-link text wins; link text is usually navigation or tag clouds.
        let mut score = txt as i64 - 2 * (link_txt as i64);
        match el.value().name() {
            "article" => score += 500,
            "main" => score += 300,
            _ => {}
        }
        if link_txt > txt / 2 {
            score -= 500;
        }
        if score > best_score {
            best_score = score;
            best = Some(el);
        }
    }
    best
}

/// Main readable text of an HTML document.
///
/// Tries the article-like block first and falls back to the whole `<body>`. Script, style,
/// noscript and template subtrees never contribute text, however the markup is written.
/// Never fails: unusable input yields an empty text with `engine = "empty"`.
pub fn extract_main_text(html: &str, base_url: Option<&str>) -> ExtractedText {
    let mut warnings: Vec<&'static str> = Vec::new();
    let doc = Html::parse_document(html);

    if let Some(el) = pick_main_element(&doc, MAX_SCANNED_ELEMENTS) {
        let text = block_text(&el, true);
        if has_any_text(&text) {
            warnings.push("boilerplate_reduced");
            return ExtractedText {
                engine: "html_main",
                text,
                warnings,
            };
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next());
    let body_text = match body {
        Some(b) => {
            // A page made only of chrome still has something to say.
            let t = block_text(&b, true);
            if has_any_text(&t) {
                t
            } else {
                block_text(&b, false)
            }
        }
        None => String::new(),
    };
    if has_any_text(&body_text) {
        warnings.push("body_text_fallback");
        return ExtractedText {
            engine: "body_text",
            text: body_text,
            warnings,
        };
    }

    if base_url.map(|u| !u.trim().is_empty()).unwrap_or(false) {
        warnings.push("no_text_extracted");
    }
    ExtractedText {
        engine: "empty",
        text: String::new(),
        warnings,
    }
}

/// Convenience form of [`extract_main_text`] returning only the text.
pub fn extract(html: &str, base_url: Option<&str>) -> String {
    extract_main_text(html, base_url).text
}
