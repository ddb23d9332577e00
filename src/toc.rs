//! Table of contents for the markdown reference.
//!
//! Files become collapsible sections, chapters nest inside them, and items
//! are bullet links. Entries link to the anchors the markdown renderer
//! emits; headings without one fall back to a GitHub slug.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<a id='([^']+)'></a>").unwrap());

static RE_FILE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a id='file-([^']+)'></a>").unwrap());

static RE_CHAPTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"📑([^<]+)</i>").unwrap());

static RE_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#### (.+?)<a id=").unwrap());

static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

static RE_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());

static RE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").unwrap());

static RE_SLUG_DROP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// GitHub heading anchor for `heading`.
///
/// - drop bold, italic and code markers
/// - lowercase
/// - `" : "` becomes `--`
/// - remove everything but word chars, whitespace and hyphens
/// - whitespace runs become a hyphen
pub fn github_slug(heading: &str) -> String {
    let text = RE_BOLD.replace_all(heading, "$1");
    let text = RE_ITALIC.replace_all(&text, "$1");
    let text = RE_CODE.replace_all(&text, "$1");
    let text = text.to_lowercase().replace(" : ", "--");
    let text = RE_SLUG_DROP.replace_all(&text, "");
    RE_SPACES.replace_all(text.trim(), "-").into_owned()
}

fn link(text: &str, anchor: &str) -> String {
    format!("<a href=\"#{}\">{}</a>", anchor, text)
}

/// Chapter anchors mapped to whether any `#### ` item follows them.
fn chapters_with_items(lines: &[&str]) -> HashMap<String, bool> {
    let mut chapters = HashMap::new();
    let mut current: Option<String> = None;
    for line in lines {
        if line.starts_with("### ") {
            if let Some(caps) = RE_ANCHOR.captures(line) {
                chapters.insert(caps[1].to_string(), false);
                current = Some(caps[1].to_string());
            }
        } else if line.starts_with("#### ") {
            if let Some(ref anchor) = current {
                chapters.insert(anchor.clone(), true);
            }
        } else if line.starts_with("## ") {
            current = None;
        }
    }
    chapters
}

#[derive(Default)]
struct Toc {
    out: Vec<String>,
    items: Vec<String>,
    in_file: bool,
    in_chapter: bool,
}

impl Toc {
    fn flush_items(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.out.push("<blockquote>".to_string());
        for item in self.items.drain(..) {
            self.out.push(format!("• {}<br>", item));
        }
        self.out.push("</blockquote>".to_string());
    }

    fn close_chapter(&mut self) {
        if self.in_chapter {
            self.flush_items();
            self.out.push("</details>".to_string());
            self.in_chapter = false;
        }
    }

    fn close_file(&mut self) {
        if self.in_file {
            self.close_chapter();
            // items directly under the file heading
            self.flush_items();
            self.out.push("</blockquote>".to_string());
            self.out.push("</details>".to_string());
            self.out.push(String::new());
            self.in_file = false;
        }
    }
}

/// Table of contents for `markdown`, empty if it has no headings.
pub fn generate(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let has_items = chapters_with_items(&lines);
    let mut toc = Toc::default();

    for line in &lines {
        if line.starts_with("## ") {
            toc.close_file();
            if let Some(caps) = RE_FILE_ANCHOR.captures(line) {
                let file = &caps[1];
                let summary = link(&format!("📘 <b>{}</b>", file), &format!("file-{}", file));
                toc.out.push(format!("<details><summary>{}</summary>", summary));
                toc.out.push("<blockquote>".to_string());
                toc.in_file = true;
            }
        } else if line.starts_with("### ") {
            toc.close_chapter();
            let (Some(anchor), Some(text)) = (RE_ANCHOR.captures(line), RE_CHAPTER.captures(line)) else {
                continue;
            };
            let summary = link(&format!("📑 <i>{}</i>", &text[1]), &anchor[1]);
            if has_items.get(&anchor[1]).copied().unwrap_or(false) {
                toc.flush_items();
                toc.out.push(format!("<details><summary>{}</summary>", summary));
                toc.in_chapter = true;
            } else {
                toc.out.push(format!("• {}<br>", summary));
            }
        } else if let Some(heading) = line.strip_prefix("#### ") {
            let item = match (RE_ANCHOR.captures(line), RE_ITEM.captures(line)) {
                (Some(anchor), Some(text)) => link(&text[1].trim().replace("\\_", "_"), &anchor[1]),
                (Some(_), None) => continue,
                (None, _) => {
                    let heading = heading.trim();
                    link(&RE_BOLD.replace_all(heading, "$1"), &github_slug(heading))
                }
            };
            toc.items.push(item);
        }
    }
    toc.close_file();
    // headings outside any file section
    toc.flush_items();

    if toc.out.is_empty() {
        return String::new();
    }
    let mut text = toc.out.join("\n");
    text.push('\n');
    text
}
