//! Markdown to HTML rendering using pulldown-cmark.

use std::collections::HashSet;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Extensions enabled for every document.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render a Markdown document to an HTML fragment.
///
/// Headings without an explicit `{#id}` get a slug id so `#anchor` links
/// into the document resolve.
pub fn render_markdown(raw: &str) -> String {
    let events: Vec<Event<'_>> = Parser::new_ext(raw, options()).collect();
    let events = assign_heading_ids(events);

    let mut out = String::with_capacity(raw.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let slug = unique_slug(slugify(&text), &mut used);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(slug.into());
        }
    }

    events
}

/// Lowercase, drop punctuation, join words with `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        }
    }

    slug
}

fn unique_slug(slug: String, used: &mut HashSet<String>) -> String {
    let base = if slug.is_empty() { "section".to_string() } else { slug };
    let mut candidate = base.clone();
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_paragraph_and_link() {
        let html = render_markdown("See [other](other.md).");
        assert_eq!(html, "<p>See <a href=\"other.md\">other</a>.</p>\n");
    }

    #[test]
    fn test_heading_gets_slug_id() {
        let html = render_markdown("# Getting Started!");
        assert_eq!(html, "<h1 id=\"getting-started\">Getting Started!</h1>\n");
    }

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let html = render_markdown("## Notes\n\n## Notes\n\n## Notes\n");
        assert!(html.contains("<h2 id=\"notes\">"));
        assert!(html.contains("<h2 id=\"notes_1\">"));
        assert!(html.contains("<h2 id=\"notes_2\">"));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let html = render_markdown("# Intro {#start}\n\n# Start\n");
        assert!(html.contains("<h1 id=\"start\">Intro</h1>"));
        assert!(html.contains("<h1 id=\"start_1\">Start</h1>"));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let html = render_markdown("### The `bump` call");
        assert!(html.contains("<h3 id=\"the-bump-call\">"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_strikethrough_and_tasklists_enabled() {
        let html = render_markdown("~~old~~\n\n- [x] done\n");
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  a -- b  "), "a-b");
        assert_eq!(slugify("snake_case"), "snake_case");
        assert_eq!(slugify("Ünïcode Title"), "ünïcode-title");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_empty_heading_text() {
        let html = render_markdown("# !!!");
        assert!(html.contains("id=\"section\""));
    }
}
