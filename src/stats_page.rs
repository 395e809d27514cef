//! Extraction of the `statistics` block from a player stats page.
//!
//! The block is a run of `<div class="stats-row">` elements, each holding a
//! label span followed by a value span.

use std::collections::HashMap;

use thiserror::Error;

const BLOCK_CLASS: &str = "statistics";
const ROW_CLASS: &str = "stats-row";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("statistics block not found on page")]
    MissingBlock,
    #[error("statistics block has no rows")]
    NoRows,
}

struct Tag<'a> {
    start: usize,
    end: usize,
    name: &'a str,
    attrs: &'a str,
}

pub fn parse_stats_block(html: &str) -> Result<HashMap<String, String>, PageError> {
    let block = find_tag_with_class(html, BLOCK_CLASS, 0).ok_or(PageError::MissingBlock)?;

    let block_html = &html[..block_end(html, block.end)];

    let mut stats = HashMap::new();
    let mut cursor = block.end;
    while let Some(row) = find_tag_with_class(block_html, ROW_CLASS, cursor) {
        let row_end = find_ci(block_html, "</div", row.end).unwrap_or(block_html.len());
        let spans = span_texts(&block_html[row.end..row_end]);
        if let [label, value, ..] = spans.as_slice()
            && !label.is_empty()
        {
            stats.insert(label.clone(), value.clone());
        }
        cursor = row_end;
    }

    if stats.is_empty() {
        return Err(PageError::NoRows);
    }
    Ok(stats)
}

/// Offset of the `</div>` closing the block whose opening tag ends at `from`,
/// or the end of the document when the block is never closed.
fn block_end(html: &str, from: usize) -> usize {
    let mut depth = 0usize;
    let mut cursor = from;
    while let Some(tag) = next_tag(html, cursor) {
        cursor = tag.end;
        if tag.name.eq_ignore_ascii_case("div") {
            depth += 1;
        } else if tag.name.eq_ignore_ascii_case("/div") {
            if depth == 0 {
                return tag.start;
            }
            depth -= 1;
        }
    }
    html.len()
}

fn find_tag_with_class<'a>(html: &'a str, class: &str, from: usize) -> Option<Tag<'a>> {
    let mut cursor = from;
    while let Some(tag) = next_tag(html, cursor) {
        cursor = tag.end;
        if tag.name.starts_with('/') || tag.name.starts_with('!') {
            continue;
        }
        if has_class(tag.attrs, class) {
            return Some(tag);
        }
    }
    None
}

fn next_tag(html: &str, from: usize) -> Option<Tag<'_>> {
    let start = html.get(from..)?.find('<')? + from;
    let end = html[start..].find('>')? + start + 1;
    let inner = html[start + 1..end - 1].trim_end_matches('/').trim();
    let (name, attrs) = match inner.find(char::is_whitespace) {
        Some(idx) => (&inner[..idx], &inner[idx..]),
        None => (inner, ""),
    };
    Some(Tag {
        start,
        end,
        name,
        attrs,
    })
}

fn has_class(attrs: &str, class: &str) -> bool {
    let lower = attrs.to_ascii_lowercase();
    let Some(idx) = lower.find("class=") else {
        return false;
    };
    let rest = &attrs[idx + "class=".len()..];
    let value = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => rest[1..].split(quote).next().unwrap_or(""),
        Some(_) => rest.split_whitespace().next().unwrap_or(""),
        None => "",
    };
    value.split_whitespace().any(|c| c == class)
}

fn span_texts(fragment: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(tag) = next_tag(fragment, cursor) {
        cursor = tag.end;
        if !tag.name.eq_ignore_ascii_case("span") {
            continue;
        }
        let close = find_ci(fragment, "</span", tag.end).unwrap_or(fragment.len());
        out.push(clean_text(&fragment[tag.end..close]));
        cursor = close;
    }
    out
}

fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let lower = haystack.get(from..)?.to_ascii_lowercase();
    lower.find(&needle.to_ascii_lowercase()).map(|idx| idx + from)
}

fn clean_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_label_value_pairs() {
        let html = r#"
            <div class="summary"><span>ignored</span><span>1</span></div>
            <div class="col statistics">
              <div class="stats-row"><span>Total kills</span><span>12,345</span></div>
              <div class='stats-row'>
                <span>Headshot %</span>
                <span> 48.2% </span>
              </div>
              <div class="stats-row"><span><b>K/D</b> Ratio</span><span>1.21</span></div>
              <div class="stats-row"><span>Damage &amp; more</span><span>83.4</span></div>
            </div>"#;
        let stats = parse_stats_block(html).unwrap();
        assert_eq!(stats.len(), 4);
        assert_eq!(stats["Total kills"], "12,345");
        assert_eq!(stats["Headshot %"], "48.2%");
        assert_eq!(stats["K/D Ratio"], "1.21");
        assert_eq!(stats["Damage & more"], "83.4");
        assert!(!stats.contains_key("ignored"));
    }

    #[test]
    fn rows_after_the_block_are_ignored() {
        let html = r#"
            <div class="statistics">
              <div class="stats-row"><span>K/D Ratio</span><span>1.2</span></div>
              <div class="group"><div class="stats-row"><span>Rating 2.0</span><span>1.05</span></div></div>
            </div>
            <div class="other">
              <div class="stats-row"><span>K/D Ratio</span><span>9.9</span></div>
              <div class="stats-row"><span>Maps played</span><span>40</span></div>
            </div>"#;
        let stats = parse_stats_block(html).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["K/D Ratio"], "1.2");
        assert_eq!(stats["Rating 2.0"], "1.05");
        assert!(!stats.contains_key("Maps played"));
    }

    #[test]
    fn unclosed_block_runs_to_end_of_page() {
        let html = r#"<div class="statistics"><div class="stats-row"><span>Headshot %</span><span>40%</span>"#;
        let stats = parse_stats_block(html).unwrap();
        assert_eq!(stats["Headshot %"], "40%");
    }

    #[test]
    fn missing_block_and_empty_block_differ() {
        assert_eq!(
            parse_stats_block("<html><body>blocked</body></html>"),
            Err(PageError::MissingBlock)
        );
        assert_eq!(
            parse_stats_block(r#"<div class="statistics"></div>"#),
            Err(PageError::NoRows)
        );
    }

    #[test]
    fn class_match_is_by_token() {
        assert!(has_class(r#" class="a stats-row b""#, "stats-row"));
        assert!(!has_class(r#" class="stats-rows""#, "stats-row"));
        assert!(has_class(" class=statistics id=x", "statistics"));
    }
}
