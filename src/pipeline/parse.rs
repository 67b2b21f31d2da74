//! Decoding and filtering of stage outputs.
//!
//! Agents reply with free-form text. These helpers turn that text into typed
//! data and enforce that later stages only reference articles the search
//! stage actually produced.

use crate::types::{Article, Profile};
use serde_json::Value;
use std::collections::HashSet;

const DOUBLE_QUOTES: [char; 3] = ['"', '\u{201C}', '\u{201D}'];
const SINGLE_QUOTE_PAIRS: [(char, char); 2] = [('\'', '\''), ('\u{2018}', '\u{2019}')];

/// Trim whitespace and surrounding quote characters.
///
/// Double quotes are dropped from each end independently. Single quotes only
/// go as a matching pair, so a trailing apostrophe survives.
pub fn strip_quotes(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let trimmed = current
            .trim_start_matches(|c: char| DOUBLE_QUOTES.contains(&c))
            .trim_end_matches(|c: char| DOUBLE_QUOTES.contains(&c))
            .trim();
        if trimmed.len() != current.len() {
            current = trimmed;
            continue;
        }

        let mut chars = current.chars();
        let (first, last) = match (chars.next(), chars.next_back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return current,
        };
        if !SINGLE_QUOTE_PAIRS.contains(&(first, last)) {
            return current;
        }
        current = current[first.len_utf8()..current.len() - last.len_utf8()].trim();
    }
}

/// The JSON body of an agent reply.
///
/// Strips a markdown fence, then falls back to the outermost `[...]` when the
/// list is wrapped in prose.
pub fn extract_json(raw: &str) -> &str {
    let body = strip_fence(raw);
    if body.starts_with('[') || body.starts_with('{') {
        return body;
    }
    match (body.find('['), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) along with the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

pub fn parse_articles(raw: &str) -> Result<Vec<Article>, serde_json::Error> {
    serde_json::from_str(extract_json(raw))
}

/// Profiles whose id matches a known article, plus the orphan ids dropped.
pub fn parse_profiles(
    raw: &str,
    articles: &[Article],
) -> Result<(Vec<Profile>, Vec<String>), serde_json::Error> {
    let profiles: Vec<Profile> = serde_json::from_str(extract_json(raw))?;
    let known: HashSet<&str> = articles.iter().map(|a| a.id.as_str()).collect();

    let (kept, orphans): (Vec<Profile>, Vec<Profile>) = profiles
        .into_iter()
        .partition(|p| known.contains(p.id.as_str()));

    Ok((kept, orphans.into_iter().map(|p| p.id).collect()))
}

/// Ids named by the selector reply.
///
/// Accepts a list of id strings, or objects carrying an `id` field.
pub fn parse_selection_ids(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(extract_json(raw))?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(id) => Some(id),
            Value::Object(map) => map.get("id").and_then(|v| v.as_str()).map(String::from),
            _ => None,
        })
        .collect())
}

/// Articles named in `ids`, in search order. Unknown ids are ignored.
pub fn select_articles(articles: &[Article], ids: &[String]) -> Vec<Article> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    articles
        .iter()
        .filter(|a| wanted.contains(a.id.as_str()))
        .cloned()
        .collect()
}

/// Distinct ids in `ids` that name no article, in first-seen order.
pub fn foreign_ids<'a>(articles: &[Article], ids: &'a [String]) -> Vec<&'a str> {
    let known: HashSet<&str> = articles.iter().map(|a| a.id.as_str()).collect();
    let mut seen = HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| !known.contains(id) && seen.insert(*id))
        .collect()
}
