//! Authoring helpers: slug derivation, excerpt extraction, draft completion.
//!
//! # Invariants
//! - Slugs contain only `[a-z0-9-]`, with no leading, trailing or doubled `-`.
//! - Drafts always become `pending` articles; moderation publishes them.

use crate::model::article::{Article, ArticleStatus};
use crate::model::category::Category;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_COVER_IMAGE: &str = "/images/default-cover.jpg";
pub const DEFAULT_EXCERPT_CHARS: usize = 150;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s").expect("valid heading regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link regex"));

/// Derives a URL-safe slug from a title.
///
/// Common accented Latin letters are folded to ASCII before every other
/// non-alphanumeric run collapses into a single `-`.
pub fn slugify(title: &str) -> String {
    let mut folded = String::with_capacity(title.len());
    for ch in title.chars().flat_map(char::to_lowercase) {
        match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => folded.push('a'),
            'ç' => folded.push('c'),
            'è' | 'é' | 'ê' | 'ë' => folded.push('e'),
            'ì' | 'í' | 'î' | 'ï' => folded.push('i'),
            'ñ' => folded.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => folded.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => folded.push('u'),
            'ý' | 'ÿ' => folded.push('y'),
            'æ' => folded.push_str("ae"),
            'œ' => folded.push_str("oe"),
            other => folded.push(other),
        }
    }
    NON_SLUG_RE
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Plain-text summary of markdown `content`, truncated to `max_chars` with a
/// trailing `...` when cut.
pub fn extract_excerpt(content: &str, max_chars: usize) -> String {
    let without_headings = HEADING_RE.replace_all(content, "");
    let without_emphasis = without_headings.replace('*', "").replace('`', "");
    let without_links = LINK_RE.replace_all(&without_emphasis, "$1");
    let flattened = without_links.replace('\n', " ");
    let plain = flattened.trim();

    if plain.chars().count() <= max_chars {
        return plain.to_string();
    }
    let truncated: String = plain.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

/// Author-supplied article fields before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    /// Overrides the title-derived slug.
    pub slug: Option<String>,
}

impl ArticleDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
            author: None,
            date: None,
            image: None,
            excerpt: None,
            slug: None,
        }
    }

    /// Completes the draft using today's local date when none was given.
    pub fn into_article(self) -> Article {
        let today = Local::now().date_naive();
        self.into_article_on(today)
    }

    /// Completes the draft, defaulting the date to `today`.
    pub fn into_article_on(self, today: NaiveDate) -> Article {
        let slug = non_blank(self.slug)
            .map(|slug| slugify(&slug))
            .unwrap_or_else(|| slugify(&self.title));
        let excerpt = non_blank(self.excerpt)
            .unwrap_or_else(|| extract_excerpt(&self.content, DEFAULT_EXCERPT_CHARS));

        Article {
            slug,
            author: non_blank(self.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            date: non_blank(self.date).unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            category: self.category,
            image: non_blank(self.image).unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
            excerpt,
            title: self.title,
            content: self.content,
            id: None,
            status: Some(ArticleStatus::Pending),
            author_id: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
