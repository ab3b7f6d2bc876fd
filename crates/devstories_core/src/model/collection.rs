//! Pure helpers over article collections.
//!
//! # Invariants
//! - Helpers never reorder their input except `latest`, which sorts a copy.
//! - Mutating helpers return a new collection; the input slice is untouched.

use crate::model::article::{Article, ArticlePatch};
use crate::model::category::Category;
use std::cmp::Reverse;

/// First article whose slug equals `slug`.
pub fn find_by_slug<'a>(articles: &'a [Article], slug: &str) -> Option<&'a Article> {
    articles.iter().find(|article| article.has_slug(slug))
}

/// Articles in `category`. `Home` or `None` keeps the whole collection in order.
pub fn filter_by_category(articles: &[Article], category: Option<Category>) -> Vec<Article> {
    match category {
        None | Some(Category::Home) => articles.to_vec(),
        Some(category) => articles
            .iter()
            .filter(|article| article.category == category)
            .cloned()
            .collect(),
    }
}

/// Newest-first copy capped to `limit`. Ties and unparseable dates keep
/// collection order; unparseable dates sort last.
pub fn latest(articles: &[Article], limit: usize) -> Vec<Article> {
    let mut sorted = articles.to_vec();
    sorted.sort_by_key(|article| Reverse(article.parsed_date()));
    sorted.truncate(limit);
    sorted
}

/// `article` followed by the current collection.
pub fn prepend(articles: &[Article], article: Article) -> Vec<Article> {
    let mut next = Vec::with_capacity(articles.len() + 1);
    next.push(article);
    next.extend_from_slice(articles);
    next
}

/// Replaces every entry matching `slug` with `replacement`.
pub fn replace_by_slug(articles: &[Article], slug: &str, replacement: &Article) -> Vec<Article> {
    articles
        .iter()
        .map(|article| {
            if article.has_slug(slug) {
                replacement.clone()
            } else {
                article.clone()
            }
        })
        .collect()
}

/// Merges `patch` into every entry matching `slug`. Unknown slugs yield an
/// unchanged copy.
pub fn merge_by_slug(articles: &[Article], slug: &str, patch: &ArticlePatch) -> Vec<Article> {
    articles
        .iter()
        .map(|article| {
            let mut article = article.clone();
            if article.has_slug(slug) {
                patch.apply_to(&mut article);
            }
            article
        })
        .collect()
}

/// Removes the first entry matching `slug`. Returns `None` when nothing matched.
pub fn remove_first_by_slug(articles: &[Article], slug: &str) -> Option<Vec<Article>> {
    let position = articles.iter().position(|article| article.has_slug(slug))?;
    let mut next = articles.to_vec();
    next.remove(position);
    Some(next)
}
