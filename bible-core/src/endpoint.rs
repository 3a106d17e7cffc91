//! Upstream paths, relative to the configured API base.

use crate::types::{BookFilter, RandomQuery, SearchQuery, Translation};
use url::form_urlencoded;

fn with_query(path: String, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() { return path; }
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs { ser.append_pair(k, v); }
    format!("{}?{}", path, ser.finish())
}

fn translation_pair(t: Option<Translation>) -> Vec<(&'static str, String)> {
    t.map(|t| vec![("translation", t.as_str().to_string())]).unwrap_or_default()
}

pub fn verse_path(reference: &str, translation: Option<Translation>) -> String {
    with_query(format!("/verses/{}", urlencoding::encode(reference)), &translation_pair(translation))
}

pub fn chapter_path(book: &str, chapter: u32, translation: Option<Translation>) -> String {
    with_query(format!("/chapters/{}/{}", urlencoding::encode(book), chapter), &translation_pair(translation))
}

pub fn search_path(q: &SearchQuery) -> String {
    let mut pairs = vec![("q", q.query.clone())];
    if let Some(b) = q.book.as_deref().filter(|b| !b.is_empty()) { pairs.push(("book", b.to_string())); }
    if let Some(t) = q.testament { pairs.push(("testament", t.code().to_string())); }
    if let Some(l) = q.limit { pairs.push(("limit", l.to_string())); }
    with_query("/search".to_string(), &pairs)
}

pub fn books_path(filter: BookFilter) -> String {
    let pairs: Vec<_> = filter.testament().map(|t| ("testament", t.code().to_string())).into_iter().collect();
    with_query("/books".to_string(), &pairs)
}

pub fn translations_path() -> String {
    "/translations".to_string()
}

pub fn random_path(q: &RandomQuery) -> String {
    let mut pairs = translation_pair(q.translation);
    if let Some(b) = q.book.as_deref().filter(|b| !b.is_empty()) { pairs.push(("book", b.to_string())); }
    if let Some(t) = q.testament { pairs.push(("testament", t.code().to_string())); }
    with_query("/random".to_string(), &pairs)
}
