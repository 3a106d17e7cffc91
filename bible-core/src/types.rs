use crate::error::BibleError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============ Arguments ============

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    /// World English Bible (upstream default)
    Web,
    /// King James Version
    Kjv,
}

impl Translation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Translation::Web => "web",
            Translation::Kjv => "kjv",
        }
    }
}

impl FromStr for Translation {
    type Err = BibleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Translation::Web),
            "kjv" => Ok(Translation::Kjv),
            other => Err(BibleError::InvalidArgument(format!("unknown translation '{}' (expected web or kjv)", other))),
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
    #[serde(rename = "AP")]
    Apocrypha,
}

impl Testament {
    pub fn code(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
            Testament::Apocrypha => "AP",
        }
    }
}

impl FromStr for Testament {
    type Err = BibleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OT" => Ok(Testament::Old),
            "NT" => Ok(Testament::New),
            "AP" => Ok(Testament::Apocrypha),
            other => Err(BibleError::InvalidArgument(format!("unknown testament '{}' (expected OT, NT or AP)", other))),
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.code()) }
}

/// `list_books` filter; `all` means no filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookFilter {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
    #[serde(rename = "AP")]
    Apocrypha,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl BookFilter {
    pub fn testament(&self) -> Option<Testament> {
        match self {
            BookFilter::Old => Some(Testament::Old),
            BookFilter::New => Some(Testament::New),
            BookFilter::Apocrypha => Some(Testament::Apocrypha),
            BookFilter::All => None,
        }
    }
}

impl FromStr for BookFilter {
    type Err = BibleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") { return Ok(BookFilter::All); }
        Ok(match s.parse::<Testament>()? {
            Testament::Old => BookFilter::Old,
            Testament::New => BookFilter::New,
            Testament::Apocrypha => BookFilter::Apocrypha,
        })
    }
}

pub const SEARCH_LIMIT_MAX: u32 = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub book: Option<String>,
    pub testament: Option<Testament>,
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), BibleError> {
        if self.query.trim().is_empty() {
            return Err(BibleError::InvalidArgument("query must not be empty".into()));
        }
        if let Some(l) = self.limit {
            if !(1..=SEARCH_LIMIT_MAX).contains(&l) {
                return Err(BibleError::InvalidArgument(format!("limit must be between 1 and {}, got {}", SEARCH_LIMIT_MAX, l)));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RandomQuery {
    pub translation: Option<Translation>,
    pub book: Option<String>,
    pub testament: Option<Testament>,
}

// ============ Upstream responses ============

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TranslationRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Verse {
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub book_name: String,
    #[serde(default)]
    pub chapter: u32,
    #[serde(default)]
    pub verse: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Verse {
    /// Upstream reference when present, otherwise "Book C:V".
    pub fn display_reference(&self) -> String {
        match &self.reference {
            Some(r) if !r.is_empty() => r.clone(),
            _ => {
                let name = if self.book_name.is_empty() { &self.book } else { &self.book_name };
                format!("{} {}:{}", name, self.chapter, self.verse)
            }
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerseResponse {
    pub reference: String,
    #[serde(default)]
    pub translation: TranslationRef,
    #[serde(default)]
    pub verses: Vec<Verse>,
    #[serde(default)]
    pub text: String,
}

/// Neighbouring chapter as reported by the chapter endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterLink {
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub chapter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A navigation link that does not decode, or lacks a book or chapter, is
/// dropped instead of failing the whole chapter.
fn lenient_link<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ChapterLink>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .and_then(|v| serde_json::from_value::<ChapterLink>(v).ok())
        .filter(|l| !l.book.is_empty() && l.chapter > 0))
}

impl ChapterLink {
    pub fn label(&self) -> String {
        match &self.reference {
            Some(r) if !r.is_empty() => r.clone(),
            _ => format!("{} {}", self.book, self.chapter),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChapterResponse {
    pub reference: String,
    #[serde(default)]
    pub translation: TranslationRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<serde_json::Value>,
    #[serde(default)]
    pub chapter: u32,
    #[serde(default)]
    pub verses: Vec<Verse>,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_link")]
    pub previous: Option<ChapterLink>,
    #[serde(default, deserialize_with = "lenient_link")]
    pub next: Option<ChapterLink>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub results: Vec<Verse>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub testament: String,
    #[serde(default)]
    pub chapters: u32,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TranslationInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub description: String,
}

/// Result of a reference lookup, tagged by the endpoint that served it.
/// Serializes as the bare upstream payload.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Passage {
    Verses(VerseResponse),
    Chapter(ChapterResponse),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_parses_case_insensitively() {
        assert_eq!("KJV".parse::<Translation>().unwrap(), Translation::Kjv);
        assert_eq!(" web ".parse::<Translation>().unwrap(), Translation::Web);
        assert!("niv".parse::<Translation>().is_err());
    }

    #[test]
    fn book_filter_accepts_all() {
        assert_eq!("all".parse::<BookFilter>().unwrap(), BookFilter::All);
        assert_eq!("nt".parse::<BookFilter>().unwrap().testament(), Some(Testament::New));
        let f: BookFilter = serde_json::from_value(serde_json::json!("AP")).unwrap();
        assert_eq!(f, BookFilter::Apocrypha);
    }

    #[test]
    fn search_limit_bounds() {
        let mut q = SearchQuery::new("love");
        assert!(q.validate().is_ok());
        q.limit = Some(0);
        assert!(q.validate().is_err());
        q.limit = Some(50);
        assert!(q.validate().is_ok());
        q.limit = Some(51);
        assert!(q.validate().is_err());
        assert!(SearchQuery::new("  ").validate().is_err());
    }

    #[test]
    fn chapter_response_tolerates_missing_navigation() {
        let r: ChapterResponse = serde_json::from_value(serde_json::json!({
            "reference": "Genesis 1",
            "translation": {"id": "web", "name": "World English Bible"},
            "chapter": 1,
            "text": "In the beginning...",
            "previous": null,
            "next": {"book": "GEN", "chapter": 2, "reference": "Genesis 2"}
        })).unwrap();
        assert!(r.previous.is_none());
        assert_eq!(r.next.unwrap().label(), "Genesis 2");
    }

    #[test]
    fn odd_navigation_links_are_dropped() {
        let r: ChapterResponse = serde_json::from_value(serde_json::json!({
            "reference": "Psalm 23",
            "chapter": 23,
            "text": "The LORD is my shepherd...",
            "previous": "Psalm 22",
            "next": {"book": "PSA", "chapter": "twenty-four"}
        })).unwrap();
        assert!(r.previous.is_none());
        assert!(r.next.is_none());
        assert_eq!(r.text, "The LORD is my shepherd...");

        let r: ChapterResponse = serde_json::from_value(serde_json::json!({
            "reference": "Psalm 23",
            "next": {"reference": "Psalm 24"}
        })).unwrap();
        assert!(r.next.is_none());
    }

    #[test]
    fn verse_reference_fallback() {
        let v = Verse { book: "JHN".into(), book_name: "John".into(), chapter: 3, verse: 16, ..Default::default() };
        assert_eq!(v.display_reference(), "John 3:16");
    }
}
