use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A classified Bible reference.
///
/// Chapter references go to the chapter endpoint, which also reports the
/// neighbouring chapters. Everything else is handed to the verse endpoint
/// untouched and the upstream API decides what it means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    Chapter { book: String, chapter: u32 },
    VerseQuery { raw: String },
}

fn chapter_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy book part so "1 John 3" keeps "1 John" together.
    RE.get_or_init(|| Regex::new(r"^(.+)\s+(\d+)$").expect("chapter pattern"))
}

/// Classify `input` as a whole chapter or a verse query. Never fails.
///
/// A colon anywhere means verses ("John 3:16", "Romans 14:14, 22-23").
/// Otherwise a trailing bare integer after whitespace is the chapter number.
///
/// Comma lists without a colon are not split: "Psalm 23, 24" comes back as
/// book "Psalm 23," chapter 24. Kept as-is for compatibility with existing
/// callers even though the book part is wrong.
pub fn classify(input: &str) -> Reference {
    let s = input.trim();
    if s.contains(':') {
        return Reference::VerseQuery { raw: s.to_string() };
    }
    if let Some(c) = chapter_pattern().captures(s) {
        let book = c[1].trim();
        if let Ok(chapter) = c[2].parse::<u32>() {
            if !book.is_empty() {
                return Reference::Chapter { book: book.to_string(), chapter };
            }
        }
    }
    Reference::VerseQuery { raw: s.to_string() }
}

impl Reference {
    pub fn is_chapter(&self) -> bool {
        matches!(self, Reference::Chapter { .. })
    }

    pub fn book(&self) -> Option<&str> {
        match self {
            Reference::Chapter { book, .. } => Some(book),
            Reference::VerseQuery { .. } => None,
        }
    }

    pub fn chapter(&self) -> Option<u32> {
        match self {
            Reference::Chapter { chapter, .. } => Some(*chapter),
            Reference::VerseQuery { .. } => None,
        }
    }

    pub fn classification(&self) -> Classification {
        Classification {
            is_chapter: self.is_chapter(),
            book: self.book().map(str::to_string),
            chapter: self.chapter(),
        }
    }
}

/// Flat JSON view: `{"isChapter": .., "book": .., "chapter": ..}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub is_chapter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
}
