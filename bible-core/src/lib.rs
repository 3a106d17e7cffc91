pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod format;
pub mod reference;
pub mod retry;
pub mod types;

pub use client::{BibleClient, HttpReply, HttpTransport, Transport};
pub use config::ApiConfig;
pub use error::{BibleError, Result};
pub use reference::{classify, Classification, Reference};
pub use retry::RetryPolicy;
pub use types::{
    Book, BookFilter, ChapterLink, ChapterResponse, Passage, RandomQuery, SearchQuery,
    SearchResponse, Testament, Translation, TranslationInfo, TranslationRef, Verse, VerseResponse,
};
