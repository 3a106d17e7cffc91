use crate::config::ApiConfig;
use crate::endpoint;
use crate::error::{BibleError, Result};
use crate::reference::{classify, Reference};
use crate::retry::RetryPolicy;
use crate::types::*;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    fn is_retryable(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// One GET against an absolute URL. Non-2xx statuses are returned, not
/// raised, because the API puts `{"error": ...}` bodies on 4xx replies.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpReply>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<HttpReply> { (**self).get(url) }
}

pub struct HttpTransport {
    client: Client,
    retry: RetryPolicy,
}

enum Failure {
    Io(BibleError),
    Status(HttpReply),
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, retry: config.retry })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpReply> {
        send_with_retry(self.retry, |attempt| {
            debug!(url, attempt, "GET");
            let resp = self.client.get(url).send()?;
            let status = resp.status().as_u16();
            let body = resp.text()?;
            Ok(HttpReply { status, body })
        })
    }
}

/// Run `send` under `policy`, retrying I/O failures and 429/5xx replies.
/// When attempts run out on a status reply, that reply is returned so the
/// caller can look at the body; it may carry `error`.
fn send_with_retry(policy: RetryPolicy, mut send: impl FnMut(u32) -> Result<HttpReply>) -> Result<HttpReply> {
    let outcome = policy.run(
        |attempt| -> std::result::Result<HttpReply, Failure> {
            let reply = send(attempt).map_err(Failure::Io)?;
            if reply.is_retryable() { Err(Failure::Status(reply)) } else { Ok(reply) }
        },
        |_| true,
    );
    match outcome {
        Ok(r) => Ok(r),
        Err(Failure::Status(r)) => Ok(r),
        Err(Failure::Io(e)) => Err(e),
    }
}

/// Decode a reply: `{"error": ..}` objects become [`BibleError::Upstream`].
pub fn decode<T: DeserializeOwned>(reply: &HttpReply) -> Result<T> {
    let v: serde_json::Value = serde_json::from_str(&reply.body)
        .map_err(|e| BibleError::Decode { status: reply.status, detail: e.to_string() })?;
    if let Some(err) = v.as_object().and_then(|o| o.get("error")) {
        let msg = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
        return Err(BibleError::Upstream(msg));
    }
    serde_json::from_value(v).map_err(|e| BibleError::Decode { status: reply.status, detail: e.to_string() })
}

pub struct BibleClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
}

impl BibleClient<HttpTransport> {
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?, &config.base_url))
    }
}

impl<T: Transport> BibleClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self { transport, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn fetch<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        let reply = self.transport.get(&url)?;
        debug!(url = %url, status = reply.status, bytes = reply.body.len(), "reply");
        decode(&reply)
    }

    pub fn verse(&self, reference: &str, translation: Option<Translation>) -> Result<VerseResponse> {
        self.fetch(&endpoint::verse_path(reference, translation))
    }

    pub fn chapter(&self, book: &str, chapter: u32, translation: Option<Translation>) -> Result<ChapterResponse> {
        self.fetch(&endpoint::chapter_path(book, chapter, translation))
    }

    /// Route a free-form reference: whole chapters go to the chapter
    /// endpoint (which knows previous/next), the rest to the verse endpoint.
    pub fn lookup(&self, reference: &str, translation: Option<Translation>) -> Result<Passage> {
        match classify(reference) {
            Reference::Chapter { book, chapter } => self.chapter(&book, chapter, translation).map(Passage::Chapter),
            Reference::VerseQuery { raw } => self.verse(&raw, translation).map(Passage::Verses),
        }
    }

    pub fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        query.validate()?;
        self.fetch(&endpoint::search_path(query))
    }

    pub fn books(&self, filter: BookFilter) -> Result<Vec<Book>> {
        self.fetch(&endpoint::books_path(filter))
    }

    pub fn translations(&self) -> Result<Vec<TranslationInfo>> {
        self.fetch(&endpoint::translations_path())
    }

    pub fn random(&self, query: &RandomQuery) -> Result<VerseResponse> {
        self.fetch(&endpoint::random_path(query))
    }
}
