use bible_core::{
    format, BibleClient, BibleError, BookFilter, RandomQuery, SearchQuery, Testament, Transport,
    Translation,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Failures reported as JSON-RPC errors rather than tool results.
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
    pub structured: Option<Value>,
}

impl ToolOutput {
    fn failed(e: &BibleError) -> Self {
        Self { text: e.user_message(), is_error: true, structured: None }
    }

    pub fn into_result(self) -> Value {
        let mut r = json!({ "content": [{ "type": "text", "text": self.text }] });
        if let Some(s) = self.structured { r["structuredContent"] = s; }
        if self.is_error { r["isError"] = json!(true); }
        r
    }
}

// ============ Catalogue ============

fn tool(name: &str, description: &str, input_schema: Value) -> Value {
    json!({"name": name, "description": description, "inputSchema": input_schema })
}

fn translation_schema() -> Value {
    json!({"type":"string","enum":["web","kjv"],"description":"Translation: 'web' (World English Bible, default) or 'kjv' (King James Version)"})
}

fn testament_schema() -> Value {
    json!({"type":"string","enum":["OT","NT","AP"],"description":"Filter by testament: OT (Old), NT (New), AP (Apocrypha)"})
}

pub fn tools_list() -> Vec<Value> {
    vec![
        tool("get_verse", "Retrieve a Bible verse or passage by reference.\n\nExamples:\n- \"John 3:16\" - single verse\n- \"Romans 8:28-39\" - verse range\n- \"Psalm 23\" - entire chapter, with previous/next navigation\n- \"Genesis 1:1-2:3\" - multi-chapter range\n- \"Tobit 1:1\" - Apocrypha supported",
            json!({"type":"object","properties":{
                "reference":{"type":"string","description":"Bible reference (e.g., 'John 3:16', 'Psalm 23', 'Romans 8:28-39')"},
                "translation": translation_schema()
            },"required":["reference"]})),
        tool("get_chapter", "Retrieve a whole chapter by book and chapter number, with previous/next chapter navigation.",
            json!({"type":"object","properties":{
                "book":{"type":"string","description":"Book name or code (e.g., 'Romans', '1 John', 'PSA')"},
                "chapter":{"type":"integer","minimum":1,"description":"Chapter number"},
                "translation": translation_schema()
            },"required":["book","chapter"]})),
        tool("search_bible", "Search the Bible for words or phrases. Returns matching verses with references.\n\nExamples:\n- Search all: query=\"love\"\n- Filter by book: query=\"faith\", book=\"ROM\"\n- Filter by testament: query=\"peace\", testament=\"NT\"",
            json!({"type":"object","properties":{
                "query":{"type":"string","description":"Search term or phrase"},
                "book":{"type":"string","description":"Filter by book code (e.g., 'GEN', 'ROM', 'PSA')"},
                "testament": testament_schema(),
                "limit":{"type":"integer","minimum":1,"maximum":50,"description":"Max results to return (default: 20, max: 50)"}
            },"required":["query"]})),
        tool("list_books", "List all books of the Bible with chapter counts. Can filter by testament.",
            json!({"type":"object","properties":{
                "testament":{"type":"string","enum":["OT","NT","AP","all"],"description":"Filter: OT (Old Testament), NT (New Testament), AP (Apocrypha), all (default)"}
            }})),
        tool("list_translations", "List all available Bible translations.", json!({"type":"object","properties":{}})),
        tool("get_random_verse", "Get a random Bible verse. Can filter by book or testament.\n\nExamples:\n- Random from anywhere: no params\n- Random Psalm: book=\"PSA\"\n- Random from New Testament: testament=\"NT\"",
            json!({"type":"object","properties":{
                "translation": translation_schema(),
                "book":{"type":"string","description":"Filter by book code (e.g., 'PSA', 'PRO', 'ROM')"},
                "testament": testament_schema()
            }})),
    ]
}

// ============ Arguments ============

#[derive(Deserialize)]
struct GetVerseArgs {
    reference: String,
    #[serde(default)]
    translation: Option<Translation>,
}

#[derive(Deserialize)]
struct GetChapterArgs {
    book: String,
    chapter: u32,
    #[serde(default)]
    translation: Option<Translation>,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    book: Option<String>,
    #[serde(default)]
    testament: Option<Testament>,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct ListBooksArgs {
    #[serde(default)]
    testament: Option<BookFilter>,
}

#[derive(Deserialize)]
struct RandomArgs {
    #[serde(default)]
    translation: Option<Translation>,
    #[serde(default)]
    book: Option<String>,
    #[serde(default)]
    testament: Option<Testament>,
}

fn parse_args<A: DeserializeOwned>(args: Value) -> Result<A, ToolCallError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ToolCallError::InvalidArguments(e.to_string()))
}

fn non_empty(field: &str, v: &str) -> Result<(), ToolCallError> {
    if v.trim().is_empty() {
        return Err(ToolCallError::InvalidArguments(format!("{} must not be empty", field)));
    }
    Ok(())
}

// ============ Dispatch ============

fn respond<R: Serialize>(
    result: bible_core::Result<R>,
    text: impl FnOnce(&R) -> String,
    structured: impl FnOnce(&R) -> Value,
) -> ToolOutput {
    match result {
        Ok(v) => ToolOutput { text: text(&v), is_error: false, structured: Some(structured(&v)) },
        Err(e) => {
            warn!(error = %e, "tool call failed");
            ToolOutput::failed(&e)
        }
    }
}

fn as_json<R: Serialize>(v: &R) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

pub fn call_tool<T: Transport>(client: &BibleClient<T>, name: &str, args: Value) -> Result<ToolOutput, ToolCallError> {
    debug!(tool = name, "call");
    let out = match name {
        "get_verse" => {
            let a: GetVerseArgs = parse_args(args)?;
            non_empty("reference", &a.reference)?;
            respond(client.lookup(&a.reference, a.translation), format::passage, as_json)
        }
        "get_chapter" => {
            let a: GetChapterArgs = parse_args(args)?;
            non_empty("book", &a.book)?;
            if a.chapter == 0 {
                return Err(ToolCallError::InvalidArguments("chapter must be at least 1".into()));
            }
            respond(client.chapter(a.book.trim(), a.chapter, a.translation), format::chapter, as_json)
        }
        "search_bible" => {
            let a: SearchArgs = parse_args(args)?;
            let q = SearchQuery { query: a.query, book: a.book, testament: a.testament, limit: a.limit };
            q.validate().map_err(|e| ToolCallError::InvalidArguments(e.to_string()))?;
            respond(client.search(&q), |r| format::search(&q.query, r), as_json)
        }
        "list_books" => {
            let a: ListBooksArgs = parse_args(args)?;
            let filter = a.testament.unwrap_or_default();
            respond(client.books(filter), |b| format::books(b), |b| json!({ "books": b }))
        }
        "list_translations" => {
            respond(client.translations(), |t| format::translations(t), |t| json!({ "translations": t }))
        }
        "get_random_verse" => {
            let a: RandomArgs = parse_args(args)?;
            let q = RandomQuery { translation: a.translation, book: a.book, testament: a.testament };
            respond(client.random(&q), format::random_verse, as_json)
        }
        other => return Err(ToolCallError::UnknownTool(other.to_string())),
    };
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bible_core::HttpReply;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct Canned {
        pub replies: RefCell<VecDeque<HttpReply>>,
        pub seen: RefCell<Vec<String>>,
    }

    impl Canned {
        pub fn json(status: u16, body: Value) -> Self {
            let c = Self::default();
            c.replies.borrow_mut().push_back(HttpReply { status, body: body.to_string() });
            c
        }
    }

    impl Transport for Canned {
        fn get(&self, url: &str) -> bible_core::Result<HttpReply> {
            self.seen.borrow_mut().push(url.to_string());
            self.replies.borrow_mut().pop_front().ok_or_else(|| BibleError::Transport("connection refused".into()))
        }
    }

    const BASE: &str = "https://api.test/v1";

    #[test]
    fn romans_8_end_to_end() {
        let t = Canned::json(200, json!({
            "reference": "Romans 8",
            "translation": {"id": "web", "name": "World English Bible"},
            "chapter": 8,
            "text": "There is therefore now no condemnation...",
            "previous": {"book": "ROM", "chapter": 7, "reference": "Romans 7"},
            "next": {"book": "ROM", "chapter": 9, "reference": "Romans 9"}
        }));
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "get_verse", json!({"reference": "Romans 8"})).unwrap();
        assert_eq!(t.seen.borrow()[0], "https://api.test/v1/chapters/Romans/8");
        assert!(!out.is_error);
        assert!(out.text.contains("Navigation: ← Romans 7 | Romans 9 →"));
        assert_eq!(out.structured.as_ref().unwrap()["next"]["chapter"], 9);
    }

    #[test]
    fn upstream_error_is_error_result() {
        let t = Canned::json(404, json!({"error": "Book not found"}));
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "get_verse", json!({"reference": "Romans 8"})).unwrap();
        assert!(out.is_error);
        assert_eq!(out.text, "Error: Book not found");
        let r = out.into_result();
        assert_eq!(r["isError"], true);
        assert_eq!(r["content"][0]["text"], "Error: Book not found");
        assert!(r.get("structuredContent").is_none());
    }

    #[test]
    fn transport_failure_is_error_result() {
        let t = Canned::default();
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "list_translations", Value::Null).unwrap();
        assert!(out.is_error);
        assert!(out.text.starts_with("Error: failed to reach Bible API"));
    }

    #[test]
    fn verse_reference_passes_through() {
        let t = Canned::json(200, json!({
            "reference": "John 3:16",
            "translation": {"id": "kjv", "name": "King James Version"},
            "verses": [], "text": "For God so loved the world"
        }));
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "get_verse", json!({"reference": "John 3:16", "translation": "kjv"})).unwrap();
        assert_eq!(out.text, "📖 John 3:16\nTranslation: King James Version\n\nFor God so loved the world");
        assert_eq!(t.seen.borrow()[0], "https://api.test/v1/verses/John%203%3A16?translation=kjv");
        assert!(out.into_result().get("isError").is_none());
    }

    #[test]
    fn invalid_arguments_are_rejected_before_requests() {
        let t = Canned::default();
        let client = BibleClient::new(&t, BASE);
        let cases = [
            ("get_verse", json!({})),
            ("get_verse", json!({"reference": "John 3:16", "translation": "niv"})),
            ("get_chapter", json!({"book": "Romans", "chapter": 0})),
            ("search_bible", json!({"query": "love", "limit": 51})),
            ("search_bible", json!({"query": "love", "testament": "XX"})),
            ("list_books", json!({"testament": "new"})),
        ];
        for (name, args) in cases {
            let r = call_tool(&client, name, args.clone());
            assert!(matches!(r, Err(ToolCallError::InvalidArguments(_))), "{name} {args}");
        }
        assert!(t.seen.borrow().is_empty());
    }

    #[test]
    fn unknown_tool() {
        let t = Canned::default();
        let client = BibleClient::new(&t, BASE);
        assert!(matches!(call_tool(&client, "get_psalm", json!({})), Err(ToolCallError::UnknownTool(_))));
    }

    #[test]
    fn list_books_all_and_structured_wrapper() {
        let t = Canned::json(200, json!([
            {"id": "GEN", "name": "Genesis", "testament": "OT", "chapters": 50, "aliases": []},
            {"id": "MAT", "name": "Matthew", "testament": "NT", "chapters": 28, "aliases": []}
        ]));
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "list_books", json!({"testament": "all"})).unwrap();
        assert_eq!(t.seen.borrow()[0], "https://api.test/v1/books");
        assert!(out.text.starts_with("📜 OLD TESTAMENT"));
        assert_eq!(out.structured.unwrap()["books"][1]["id"], "MAT");
    }

    #[test]
    fn search_passes_filters() {
        let t = Canned::json(200, json!({"query": "peace", "translation": "web", "total": 0, "results": []}));
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "search_bible", json!({"query": "peace", "testament": "NT", "limit": 5})).unwrap();
        assert_eq!(t.seen.borrow()[0], "https://api.test/v1/search?q=peace&testament=NT&limit=5");
        assert_eq!(out.text, "No results found for \"peace\"");
    }

    #[test]
    fn random_verse_banner() {
        let t = Canned::json(200, json!({
            "reference": "Psalm 46:10",
            "translation": {"id": "web", "name": "World English Bible"},
            "verses": [], "text": "Be still, and know that I am God."
        }));
        let client = BibleClient::new(&t, BASE);
        let out = call_tool(&client, "get_random_verse", json!({"book": "PSA"})).unwrap();
        assert!(out.text.starts_with("🎲 Random Verse\n\n📖 Psalm 46:10"));
        assert_eq!(t.seen.borrow()[0], "https://api.test/v1/random?book=PSA");
    }

    #[test]
    fn catalogue_names() {
        let names: Vec<String> = tools_list().iter().map(|t| t["name"].as_str().unwrap().to_string()).collect();
        assert_eq!(names, ["get_verse", "get_chapter", "search_bible", "list_books", "list_translations", "get_random_verse"]);
    }
}
