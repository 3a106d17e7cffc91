//! Terminal chapter reader: `n`ext, `p`revious, `r`etry, `q`uit.

use anyhow::Result;
use bible_core::{format, BibleClient, BibleError, ChapterResponse, Passage, Transport, Translation};
use std::io::{BufRead, Write};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Target {
    book: String,
    chapter: u32,
}

#[derive(Debug, PartialEq, Eq)]
enum Command { Next, Previous, Retry, Quit, Unknown }

fn parse_command(s: &str) -> Command {
    match s.trim().to_ascii_lowercase().as_str() {
        "n" | "next" | "" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "r" | "retry" => Command::Retry,
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Unknown,
    }
}

pub struct Reader<'a, T: Transport> {
    client: &'a BibleClient<T>,
    translation: Option<Translation>,
}

impl<'a, T: Transport> Reader<'a, T> {
    pub fn new(client: &'a BibleClient<T>, translation: Option<Translation>) -> Self {
        Self { client, translation }
    }

    /// Resolve the starting chapter. Verse references open the chapter of
    /// their first verse; chapter references come back already loaded.
    fn start(&self, reference: &str) -> Result<(Target, Option<ChapterResponse>), BibleError> {
        match self.client.lookup(reference, self.translation)? {
            Passage::Chapter(c) => Ok((Target { book: chapter_book(&c, reference), chapter: c.chapter }, Some(c))),
            Passage::Verses(v) => v.verses.first()
                .map(|first| (Target { book: first.book.clone(), chapter: first.chapter }, None))
                .ok_or_else(|| BibleError::Upstream(format!("no verses found for {}", reference))),
        }
    }

    fn load(&self, t: &Target) -> Result<ChapterResponse, BibleError> {
        debug!(book = %t.book, chapter = t.chapter, "loading chapter");
        self.client.chapter(&t.book, t.chapter, self.translation)
    }

    /// Show the prompt and read one command. `None` on EOF.
    fn prompt(&self, input: &mut impl BufRead, out: &mut impl Write, line: &mut String) -> Result<Option<Command>> {
        write!(out, "[n]ext [p]revious [r]etry [q]uit > ")?;
        out.flush()?;
        line.clear();
        if input.read_line(line)? == 0 { return Ok(None); }
        Ok(Some(parse_command(line)))
    }

    pub fn run(&self, reference: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
        let mut line = String::new();
        // Nothing is loaded yet, so only retry and quit mean anything here.
        let (mut target, mut pending) = 'start: loop {
            match self.start(reference) {
                Ok(t) => break t,
                Err(e) if e.is_transport() => {
                    writeln!(out, "⚠ Failed to load {}. Press r to retry.", reference.trim())?;
                }
                Err(e) => {
                    writeln!(out, "{}", e.user_message())?;
                    return Ok(());
                }
            }
            loop {
                match self.prompt(input, out, &mut line)? {
                    None | Some(Command::Quit) => return Ok(()),
                    Some(Command::Retry) => continue 'start,
                    Some(Command::Unknown) => writeln!(out, "?")?,
                    Some(_) => writeln!(out, "No chapter in that direction.")?,
                }
            }
        };
        let mut current: Option<ChapterResponse> = None;
        loop {
            let loaded = match pending.take() {
                Some(c) => Ok(c),
                None => self.load(&target),
            };
            match loaded {
                Ok(c) => {
                    writeln!(out, "{}\n", format::chapter(&c))?;
                    current = Some(c);
                }
                Err(e) if e.is_transport() => {
                    writeln!(out, "⚠ Failed to load {} {}. Press r to retry.", target.book, target.chapter)?;
                }
                Err(e) => writeln!(out, "{}", e.user_message())?,
            }
            loop {
                let Some(cmd) = self.prompt(input, out, &mut line)? else { return Ok(()) };
                let links = current.as_ref().map(|c| (c.previous.clone(), c.next.clone()));
                let link = match cmd {
                    Command::Quit => return Ok(()),
                    Command::Retry => break,
                    Command::Next => links.and_then(|(_, n)| n),
                    Command::Previous => links.and_then(|(p, _)| p),
                    Command::Unknown => { writeln!(out, "?")?; continue; }
                };
                match link {
                    Some(l) => {
                        target = Target { book: l.book, chapter: l.chapter };
                        break;
                    }
                    None => writeln!(out, "No chapter in that direction.")?,
                }
            }
        }
    }
}

/// Book identifier to request neighbours with: the upstream book object's
/// `id` when present, otherwise the name the user typed.
fn chapter_book(c: &ChapterResponse, reference: &str) -> String {
    c.book.as_ref()
        .and_then(|b| b.get("id").and_then(|v| v.as_str()).map(str::to_string).or_else(|| b.as_str().map(str::to_string)))
        .or_else(|| bible_core::classify(reference).book().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bible_core::HttpReply;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::Cursor;

    #[derive(Default)]
    struct Canned {
        replies: RefCell<VecDeque<Result<HttpReply, BibleError>>>,
        seen: RefCell<Vec<String>>,
    }

    impl Canned {
        fn push(&self, body: serde_json::Value) {
            self.replies.borrow_mut().push_back(Ok(HttpReply { status: 200, body: body.to_string() }));
        }
        fn fail(&self) {
            self.replies.borrow_mut().push_back(Err(BibleError::Transport("timed out".into())));
        }
    }

    impl Transport for Canned {
        fn get(&self, url: &str) -> Result<HttpReply, BibleError> {
            self.seen.borrow_mut().push(url.to_string());
            self.replies.borrow_mut().pop_front().unwrap_or_else(|| Err(BibleError::Transport("exhausted".into())))
        }
    }

    fn chapter(n: u32, prev: Option<u32>, next: Option<u32>) -> serde_json::Value {
        json!({
            "reference": format!("Ruth {}", n),
            "translation": {"id": "web", "name": "World English Bible"},
            "book": {"id": "RUT", "name": "Ruth"},
            "chapter": n,
            "text": format!("text of chapter {}", n),
            "previous": prev.map(|p| json!({"book": "RUT", "chapter": p})),
            "next": next.map(|x| json!({"book": "RUT", "chapter": x}))
        })
    }

    #[test]
    fn commands() {
        assert_eq!(parse_command("N\n"), Command::Next);
        assert_eq!(parse_command("\n"), Command::Next);
        assert_eq!(parse_command("prev"), Command::Previous);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("x"), Command::Unknown);
    }

    #[test]
    fn navigates_with_upstream_links() {
        let t = Canned::default();
        t.push(chapter(1, None, Some(2)));
        t.push(chapter(2, Some(1), Some(3)));
        let client = BibleClient::new(&t, "https://api.test/v1");
        let mut out = Vec::new();
        Reader::new(&client, None).run("Ruth 1", &mut Cursor::new("p\nn\nq\n"), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("No chapter in that direction."));
        assert!(out.contains("text of chapter 2"));
        assert_eq!(t.seen.borrow().as_slice(), [
            "https://api.test/v1/chapters/Ruth/1",
            "https://api.test/v1/chapters/RUT/2",
        ]);
    }

    #[test]
    fn failed_load_offers_manual_retry() {
        let t = Canned::default();
        t.push(chapter(4, Some(3), None));
        t.fail();
        t.push(chapter(3, Some(2), Some(4)));
        let client = BibleClient::new(&t, "https://api.test/v1");
        let mut out = Vec::new();
        Reader::new(&client, None).run("Ruth 4", &mut Cursor::new("p\nr\nq\n"), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("⚠ Failed to load RUT 3. Press r to retry."));
        assert!(out.contains("text of chapter 3"));
        assert_eq!(t.seen.borrow().len(), 3);
    }

    #[test]
    fn failed_first_load_can_be_retried() {
        let t = Canned::default();
        t.fail();
        t.push(chapter(1, None, Some(2)));
        let client = BibleClient::new(&t, "https://api.test/v1");
        let mut out = Vec::new();
        Reader::new(&client, None).run("Ruth 1", &mut Cursor::new("n\nr\nq\n"), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("⚠ Failed to load Ruth 1. Press r to retry."));
        assert!(out.contains("No chapter in that direction."));
        assert!(out.contains("text of chapter 1"));
        assert_eq!(t.seen.borrow().as_slice(), [
            "https://api.test/v1/chapters/Ruth/1",
            "https://api.test/v1/chapters/Ruth/1",
        ]);
    }

    #[test]
    fn upstream_error_on_start_is_printed() {
        let t = Canned::default();
        t.replies.borrow_mut().push_back(Ok(HttpReply { status: 404, body: json!({"error": "Book not found"}).to_string() }));
        let client = BibleClient::new(&t, "https://api.test/v1");
        let mut out = Vec::new();
        Reader::new(&client, None).run("Hezekiah 1", &mut Cursor::new(""), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Error: Book not found\n");
    }
}
