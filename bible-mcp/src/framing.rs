use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::{debug, trace, warn};

/// Largest body accepted after a `Content-Length` header.
pub const MAX_BODY: usize = 16 * 1024 * 1024;

/// How the peer frames messages. Replies use whatever the last request used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramingMode { Lsp, Lines }

/// One decoded unit read from the peer.
#[derive(Debug)]
pub enum Incoming {
    Message(serde_json::Value),
    /// Syntactically broken JSON; answered with a parse error.
    Malformed(String),
    /// Header block without a body.
    Empty,
}

pub struct Framer {
    mode: FramingMode,
}

impl Default for Framer {
    fn default() -> Self { Self { mode: FramingMode::Lsp } }
}

impl Framer {
    pub fn mode(&self) -> FramingMode { self.mode }

    /// Read one message. Accepts newline-delimited JSON or
    /// `Content-Length` headers followed by a blank line and the body.
    /// `Ok(None)` on EOF.
    pub fn read(&mut self, input: &mut impl BufRead) -> Result<Option<Incoming>> {
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 { return Ok(None); }
            if !line.trim().is_empty() { break; }
        }

        if line.trim_start().starts_with('{') {
            self.mode = FramingMode::Lines;
            trace!(line = line.trim_end(), "recv lines");
            return Ok(Some(parse(line.trim_end().as_bytes())));
        }

        if !is_header(&line) {
            debug!(line = line.trim_end(), "neither JSON object nor header");
            return Ok(Some(Incoming::Malformed(format!("unexpected input: {}", truncate(line.trim(), 80)))));
        }

        let mut headers = line.clone();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 { break; }
            if line.trim().is_empty() { break; }
            headers.push_str(&line);
        }
        self.mode = FramingMode::Lsp;
        trace!(headers = %headers.escape_debug(), "recv headers");

        let content_length = headers.lines()
            .filter_map(|h| h.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
            .map(|(_, v)| v.trim().parse::<usize>().unwrap_or(usize::MAX))
            .unwrap_or(0);
        if content_length == 0 {
            debug!("header block without body, skipping");
            return Ok(Some(Incoming::Empty));
        }
        if content_length > MAX_BODY {
            warn!(content_length, "message body over limit, skipping");
            // Unparseable lengths land here too; nothing sensible to skip.
            if content_length != usize::MAX {
                let skipped = discard(input, content_length)?;
                debug!(skipped, "discarded oversized body");
            }
            return Ok(Some(Incoming::Malformed(format!("Content-Length {} exceeds {} bytes", content_length, MAX_BODY))));
        }
        let mut body = vec![0u8; content_length];
        input.read_exact(&mut body).context("reading message body")?;
        Ok(Some(parse(&body)))
    }

    pub fn write(&self, out: &mut impl Write, v: &serde_json::Value) -> Result<()> {
        let body = serde_json::to_vec(v)?;
        match self.mode {
            FramingMode::Lines => {
                out.write_all(&body)?;
                out.write_all(b"\n")?;
            }
            FramingMode::Lsp => {
                write!(
                    out,
                    "Content-Length: {}\r\nContent-Type: application/vscode-jsonrpc; charset=utf-8\r\n\r\n",
                    body.len()
                )?;
                out.write_all(&body)?;
            }
        }
        out.flush()?;
        trace!(bytes = body.len(), mode = ?self.mode, "sent");
        Ok(())
    }
}

/// `Name: value` with a token-like name, as in an LSP header block.
fn is_header(line: &str) -> bool {
    match line.split_once(':') {
        Some((name, _)) => !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'),
        None => false,
    }
}

fn discard(input: &mut impl BufRead, mut n: usize) -> std::io::Result<usize> {
    let mut skipped = 0;
    while n > 0 {
        let available = input.fill_buf()?.len();
        if available == 0 { break; }
        let k = available.min(n);
        input.consume(k);
        n -= k;
        skipped += k;
    }
    Ok(skipped)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn parse(bytes: &[u8]) -> Incoming {
    match serde_json::from_slice(bytes) {
        Ok(v) => Incoming::Message(v),
        Err(e) => Incoming::Malformed(e.to_string()),
    }
}
