//! Plain-text renderings of upstream replies.

use crate::types::*;

fn rule() -> String { "─".repeat(40) }

pub fn verse(v: &VerseResponse) -> String {
    [format!("📖 {}", v.reference), format!("Translation: {}", v.translation.name), String::new(), v.text.clone()].join("\n")
}

/// `Navigation: ← Romans 7 | Romans 9 →`, or `None` at both ends of the canon.
pub fn navigation_hint(previous: Option<&ChapterLink>, next: Option<&ChapterLink>) -> Option<String> {
    let parts: Vec<String> = [
        previous.map(|p| format!("← {}", p.label())),
        next.map(|n| format!("{} →", n.label())),
    ].into_iter().flatten().collect();
    if parts.is_empty() { None } else { Some(format!("Navigation: {}", parts.join(" | "))) }
}

pub fn chapter(c: &ChapterResponse) -> String {
    let mut lines = vec![format!("📖 {}", c.reference), format!("Translation: {}", c.translation.name), String::new(), c.text.clone()];
    if let Some(nav) = navigation_hint(c.previous.as_ref(), c.next.as_ref()) {
        lines.push(String::new());
        lines.push(nav);
    }
    lines.join("\n")
}

pub fn passage(p: &Passage) -> String {
    match p {
        Passage::Verses(v) => verse(v),
        Passage::Chapter(c) => chapter(c),
    }
}

pub fn random_verse(v: &VerseResponse) -> String {
    format!("🎲 Random Verse\n\n{}", verse(v))
}

pub fn search(query: &str, r: &SearchResponse) -> String {
    if r.results.is_empty() {
        return format!("No results found for \"{}\"", query);
    }
    let mut lines = vec![
        format!("🔍 Search: \"{}\"", r.query),
        format!("Found: {} results (showing {})", r.total, r.results.len()),
        String::new(),
    ];
    for v in &r.results {
        lines.push(format!("📖 {}", v.display_reference()));
        lines.push(v.text.clone());
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

fn testament_heading(code: &str) -> &str {
    match code {
        "OT" => "📜 OLD TESTAMENT",
        "NT" => "✝️ NEW TESTAMENT",
        "AP" => "📚 APOCRYPHA",
        other => other,
    }
}

/// Books grouped by testament, groups in first-seen order.
pub fn books(books: &[Book]) -> String {
    let mut groups: Vec<(&str, Vec<&Book>)> = Vec::new();
    for b in books {
        match groups.iter().position(|(k, _)| *k == b.testament) {
            Some(i) => groups[i].1.push(b),
            None => groups.push((b.testament.as_str(), vec![b])),
        }
    }
    let mut lines = Vec::new();
    for (key, group) in groups {
        lines.push(testament_heading(key).to_string());
        lines.push(rule());
        for b in group {
            lines.push(format!("{:<4} {} ({} ch)", b.id, b.name, b.chapters));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

pub fn translations(list: &[TranslationInfo]) -> String {
    let mut lines = vec!["📚 AVAILABLE TRANSLATIONS".to_string(), rule(), String::new()];
    for t in list {
        lines.push(format!("• {} - {}", t.id.to_uppercase(), t.name));
        lines.push(format!("  {}", t.description));
        lines.push(format!("  Language: {} | License: {}", t.language, t.license));
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}
