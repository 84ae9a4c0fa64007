//! Text tag pattern catalog.
//!
//! A single ordered, declarative table of `(label, pattern)` pairs evaluated
//! once per new text item. Each matching pattern yields one auto-sourced tag.
//! Labels are the user-facing Korean tag names of the original catalog.

use once_cell::sync::Lazy;
use regex::Regex;

/// The ordered catalog. Order is presentation order only; every matching
/// pattern contributes a label.
pub static TEXT_TAG_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "이메일",
            r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}",
        ),
        ("전화번호", r"\b01[016789]-\d{3,4}-\d{4}\b"),
        ("URL", r#"https?://[^\s<>"]+"#),
        ("IP주소", r"\b(?:\d{1,3}\.){3}\d{1,3}\b"),
        ("날짜", r"\b\d{4}[-./]\d{1,2}[-./]\d{1,2}\b"),
        ("시간", r"\b\d{1,2}:\d{2}(?::\d{2})?\b"),
        ("우편번호", r"\(\d{5}\)|\b우\s?\d{5}\b"),
        ("주민등록번호", r"\b\d{6}-[1-4]\d{6}\b"),
        ("카드번호", r"\b\d{4}-\d{4}-\d{4}-\d{4}\b"),
        ("마크업태그", r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?>"),
        ("해시태그", r"#[\w가-힣]+"),
        ("멘션", r"@[A-Za-z0-9_]{2,}\b"),
        ("MAC주소", r"\b(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}\b"),
        (
            "UUID",
            r"\b[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\b",
        ),
        (
            "ISBN",
            r"\bISBN(?:-1[03])?:?\s*(?:97[89][- ]?)?\d{1,5}[- ]?\d{1,7}[- ]?\d{1,7}[- ]?[\dXx]\b",
        ),
        ("국제전화", r"\+\d{1,3}[- ]?\d{1,4}[- ]?\d{3,4}[- ]?\d{3,4}\b"),
        (
            "금액",
            r"[₩$€¥£]\s?\d{1,3}(?:,\d{3})*(?:\.\d+)?|\b\d{1,3}(?:,\d{3})+원\b",
        ),
        (
            "파일경로",
            r#"(?:^|\s)(?:[A-Za-z]:\\|~?/)[^\s:*?"<>|]+"#,
        ),
        ("색상코드", r"#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})\b"),
    ]
    .into_iter()
    .map(|(label, pattern)| {
        let regex = Regex::new(pattern).expect("tag pattern catalog entry must compile");
        (label, regex)
    })
    .collect()
});

/// Evaluate the catalog against a piece of text. Returns each matching label
/// once, in catalog order.
pub fn labels_for_text(text: &str) -> Vec<&'static str> {
    TEXT_TAG_PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(text))
        .map(|(label, _)| *label)
        .collect()
}
