use std::{collections::HashSet, sync::LazyLock};

use invite::name_key;
use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedGuests {
    pub names: Vec<String>,
    pub duplicates: usize,
}

pub fn sanitize(input: &str) -> String {
    WHITESPACE.replace_all(input.trim(), " ").into_owned()
}

pub fn parse_guests(raw: &str) -> ParsedGuests {
    let mut seen = HashSet::new();
    let mut parsed = ParsedGuests::default();

    for line in raw.lines() {
        let name = sanitize(line);

        if name.is_empty() || name.starts_with('#') {
            continue;
        }

        if seen.insert(name_key(&name)) {
            parsed.names.push(name);
        } else {
            parsed.duplicates += 1;
        }
    }

    parsed
}
