use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;

/// Fallback id for headings whose text produces an empty slug.
const EMPTY_SLUG: &str = "section";

/// NFKD -> lowercase -> whitespace to spaces -> filter -> hyphenate -> cleanup.
pub fn slugify_heading(title: &str) -> Option<String> {
    let normalized = title.nfkd().collect::<String>();
    let lowered = normalized.to_lowercase();

    let mut filtered = String::new();
    for ch in lowered.chars() {
        let mapped = if ch.is_whitespace() { ' ' } else { ch };
        if mapped.is_alphabetic() || mapped.is_numeric() || mapped == ' ' || mapped == '-' {
            filtered.push(mapped);
        }
    }

    // Collapse runs of spaces and hyphens into a single hyphen.
    let mut cleaned = String::new();
    let mut prev_hyphen = false;
    for ch in filtered.chars() {
        if ch == ' ' || ch == '-' {
            if !prev_hyphen {
                cleaned.push('-');
                prev_hyphen = true;
            }
        } else {
            cleaned.push(ch);
            prev_hyphen = false;
        }
    }

    let cleaned = cleaned.trim_matches('-').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Hands out automatic heading ids, appending `-1`, `-2`, ... to repeats.
///
/// Only automatic ids are de-duplicated. Explicit ids are recorded so that a
/// later automatic id never collides with them, but an explicit id is always
/// returned unchanged.
#[derive(Debug, Default)]
pub struct HeadingIds {
    occurrences: BTreeMap<String, usize>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explicit(&mut self, id: &str) -> String {
        self.occurrences.entry(id.to_string()).or_insert(1);
        id.to_string()
    }

    pub fn automatic(&mut self, title: &str) -> String {
        let base = slugify_heading(title).unwrap_or_else(|| EMPTY_SLUG.to_string());
        let mut count = self.occurrences.get(&base).copied().unwrap_or(0);
        let mut candidate = if count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        while count > 0 && self.occurrences.contains_key(&candidate) {
            count += 1;
            candidate = format!("{base}-{count}");
        }
        self.occurrences.insert(base, count + 1);
        self.occurrences.entry(candidate.clone()).or_insert(1);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_nfkd_filters_combining_marks() {
        assert_eq!(slugify_heading("café"), Some("cafe".to_string()));
    }

    #[test]
    fn slugify_removes_punctuation_and_hyphenates_spaces() {
        assert_eq!(
            slugify_heading("Hello, world!"),
            Some("hello-world".to_string())
        );
    }

    #[test]
    fn slugify_collapses_hyphens_and_trims() {
        assert_eq!(slugify_heading("-- A  --  B --"), Some("a-b".to_string()));
        assert_eq!(slugify_heading("?!"), None);
    }

    #[test]
    fn automatic_ids_get_numeric_suffixes() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.automatic("Overview"), "overview");
        assert_eq!(ids.automatic("Overview"), "overview-1");
        assert_eq!(ids.automatic("Overview"), "overview-2");
        assert_eq!(ids.automatic("!!"), "section");
    }

    #[test]
    fn automatic_ids_step_around_taken_suffixes() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.automatic("Usage 1"), "usage-1");
        assert_eq!(ids.automatic("Usage"), "usage");
        assert_eq!(ids.automatic("Usage"), "usage-2");
    }

    #[test]
    fn explicit_ids_are_returned_unchanged() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.explicit("intro"), "intro");
        assert_eq!(ids.explicit("intro"), "intro");
        assert_eq!(ids.automatic("Intro"), "intro-1");
    }
}
