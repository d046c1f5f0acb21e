use std::ops::Range;

use crate::models::settings::TypeaheadOptions;

/// One typeahead suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    /// Byte range of the first match within `text`, when highlighting is on.
    pub highlight: Option<Range<usize>>,
}

impl Suggestion {
    /// Split into (before, matched, after) for rendering.
    pub fn parts(&self) -> (&str, &str, &str) {
        match &self.highlight {
            Some(r) => (&self.text[..r.start], &self.text[r.clone()], &self.text[r.end..]),
            None => (&self.text, "", ""),
        }
    }
}

/// Case-insensitive substring matcher over a fixed list of names.
///
/// The query is matched literally: `"."` only matches a dot.
pub struct SubstringMatcher {
    candidates: Vec<String>,
    options: TypeaheadOptions,
}

impl SubstringMatcher {
    pub fn new(candidates: Vec<String>, options: TypeaheadOptions) -> Self {
        Self {
            candidates,
            options,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn options(&self) -> TypeaheadOptions {
        self.options
    }

    /// All candidates containing `query`, in list order.
    pub fn find_matches(&self, query: &str) -> Vec<Suggestion> {
        if query.is_empty() || query.chars().count() < self.options.min_length {
            return Vec::new();
        }

        let limit = self.options.limit.unwrap_or(usize::MAX);
        self.candidates
            .iter()
            .filter_map(|candidate| {
                let range = find_case_insensitive(candidate, query)?;
                Some(Suggestion {
                    text: candidate.clone(),
                    highlight: self.options.highlight.then_some(range),
                })
            })
            .take(limit)
            .collect()
    }

    /// Inline completion for `query`: the query as typed followed by the rest
    /// of the top suggestion, when that suggestion starts with the query.
    pub fn hint(&self, query: &str) -> Option<String> {
        if !self.options.hint {
            return None;
        }
        let top = self.find_matches(query).into_iter().next()?;
        let covered = match_len_at(&top.text, query)?;
        let rest = &top.text[covered..];
        (!rest.is_empty()).then(|| format!("{query}{rest}"))
    }
}

/// Byte range of the first case-insensitive occurrence of `needle` in `haystack`.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<Range<usize>> {
    haystack
        .char_indices()
        .find_map(|(start, _)| match_len_at(&haystack[start..], needle).map(|len| start..start + len))
}

/// If `text` starts with `prefix` ignoring case, the byte length it covers in `text`.
fn match_len_at(text: &str, prefix: &str) -> Option<usize> {
    let mut consumed = 0;
    let mut chars = text.chars();
    for wanted in prefix.chars() {
        let got = chars.next()?;
        if !got.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
        consumed += got.len_utf8();
    }
    Some(consumed)
}
