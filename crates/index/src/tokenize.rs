use retriever_model::CodeFragment;
use std::collections::HashSet;

/// Tokens of this length or shorter carry no signal and are not indexed.
const MIN_TOKEN_LEN: usize = 3;

/// Content longer than this is skipped when building the inverted index so a
/// single large body does not dominate the token space.
const MAX_INDEXED_CONTENT_LEN: usize = 1000;

/// Split an identifier on camel-case boundaries and lowercase the parts.
///
/// Boundaries are lower→upper transitions and the last upper of an acronym
/// run followed by a lowercase letter: `HybridRetrievalStrategy` becomes
/// `["hybrid", "retrieval", "strategy"]` and `HTTPServer` becomes
/// `["http", "server"]`.
#[must_use]
pub fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        let lower_to_upper = prev.is_lowercase() && cur.is_uppercase();
        let acronym_end = prev.is_uppercase()
            && cur.is_uppercase()
            && chars.get(i + 1).is_some_and(|c| c.is_lowercase());
        if lower_to_upper || acronym_end {
            parts.push(chars[start..i].iter().collect::<String>().to_lowercase());
            start = i;
        }
    }
    parts.push(chars[start..].iter().collect::<String>().to_lowercase());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Split free text on non-word characters, lowercasing the pieces.
fn word_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// All indexable tokens of a fragment: camel-case parts of the name plus
/// word tokens from the signature, documentation, and (size-capped) content.
pub(crate) fn extract_tokens(fragment: &CodeFragment) -> HashSet<String> {
    let mut tokens: HashSet<String> = split_camel_case(&fragment.name).into_iter().collect();

    if let Some(signature) = &fragment.signature {
        tokens.extend(word_tokens(signature));
    }
    if let Some(documentation) = &fragment.documentation {
        tokens.extend(word_tokens(documentation));
    }
    if let Some(content) = &fragment.content {
        if content.len() < MAX_INDEXED_CONTENT_LEN {
            tokens.extend(word_tokens(content));
        }
    }

    tokens.retain(|t| t.len() >= MIN_TOKEN_LEN);
    tokens
}
