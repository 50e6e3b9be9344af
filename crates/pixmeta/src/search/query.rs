use std::sync::LazyLock;

use regex::Regex;

static RE_KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+):(\w+)").unwrap());

/// A search term split into its `key:value` filters and remaining free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Free text left after every `key:value` token is removed, trimmed.
    pub text: String,
    /// Value of the last `status:` token.
    pub status: Option<String>,
    /// Value of the last `category:` token.
    pub category: Option<String>,
}

impl ParsedQuery {
    /// Parses a raw search term. Tokens with keys other than `status` and
    /// `category` are dropped from the text and have no filter effect.
    pub fn parse(term: &str) -> Self {
        let mut query = ParsedQuery::default();

        for caps in RE_KEY_VALUE.captures_iter(term) {
            let value = caps[2].to_string();
            match &caps[1] {
                "status" => query.status = Some(value),
                "category" => query.category = Some(value),
                _ => {}
            }
        }

        query.text = RE_KEY_VALUE.replace_all(term, "").trim().to_string();
        query
    }

    /// Lowercased free text, or `None` when there is nothing to match.
    pub fn needle(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.to_lowercase())
        }
    }
}
