//! Query-form detection for the pass-through route
//!
//! Only the prologue and the first keyword are inspected: comments, `PREFIX`
//! and `BASE` declarations are skipped, then the leading keyword decides the
//! form. Anything unrecognised is left for the engine to judge.

use std::sync::LazyLock;

use regex::Regex;

static PREFIX_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:PREFIX)\s*[^\s:<>]*:\s*<[^>]*>").expect("valid PREFIX regex")
});
static BASE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:BASE)\s*<[^>]*>").expect("valid BASE regex"));
static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+").expect("valid keyword regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
    /// Any SPARQL 1.1 Update operation
    Update,
    Unknown,
}

impl QueryForm {
    /// Why this form may not go through the pass-through route, if it may not
    pub fn rejection(&self) -> Option<&'static str> {
        match self {
            QueryForm::Select | QueryForm::Ask | QueryForm::Unknown => None,
            QueryForm::Construct | QueryForm::Describe => {
                Some("Only SELECT and ASK queries are supported: CONSTRUCT and DESCRIBE do not return tabular results")
            }
            QueryForm::Update => Some("Update operations are not permitted: this gateway is read-only"),
        }
    }
}

fn skip_ws_and_comments(mut rest: &str) -> &str {
    loop {
        rest = rest.trim_start();
        if let Some(comment) = rest.strip_prefix('#') {
            rest = comment.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else {
            return rest;
        }
    }
}

pub fn classify(text: &str) -> QueryForm {
    let mut rest = skip_ws_and_comments(text);

    loop {
        if let Some(m) = PREFIX_DECL.find(rest).or_else(|| BASE_DECL.find(rest)) {
            rest = skip_ws_and_comments(&rest[m.end()..]);
            continue;
        }
        break;
    }

    let Some(keyword) = KEYWORD.find(rest) else {
        return QueryForm::Unknown;
    };

    match keyword.as_str().to_ascii_uppercase().as_str() {
        "SELECT" => QueryForm::Select,
        "ASK" => QueryForm::Ask,
        "CONSTRUCT" => QueryForm::Construct,
        "DESCRIBE" => QueryForm::Describe,
        "INSERT" | "DELETE" | "LOAD" | "CLEAR" | "CREATE" | "DROP" | "COPY" | "MOVE" | "ADD"
        | "WITH" => QueryForm::Update,
        _ => QueryForm::Unknown,
    }
}
