use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /query`
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    /// Prefix-free SPARQL text; the executor adds the namespace preamble
    #[serde(default)]
    pub query: Option<String>,
}

/// Query string of the `/search/*` routes
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// `application/sparql-results+json` document.
///
/// SELECT results carry `results`, ASK results carry `boolean`. Fixed routes
/// decode into this; the pass-through route relays the raw document instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub head: Head,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Bindings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    pub bindings: Vec<BindingRow>,
}

/// One solution. Variables left unbound by the engine are absent.
pub type BindingRow = IndexMap<String, Term>;

/// A flattened, route-specific record handed to the presentation layer
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
    Uri,
    Literal,
    /// Emitted by some older engines instead of `literal` + `datatype`
    TypedLiteral,
    Bnode,
}

/// RDF term as encoded in SPARQL JSON results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub kind: TermKind,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Term {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

impl ResultSet {
    /// Build a SELECT result from declared variables and rows
    pub fn select(vars: &[&str], rows: Vec<BindingRow>) -> Self {
        Self {
            head: Head {
                vars: vars.iter().map(|v| v.to_string()).collect(),
                link: Vec::new(),
            },
            results: Some(Bindings { bindings: rows }),
            boolean: None,
        }
    }

    pub fn ask(answer: bool) -> Self {
        Self {
            head: Head::default(),
            results: None,
            boolean: Some(answer),
        }
    }

    /// Solutions in engine order; empty for ASK results
    pub fn rows(&self) -> &[BindingRow] {
        self.results
            .as_ref()
            .map(|r| r.bindings.as_slice())
            .unwrap_or(&[])
    }
}
