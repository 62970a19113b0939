//! Declarative table of the fixed-shape routes
//!
//! Each entry pairs a SPARQL template (prefix-free; the executor adds the
//! preamble) with the projection that turns its rows into records. Adding a
//! route means adding an entry here and one line in the router.

use std::collections::HashMap;

use super::parameter_substitution::{
    self, ParameterSubstitutionError, SlotKind, prepare_value,
};
use super::projection::Field;

/// The single caller-controlled value a template may take
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub name: &'static str,
    pub kind: SlotKind,
}

#[derive(Debug)]
pub struct FixedQuery {
    pub name: &'static str,
    pub template: &'static str,
    pub slot: Option<Slot>,
    pub fields: &'static [Field],
}

impl FixedQuery {
    /// Fill the template, validating and quoting the slot value if there is one
    pub fn render(&self, arg: Option<&str>) -> Result<String, ParameterSubstitutionError> {
        let mut params = HashMap::new();

        if let Some(slot) = self.slot {
            let raw = arg
                .ok_or_else(|| ParameterSubstitutionError::MissingParameter(slot.name.to_string()))?;
            params.insert(slot.name.to_string(), prepare_value(slot.kind, slot.name, raw)?);
        }

        parameter_substitution::substitute_parameters(self.template, &params)
    }

    pub fn var_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.var)
    }
}

const BOOK_FIELDS: &[Field] = &[
    Field::text("title", "title"),
    Field::text("isbn", "isbn"),
    Field::text("year", "year"),
    Field::text("author", "authorName"),
    Field::text("genre", "genreName"),
    Field::text("publisher", "publisherName"),
];

const MEMBER_FIELDS: &[Field] = &[
    Field::text("memberName", "memberName"),
    Field::text("memberId", "memberId"),
    Field::text("email", "email"),
    Field::text("type", "type"),
];

pub static ALL_BOOKS: FixedQuery = FixedQuery {
    name: "items",
    template: r#"
SELECT ?title ?isbn ?year ?authorName ?genreName ?publisherName
WHERE {
  ?book rdf:type lib:Book ;
        lib:title           ?title ;
        lib:isbn            ?isbn ;
        lib:publicationYear ?year ;
        lib:writtenBy       ?author ;
        lib:hasGenre        ?genre ;
        lib:publishedBy     ?pub .
  ?author lib:authorName    ?authorName .
  ?genre  lib:genreName     ?genreName .
  ?pub    lib:publisherName ?publisherName .
}
ORDER BY ?title
"#,
    slot: None,
    fields: BOOK_FIELDS,
};

pub static AVAILABLE_COPIES: FixedQuery = FixedQuery {
    name: "copies_available",
    template: r#"
SELECT ?copyId ?bookTitle
WHERE {
  ?copy lib:isAvailable true ;
        lib:copyId      ?copyId ;
        lib:copyOf      ?book .
  ?book lib:title ?bookTitle .
}
ORDER BY ?bookTitle
"#,
    slot: None,
    fields: &[
        Field::text("copyId", "copyId"),
        Field::text("bookTitle", "bookTitle"),
    ],
};

pub static ACTIVE_LOANS: FixedQuery = FixedQuery {
    name: "loans_active",
    template: r#"
SELECT ?memberName ?bookTitle ?loanDate ?dueDate
WHERE {
  ?loan lib:borrowedBy   ?member ;
        lib:includesBook ?copy ;
        lib:loanDate     ?loanDate ;
        lib:dueDate      ?dueDate ;
        lib:isReturned   false .
  ?member lib:memberName ?memberName .
  ?copy   lib:copyOf     ?book .
  ?book   lib:title      ?bookTitle .
}
ORDER BY ?dueDate
"#,
    slot: None,
    fields: &[
        Field::text("memberName", "memberName"),
        Field::text("bookTitle", "bookTitle"),
        Field::text("loanDate", "loanDate"),
        Field::text("dueDate", "dueDate"),
    ],
};

// Same pattern as ACTIVE_LOANS plus the OverDueLoan class, so the result is
// always a subset of the active loans.
pub static OVERDUE_LOANS: FixedQuery = FixedQuery {
    name: "loans_overdue",
    template: r#"
SELECT ?memberName ?bookTitle ?dueDate
WHERE {
  ?loan rdf:type lib:OverDueLoan ;
        lib:borrowedBy   ?member ;
        lib:includesBook ?copy ;
        lib:dueDate      ?dueDate ;
        lib:isReturned   false .
  ?member lib:memberName ?memberName .
  ?copy   lib:copyOf     ?book .
  ?book   lib:title      ?bookTitle .
}
"#,
    slot: None,
    fields: &[
        Field::text("memberName", "memberName"),
        Field::text("bookTitle", "bookTitle"),
        Field::text("dueDate", "dueDate"),
    ],
};

pub static MEMBERS: FixedQuery = FixedQuery {
    name: "members",
    template: r#"
SELECT ?memberName ?memberId ?email ?type
WHERE {
  ?member lib:memberName ?memberName ;
          lib:memberId   ?memberId ;
          lib:email      ?email .
  { ?member rdf:type lib:StudentMember . BIND("Student" AS ?type) }
  UNION
  { ?member rdf:type lib:FacultyMember . BIND("Faculty" AS ?type) }
}
ORDER BY ?memberName
"#,
    slot: None,
    fields: MEMBER_FIELDS,
};

pub static MEMBER_LOANS: FixedQuery = FixedQuery {
    name: "member_loans",
    template: r#"
SELECT ?bookTitle ?loanDate ?dueDate ?returnDate ?isReturned
WHERE {
  ?member lib:memberId $memberId .
  ?loan lib:borrowedBy   ?member ;
        lib:includesBook ?copy ;
        lib:loanDate     ?loanDate ;
        lib:dueDate      ?dueDate ;
        lib:isReturned   ?isReturned .
  OPTIONAL { ?loan lib:returnDate ?returnDate . }
  ?copy lib:copyOf ?book .
  ?book lib:title  ?bookTitle .
}
ORDER BY DESC(?loanDate)
"#,
    slot: Some(Slot {
        name: "memberId",
        kind: SlotKind::Identifier,
    }),
    fields: &[
        Field::text("bookTitle", "bookTitle"),
        Field::text("loanDate", "loanDate"),
        Field::text("dueDate", "dueDate"),
        Field::text("returnDate", "returnDate"),
        Field::text("isReturned", "isReturned"),
    ],
};

pub static AUTHOR_STATS: FixedQuery = FixedQuery {
    name: "authors_stats",
    template: r#"
SELECT ?authorName ?nationality (COUNT(?book) AS ?bookCount)
WHERE {
  ?author lib:authorName ?authorName .
  ?book   lib:writtenBy  ?author .
  OPTIONAL { ?author lib:nationality ?nationality . }
}
GROUP BY ?authorName ?nationality
ORDER BY DESC(?bookCount) ?authorName
"#,
    slot: None,
    fields: &[
        Field::text("author", "authorName"),
        Field::text("nationality", "nationality"),
        Field::integer("count", "bookCount"),
    ],
};

pub static SEARCH_BOOKS: FixedQuery = FixedQuery {
    name: "search_items",
    template: r#"
SELECT ?title ?isbn ?year ?authorName ?genreName ?publisherName
WHERE {
  ?book rdf:type lib:Book ;
        lib:title           ?title ;
        lib:isbn            ?isbn ;
        lib:publicationYear ?year ;
        lib:writtenBy       ?author ;
        lib:hasGenre        ?genre ;
        lib:publishedBy     ?pub .
  ?author lib:authorName    ?authorName .
  ?genre  lib:genreName     ?genreName .
  ?pub    lib:publisherName ?publisherName .
  FILTER(
    CONTAINS(LCASE(STR(?title)),         LCASE($term)) ||
    CONTAINS(LCASE(STR(?authorName)),    LCASE($term)) ||
    CONTAINS(LCASE(STR(?genreName)),     LCASE($term)) ||
    CONTAINS(LCASE(STR(?publisherName)), LCASE($term))
  )
}
ORDER BY ?title
"#,
    slot: Some(Slot {
        name: "term",
        kind: SlotKind::FreeText,
    }),
    fields: BOOK_FIELDS,
};

pub static SEARCH_MEMBERS: FixedQuery = FixedQuery {
    name: "search_members",
    template: r#"
SELECT ?memberName ?memberId ?email ?type
WHERE {
  ?member lib:memberName ?memberName ;
          lib:memberId   ?memberId ;
          lib:email      ?email .
  { ?member rdf:type lib:StudentMember . BIND("Student" AS ?type) }
  UNION
  { ?member rdf:type lib:FacultyMember . BIND("Faculty" AS ?type) }
  FILTER(CONTAINS(LCASE(STR(?memberName)), LCASE($term)))
}
ORDER BY ?memberName
"#,
    slot: Some(Slot {
        name: "term",
        kind: SlotKind::FreeText,
    }),
    fields: MEMBER_FIELDS,
};

pub static FIXED_QUERIES: &[&FixedQuery] = &[
    &ALL_BOOKS,
    &AVAILABLE_COPIES,
    &ACTIVE_LOANS,
    &OVERDUE_LOANS,
    &MEMBERS,
    &MEMBER_LOANS,
    &AUTHOR_STATS,
    &SEARCH_BOOKS,
    &SEARCH_MEMBERS,
];
