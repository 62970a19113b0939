//! Binding row → flat record projection
//!
//! Every projected field is always emitted; a variable the engine left unbound
//! becomes JSON `null`.

use serde_json::Value;

use super::errors::MappingError;
use super::models::{BindingRow, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Lexical value of the term, as a string
    Text,
    /// Lexical value parsed as `i64` (aggregate counts)
    Integer,
}

/// One output field and the SPARQL variable it is read from
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub var: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(name: &'static str, var: &'static str) -> Self {
        Self {
            name,
            var,
            kind: FieldKind::Text,
        }
    }

    pub const fn integer(name: &'static str, var: &'static str) -> Self {
        Self {
            name,
            var,
            kind: FieldKind::Integer,
        }
    }
}

pub fn project_row(row: &BindingRow, fields: &[Field]) -> Result<Record, MappingError> {
    let mut record = Record::with_capacity(fields.len());

    for field in fields {
        let value = match row.get(field.var) {
            None => Value::Null,
            Some(term) => match field.kind {
                FieldKind::Text => Value::String(term.value.clone()),
                FieldKind::Integer => {
                    let n = term.value.trim().parse::<i64>().map_err(|_| {
                        MappingError::NotAnInteger {
                            field: field.name,
                            var: field.var,
                            value: term.value.clone(),
                        }
                    })?;
                    Value::from(n)
                }
            },
        };
        record.insert(field.name.to_string(), value);
    }

    Ok(record)
}

/// Project all rows, preserving engine order. Fails on the first bad row.
pub fn project_rows(rows: &[BindingRow], fields: &[Field]) -> Result<Vec<Record>, MappingError> {
    rows.iter().map(|row| project_row(row, fields)).collect()
}
