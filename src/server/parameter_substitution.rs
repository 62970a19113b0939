//! Slot substitution and literal escaping for SPARQL templates
//!
//! Fixed templates mark caller-controlled values with `$slotName`. Every value
//! is rendered as a double-quoted SPARQL string literal, so a caller can never
//! close the literal and inject graph patterns. SPARQL variables inside
//! templates always use the `?` sigil.

use std::collections::HashMap;

/// Longest accepted free-text value (search terms)
pub const MAX_FREE_TEXT_CHARS: usize = 200;

/// Longest accepted identifier value (member ids)
pub const MAX_IDENTIFIER_CHARS: usize = 64;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParameterSubstitutionError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter name: {0} (must be alphanumeric or underscore)")]
    InvalidParameterName(String),

    #[error("Invalid {name}: only letters, digits, '-', '_' and '.' are allowed (max {max} characters)")]
    InvalidIdentifier { name: String, max: usize },

    #[error("Parameter {0} must not be empty")]
    EmptyValue(String),

    #[error("Parameter {name} exceeds {max} characters")]
    TooLong { name: String, max: usize },
}

/// How a slot value is checked before it is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Opaque key such as a member id; strict allow-list
    Identifier,
    /// Human search input; any characters, trimmed and length-capped
    FreeText,
}

/// Escape a string value for use inside a SPARQL `"..."` literal
///
/// Covers every ECHAR of the SPARQL 1.1 grammar. Backslash goes first so the
/// escapes added afterwards are not doubled.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\") // Must be first!
        .replace('"', "\\\"")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\u{8}', "\\b")
        .replace('\u{c}', "\\f")
}

/// Render a value as a SPARQL string literal
pub fn format_literal(value: &str) -> String {
    format!("\"{}\"", escape_string(value))
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Check a raw caller value against its slot rules
///
/// Returns the value that should be substituted (trimmed for free text).
pub fn prepare_value(
    kind: SlotKind,
    name: &str,
    raw: &str,
) -> Result<String, ParameterSubstitutionError> {
    match kind {
        SlotKind::Identifier => {
            if raw.is_empty()
                || raw.chars().count() > MAX_IDENTIFIER_CHARS
                || !raw.chars().all(is_identifier_char)
            {
                return Err(ParameterSubstitutionError::InvalidIdentifier {
                    name: name.to_string(),
                    max: MAX_IDENTIFIER_CHARS,
                });
            }
            Ok(raw.to_string())
        }
        SlotKind::FreeText => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ParameterSubstitutionError::EmptyValue(name.to_string()));
            }
            if trimmed.chars().count() > MAX_FREE_TEXT_CHARS {
                return Err(ParameterSubstitutionError::TooLong {
                    name: name.to_string(),
                    max: MAX_FREE_TEXT_CHARS,
                });
            }
            Ok(trimmed.to_string())
        }
    }
}

/// Validate parameter name (alphanumeric + underscore only)
fn is_valid_parameter_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Substitute slots in a SPARQL template
///
/// Replaces all `$slotName` placeholders with quoted, escaped literals.
///
/// # Errors
/// - `MissingParameter` if a placeholder is found but no value provided
/// - `InvalidParameterName` if a parameter name contains invalid characters
///
/// # Example
/// ```ignore
/// let mut params = HashMap::new();
/// params.insert("memberId".to_string(), "M-001".to_string());
///
/// let q = "SELECT ?name WHERE { ?m lib:memberId $memberId ; lib:memberName ?name }";
/// let result = substitute_parameters(q, &params).unwrap();
/// // Result: SELECT ?name WHERE { ?m lib:memberId "M-001" ; lib:memberName ?name }
/// ```
pub fn substitute_parameters(
    template: &str,
    parameters: &HashMap<String, String>,
) -> Result<String, ParameterSubstitutionError> {
    let mut result = String::with_capacity(template.len() + 64);
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            let mut param_name = String::new();

            while let Some(&next_ch) = chars.peek() {
                if next_ch.is_alphanumeric() || next_ch == '_' {
                    param_name.push(next_ch);
                    chars.next();
                } else {
                    break;
                }
            }

            if param_name.is_empty() {
                // Just a lone $ character
                result.push('$');
            } else {
                if !is_valid_parameter_name(&param_name) {
                    return Err(ParameterSubstitutionError::InvalidParameterName(param_name));
                }

                match parameters.get(&param_name) {
                    Some(value) => result.push_str(&format_literal(value)),
                    None => {
                        return Err(ParameterSubstitutionError::MissingParameter(param_name));
                    }
                }
            }
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
