//! Path expression compilation
//!
//! Compiles path strings like `/Pathway/DataNode[@CenterX>1]/@Height`
//! into step matchers. Pure: the same path and prefix table always yield
//! the same steps, and a failed compilation has no side effects.

use std::collections::HashMap;

use crate::error::{Error, NamespaceResolutionError, Result};
use crate::path::{Axis, CompareOp, Predicate, PredicateValue, StepMatcher};

/// Compile a path expression into root-first step matchers.
///
/// `prefixes` maps path prefixes to namespace URIs; a segment using an
/// unregistered prefix fails with a namespace resolution error. A
/// trailing `@name`/`@*` becomes an attribute step; attribute steps
/// anywhere else are rejected.
pub fn compile(path: &str, prefixes: &HashMap<String, String>) -> Result<Vec<StepMatcher>> {
    let segments = split_segments(path)?;
    if segments.is_empty() {
        return Err(Error::Path(format!("empty path expression: '{}'", path)));
    }

    let mut steps = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        if let Some(attribute) = segment.strip_prefix('@') {
            if index + 1 != segments.len() {
                return Err(Error::Path(format!(
                    "attribute segment '@{}' must be last in '{}'",
                    attribute, path
                )));
            }
            if attribute.is_empty() {
                return Err(Error::Path(format!("empty attribute name in '{}'", path)));
            }
            steps.push(StepMatcher::attribute(attribute));
            continue;
        }

        let (name_part, predicates) = split_predicates(segment, path)?;
        let (prefix, local) = match name_part.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, name_part),
        };
        if local.is_empty() {
            return Err(Error::Path(format!("empty step name in '{}'", path)));
        }

        let namespace = match prefix {
            Some(prefix) => prefixes
                .get(prefix)
                .cloned()
                .ok_or_else(|| NamespaceResolutionError::new(prefix).with_path(path))?,
            None => String::new(),
        };

        steps.push(StepMatcher {
            axis: Axis::Child,
            namespace,
            name: if local == "*" {
                None
            } else {
                Some(local.to_string())
            },
            predicates,
            attribute: None,
        });
    }

    Ok(steps)
}

/// Split on `/` outside brackets and quotes. A leading `/` is optional
/// and carries no meaning of its own.
fn split_segments(path: &str) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (at, ch) in path.char_indices() {
        match ch {
            '"' | '\'' => {
                match quote {
                    Some(q) if q == ch => quote = None,
                    None => quote = Some(ch),
                    Some(_) => {}
                }
                current.push(ch);
            }
            '[' if quote.is_none() => {
                depth += 1;
                current.push(ch);
            }
            ']' if quote.is_none() => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::Path(format!("unbalanced ']' in '{}'", path)))?;
                current.push(ch);
            }
            '/' if quote.is_none() && depth == 0 => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                } else if at > 0 {
                    // TODO: support the descendant axis ("//name")
                    return Err(Error::Path(format!("empty segment in '{}'", path)));
                }
            }
            _ => current.push(ch),
        }
    }

    if quote.is_some() {
        return Err(Error::Path(format!("unterminated quote in '{}'", path)));
    }
    if depth != 0 {
        return Err(Error::Path(format!("unbalanced '[' in '{}'", path)));
    }
    if !current.is_empty() {
        segments.push(current);
    }

    Ok(segments)
}

/// Split a segment like `DataNode[@GraphId="abc123"][@CenterX>1]` into
/// its name part and parsed predicates.
fn split_predicates<'a>(segment: &'a str, path: &str) -> Result<(&'a str, Vec<Predicate>)> {
    let open = match segment.find('[') {
        Some(open) => open,
        None => return Ok((segment, Vec::new())),
    };

    let name_part = &segment[..open];
    let mut predicates = Vec::new();
    let mut rest = &segment[open..];

    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(Error::Path(format!(
                "unexpected text after predicate in '{}'",
                path
            )));
        }
        let close = find_closing_bracket(rest)
            .ok_or_else(|| Error::Path(format!("unbalanced '[' in '{}'", path)))?;
        predicates.push(parse_predicate(&rest[1..close], path)?);
        rest = &rest[close + 1..];
    }

    Ok((name_part, predicates))
}

fn find_closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in s.char_indices() {
        match ch {
            '"' | '\'' => match quote {
                Some(q) if q == ch => quote = None,
                None => quote = Some(ch),
                Some(_) => {}
            },
            ']' if quote.is_none() => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse the inside of one bracket pair: `@Name op value`
fn parse_predicate(inner: &str, path: &str) -> Result<Predicate> {
    let inner = inner.trim();
    let body = inner.strip_prefix('@').ok_or_else(|| {
        Error::Path(format!(
            "predicate '[{}]' in '{}' must compare an attribute",
            inner, path
        ))
    })?;

    // Two-character operators first so "<=" is not read as "<".
    let (op_at, op_len) = body
        .find("!=")
        .map(|i| (i, 2))
        .or_else(|| body.find("<=").map(|i| (i, 2)))
        .or_else(|| body.find(">=").map(|i| (i, 2)))
        .or_else(|| body.find('=').map(|i| (i, 1)))
        .or_else(|| body.find('<').map(|i| (i, 1)))
        .or_else(|| body.find('>').map(|i| (i, 1)))
        .ok_or_else(|| {
            Error::Path(format!(
                "predicate '[{}]' in '{}' has no comparison operator",
                inner, path
            ))
        })?;

    let left = body[..op_at].trim();
    let op = CompareOp::parse(&body[op_at..op_at + op_len]).ok_or_else(|| {
        Error::Path(format!("bad operator in predicate '[{}]' in '{}'", inner, path))
    })?;
    let right = parse_operand(body[op_at + op_len..].trim(), inner, path)?;

    if left.is_empty() {
        return Err(Error::Path(format!(
            "predicate '[{}]' in '{}' has no attribute name",
            inner, path
        )));
    }

    Ok(Predicate {
        left: left.to_string(),
        op,
        right,
    })
}

fn parse_operand(raw: &str, inner: &str, path: &str) -> Result<PredicateValue> {
    if raw.is_empty() {
        return Err(Error::Path(format!(
            "predicate '[{}]' in '{}' has no right-hand side",
            inner, path
        )));
    }

    for quote in ['"', '\''] {
        if let Some(body) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Ok(PredicateValue::Text(body.to_string()));
        }
    }

    match raw.parse::<f64>() {
        Ok(number) => Ok(PredicateValue::Number(number)),
        Err(_) => Ok(PredicateValue::Text(raw.to_string())),
    }
}
