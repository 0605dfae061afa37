//! Value literals: bracketed lists, quoted strings and handles.

use crate::error::{Result, TraceError};
use crate::registry::Registry;
use crate::trace::HandleKind;

use super::patterns::number;

pub const IGNORED: &str = "<IGNORED>";

/// Split `[a, b, [c, d], {e=1, f=2}, "g, h"]` into its top-level elements.
///
/// Nesting of `[]` and `{}` is tracked and double-quoted runs are opaque. `[]` is empty.
pub fn split_list(line_no: usize, text: &str) -> Result<Vec<&str>> {
    let text = text.trim();
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| TraceError::grammar(line_no, format!("expected a list, got {text:?}")))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '[' | '{' if !quoted => depth += 1,
            ']' | '}' if !quoted => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    TraceError::grammar(line_no, format!("unbalanced list {text:?}"))
                })?;
            }
            ',' if !quoted && depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if quoted || depth != 0 {
        return Err(TraceError::grammar(line_no, format!("unbalanced list {text:?}")));
    }
    items.push(inner[start..].trim());
    Ok(items)
}

/// Strip the surrounding double quotes. The content is taken verbatim.
pub fn parse_string(line_no: usize, text: &str) -> Result<String> {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| TraceError::grammar(line_no, format!("expected a quoted string, got {text:?}")))
}

/// Parse a handle written as `9`, `9 (MPI_INT)` or `MPI_INT`.
pub fn parse_handle(
    registry: &Registry,
    kind: HandleKind,
    line_no: usize,
    text: &str,
) -> Result<i32> {
    let text = text.trim();
    if let Some((id, annotation)) = text.split_once(' ') {
        let id: i32 = number(line_no, id)?;
        let name = annotation
            .trim()
            .strip_prefix('(')
            .and_then(|a| a.strip_suffix(')'))
            .ok_or_else(|| {
                TraceError::grammar(line_no, format!("bad handle annotation {annotation:?}"))
            })?;
        return match registry.handle_id(kind, name) {
            Some(known) if known != id => Err(TraceError::grammar(
                line_no,
                format!("handle {id} annotated as {name}, which is {known}"),
            )),
            _ => Ok(id),
        };
    }
    if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        return number(line_no, text);
    }
    registry.handle_id(kind, text).ok_or_else(|| {
        TraceError::grammar(
            line_no,
            format!("{text:?} is not a predefined {} name", kind.token()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_flat_and_nested() {
        assert_eq!(split_list(1, "[1, 2, 3]").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(split_list(1, "[]").unwrap(), Vec::<&str>::new());
        assert_eq!(
            split_list(1, "[[0, 3, 1], [4, 7, 1]]").unwrap(),
            vec!["[0, 3, 1]", "[4, 7, 1]"]
        );
        assert_eq!(
            split_list(1, r#"["a, b", "c"]"#).unwrap(),
            vec![r#""a, b""#, r#""c""#]
        );
        assert_eq!(
            split_list(1, "[{bytes=1, cancelled=0}, {bytes=2, cancelled=0}]").unwrap(),
            vec!["{bytes=1, cancelled=0}", "{bytes=2, cancelled=0}"]
        );
    }

    #[test]
    fn test_split_rejects_malformed() {
        assert!(split_list(7, "1, 2").is_err());
        assert!(matches!(
            split_list(7, "[[1, 2]"),
            Err(TraceError::GrammarMismatch { line: 7, .. })
        ));
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse_string(1, r#""hello world""#).unwrap(), "hello world");
        assert_eq!(parse_string(1, r#""""#).unwrap(), "");
        assert!(parse_string(1, "bare").is_err());
        assert!(parse_string(1, r#"""#).is_err());
    }

    #[test]
    fn test_handles() {
        let registry = Registry::new().unwrap();
        let dt = HandleKind::Datatype;
        assert_eq!(parse_handle(&registry, dt, 1, "9 (MPI_INT)").unwrap(), 9);
        assert_eq!(parse_handle(&registry, dt, 1, "MPI_DOUBLE").unwrap(), 14);
        assert_eq!(parse_handle(&registry, dt, 1, "1234").unwrap(), 1234);
        assert_eq!(parse_handle(&registry, HandleKind::Request, 1, "-1").unwrap(), -1);
        assert!(parse_handle(&registry, dt, 1, "9 (MPI_DOUBLE)").is_err());
        assert!(parse_handle(&registry, dt, 1, "MPI_QUATERNION").is_err());
    }
}
