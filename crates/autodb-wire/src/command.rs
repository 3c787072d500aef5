//! In-session command classification.
//!
//! Applied to every client-origin frame on the established relay path.
//! Pure and allocation-free until a match is found; this sits on the hot
//! path of the client→upstream copy. Classification never blocks
//! forwarding — the frame goes upstream unmodified whatever the result.

/// Terminators for the schema-name run after `USE `.
fn is_name_end(b: u8) -> bool {
    b == 0 || b == b';' || b == b' '
}

/// Return the target schema of a `USE <schema>` command frame, if any.
///
/// The command region is the frame payload. A match requires its first four
/// bytes to equal `USE ` case-insensitively, trailing space included; the
/// schema name is the byte run immediately after, up to the first NUL,
/// semicolon, or space (or end of frame). Anything else — including an
/// empty run or a non-UTF-8 name — yields `None`.
pub fn schema_from_command(payload: &[u8]) -> Option<String> {
    if payload.len() < 4 || !payload[..4].eq_ignore_ascii_case(b"USE ") {
        return None;
    }

    let rest = &payload[4..];
    let end = rest.iter().position(|&b| is_name_end(b)).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    String::from_utf8(rest[..end].to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_with_semicolon() {
        assert_eq!(schema_from_command(b"USE orders;"), Some("orders".to_string()));
    }

    #[test]
    fn test_use_lowercase_with_trailing_space() {
        assert_eq!(schema_from_command(b"use orders "), Some("orders".to_string()));
    }

    #[test]
    fn test_use_mixed_case_to_end_of_frame() {
        assert_eq!(schema_from_command(b"UsE svc_b"), Some("svc_b".to_string()));
    }

    #[test]
    fn test_use_with_nul_terminator() {
        assert_eq!(schema_from_command(b"USE svc_a\0garbage"), Some("svc_a".to_string()));
    }

    #[test]
    fn test_non_use_commands() {
        assert_eq!(schema_from_command(b"SELECT 1"), None);
        assert_eq!(schema_from_command(b"USEX orders"), None);
        // No trailing space after the keyword.
        assert_eq!(schema_from_command(b"USE"), None);
        assert_eq!(schema_from_command(b""), None);
    }

    #[test]
    fn test_use_with_empty_name() {
        assert_eq!(schema_from_command(b"USE ;"), None);
        assert_eq!(schema_from_command(b"USE  orders"), None);
    }
}
