//! Schema-name extraction from a client handshake response.
//!
//! The handshake-response payload starts with 32 fixed bytes (capability
//! flags, max packet size, character set, reserved filler), then a
//! NUL-terminated username, a length-prefixed credential block, and zero or
//! more trailing NUL-terminated text fields. Which trailing field holds the
//! requested schema depends on the client's capability flags, and the
//! layout carries no length tag for the trailing region — so this scanner
//! is a documented best-effort heuristic, not a protocol guarantee. On any
//! ambiguity it returns `None`; it never guesses and never errors.

/// Auth-method names a client may send as a trailing field ahead of the
/// schema name. An exact match here is a tag to skip, not a schema.
const AUTH_PLUGIN_NAMES: [&[u8]; 3] = [
    b"mysql_native_password",
    b"caching_sha2_password",
    b"sha256_password",
];

/// Capability flags, max packet size, charset and reserved filler.
const FIXED_PREFIX_LEN: usize = 32;

/// Extract the requested schema name from a handshake-response payload.
///
/// Returns `None` for any payload that cannot be confidently parsed:
/// truncated frames, missing terminators, credential blocks running past
/// the end, or trailing fields that look like connection-attribute blobs.
pub fn extract_schema(payload: &[u8]) -> Option<String> {
    if payload.len() < FIXED_PREFIX_LEN {
        return None;
    }
    let mut pos = FIXED_PREFIX_LEN;

    // Username: NUL-terminated. A frame ending mid-username is unusable.
    let terminator = payload[pos..].iter().position(|&b| b == 0)?;
    pos += terminator + 1;

    // Credential block: one length byte, then that many bytes, no escaping.
    let credential_len = usize::from(*payload.get(pos)?);
    pos += 1 + credential_len;
    if pos > payload.len() {
        return None;
    }

    // Pre-auth-plugin clients stop here: no trailing fields, no schema.
    if pos == payload.len() {
        return None;
    }

    let (mut candidate, next) = take_field(payload, pos);

    // An auth-method tag can sit where the schema name would be; skip it
    // and look at the one field after it.
    if AUTH_PLUGIN_NAMES.contains(&candidate) {
        if next >= payload.len() {
            return None;
        }
        (candidate, _) = take_field(payload, next);
    }

    if candidate.is_empty() || looks_like_attribute_blob(candidate) {
        return None;
    }

    String::from_utf8(candidate.to_vec()).ok()
}

/// One trailing field: bytes up to the next NUL (or payload end), and the
/// position just past its terminator.
fn take_field(payload: &[u8], start: usize) -> (&[u8], usize) {
    match payload[start..].iter().position(|&b| b == 0) {
        Some(i) => (&payload[start..start + i], start + i + 1),
        None => (&payload[start..], payload.len()),
    }
}

/// Newer capability sets place a connection-attribute blob in the trailing
/// region; a length marker byte or an `_client_` attribute key gives it
/// away.
fn looks_like_attribute_blob(field: &[u8]) -> bool {
    field.contains(&0x0c) || field.windows(b"_client_".len()).any(|w| w == b"_client_")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a handshake-response payload from its variable parts.
    fn response(username: &[u8], credential: &[u8], trailing: &[&[u8]]) -> Vec<u8> {
        let mut payload = vec![0u8; FIXED_PREFIX_LEN];
        payload.extend_from_slice(username);
        payload.push(0);
        payload.push(credential.len() as u8);
        payload.extend_from_slice(credential);
        for field in trailing {
            payload.extend_from_slice(field);
            payload.push(0);
        }
        payload
    }

    #[test]
    fn test_payload_shorter_than_fixed_prefix() {
        assert_eq!(extract_schema(&[]), None);
        assert_eq!(extract_schema(&[0u8; 31]), None);
    }

    #[test]
    fn test_plain_schema_after_empty_credential() {
        let payload = response(b"root", b"", &[b"myapp_db"]);
        assert_eq!(extract_schema(&payload), Some("myapp_db".to_string()));
    }

    #[test]
    fn test_schema_with_credential_block() {
        let payload = response(b"svc", &[0xab; 20], &[b"orders"]);
        assert_eq!(extract_schema(&payload), Some("orders".to_string()));
    }

    #[test]
    fn test_auth_plugin_tag_is_skipped() {
        let payload = response(b"root", b"", &[b"mysql_native_password", b"myapp_db"]);
        assert_eq!(extract_schema(&payload), Some("myapp_db".to_string()));

        let payload = response(b"root", b"", &[b"caching_sha2_password", b"svc_a"]);
        assert_eq!(extract_schema(&payload), Some("svc_a".to_string()));
    }

    #[test]
    fn test_auth_plugin_tag_with_nothing_after() {
        let payload = response(b"root", b"", &[b"mysql_native_password"]);
        assert_eq!(extract_schema(&payload), None);
    }

    #[test]
    fn test_no_trailing_fields() {
        let payload = response(b"root", b"secret", &[]);
        assert_eq!(extract_schema(&payload), None);
    }

    #[test]
    fn test_username_missing_terminator() {
        let mut payload = vec![0u8; FIXED_PREFIX_LEN];
        payload.extend_from_slice(b"root");
        assert_eq!(extract_schema(&payload), None);
    }

    #[test]
    fn test_credential_block_overruns_frame() {
        let mut payload = vec![0u8; FIXED_PREFIX_LEN];
        payload.extend_from_slice(b"root");
        payload.push(0);
        payload.push(200); // promises more bytes than remain
        payload.extend_from_slice(&[1, 2, 3]);
        assert_eq!(extract_schema(&payload), None);
    }

    #[test]
    fn test_attribute_blob_is_rejected() {
        let payload = response(b"root", b"", &[b"\x0c_client_name\x08libmysql"]);
        assert_eq!(extract_schema(&payload), None);

        let payload = response(b"root", b"", &[b"x_client_version"]);
        assert_eq!(extract_schema(&payload), None);
    }

    #[test]
    fn test_non_utf8_candidate_is_rejected() {
        let payload = response(b"root", b"", &[&[0xff, 0xfe, 0xfd]]);
        assert_eq!(extract_schema(&payload), None);
    }

    #[test]
    fn test_unterminated_trailing_field() {
        // Trailing field without a NUL still counts, up to the frame end.
        let mut payload = response(b"root", b"", &[]);
        payload.extend_from_slice(b"orders");
        assert_eq!(extract_schema(&payload), Some("orders".to_string()));
    }
}
