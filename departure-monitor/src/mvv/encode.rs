//! Line filter encoding for the departure finder.
//!
//! The `lines` query parameter is the base64 of a query-string fragment:
//! `&line=<id>` repeated for each percent-encoded identifier, or the single
//! fragment `&line=all`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::domain::{LineId, SelectedLines};

const LINE_PREFIX: &str = "&line=";

/// Encode a line selection into the `lines` parameter.
///
/// # Examples
///
/// ```
/// use departure_monitor::domain::SelectedLines;
/// use departure_monitor::mvv::encode_lines;
///
/// assert_eq!(encode_lines(&SelectedLines::All), "JmxpbmU9YWxs");
/// ```
pub fn encode_lines(lines: &SelectedLines) -> String {
    let fragment = match lines {
        SelectedLines::All => format!("{LINE_PREFIX}all"),
        SelectedLines::Explicit(ids) => ids
            .iter()
            .map(|id| format!("{LINE_PREFIX}{}", encode_uri_component(id.as_str())))
            .collect(),
    };
    STANDARD.encode(fragment)
}

/// Decode a `lines` parameter back into a selection.
///
/// Returns `None` if the input is not valid base64 or not UTF-8.
pub fn decode_lines(encoded: &str) -> Option<SelectedLines> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let fragment = String::from_utf8(bytes).ok()?;

    let ids: Vec<String> = fragment
        .split('&')
        .filter_map(|part| part.strip_prefix("line="))
        .filter(|v| !v.is_empty())
        .map(decode_uri_component)
        .collect();

    if ids.len() == 1 && ids[0] == "all" {
        return Some(SelectedLines::All);
    }
    Some(SelectedLines::Explicit(
        ids.into_iter().map(LineId::new).collect(),
    ))
}

/// Bytes `encodeURIComponent` escapes: everything but ASCII alphanumerics
/// and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Inverse of [`encode_uri_component`]. Malformed escapes are kept literally.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_a_single_fragment() {
        let encoded = encode_lines(&SelectedLines::All);
        let raw = STANDARD.decode(&encoded).unwrap();
        assert_eq!(raw, b"&line=all");
    }

    #[test]
    fn colons_are_percent_encoded() {
        let lines = SelectedLines::Explicit(vec![
            LineId::new("swm:03134:G:H:015"),
            LineId::new("ddb:92M08:J:H:s25"),
        ]);
        let raw = STANDARD.decode(encode_lines(&lines)).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "&line=swm%3A03134%3AG%3AH%3A015&line=ddb%3A92M08%3AJ%3AH%3As25"
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let lines = SelectedLines::Explicit(vec![
            LineId::new("swm:03134:G:H:015"),
            LineId::new("mvv:1 2&3:B:R:x"),
        ]);
        assert_eq!(decode_lines(&encode_lines(&lines)), Some(lines));
        assert_eq!(
            decode_lines(&encode_lines(&SelectedLines::All)),
            Some(SelectedLines::All)
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_lines("not base64!").is_none());
    }

    #[test]
    fn encode_uri_component_matches_browser() {
        assert_eq!(encode_uri_component("a b"), "a%20b");
        assert_eq!(encode_uri_component("ü"), "%C3%BC");
        assert_eq!(encode_uri_component("A-z_0.9!~*'()"), "A-z_0.9!~*'()");
    }

    #[test]
    fn truncated_escape_is_literal() {
        assert_eq!(decode_uri_component("abc%4"), "abc%4");
        assert_eq!(decode_uri_component("%zz"), "%zz");
        assert_eq!(decode_uri_component("mvv%3A1%202"), "mvv:1 2");
    }
}
