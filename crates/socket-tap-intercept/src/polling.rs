//! Frame splitting for the polling-fallback surface.
//!
//! The polling transport batches several frames into one response body.
//! Two batching formats exist on the wire: length-prefixed (`<len>:<frame>`
//! repeated, lengths counting characters) and record-separated (frames
//! joined with U+001E). A body in neither format is a single frame.

/// Separator used by the record-separated batching format.
const RECORD_SEPARATOR: char = '\u{1e}';

/// Split a polling response body into individual frames.
///
/// A malformed or truncated batch yields the frames recovered up to that
/// point; it never panics and never falls back to per-character splitting.
#[must_use]
pub fn split_frames(body: &str) -> Vec<&str> {
    if body.is_empty() {
        return Vec::new();
    }
    if body.contains(RECORD_SEPARATOR) {
        return body
            .split(RECORD_SEPARATOR)
            .filter(|frame| !frame.is_empty())
            .collect();
    }
    split_length_prefixed(body).unwrap_or_else(|| vec![body])
}

/// Parse a length-prefixed batch. `None` if the body does not start with a
/// `<digits>:` prefix at all (it is then a single bare frame).
fn split_length_prefixed(body: &str) -> Option<Vec<&str>> {
    let mut rest = body;
    let mut frames = Vec::new();

    while !rest.is_empty() {
        let digits = leading_digit_count(rest);
        if digits == 0 || !rest[digits..].starts_with(':') {
            if frames.is_empty() {
                return None;
            }
            tracing::debug!(remainder = rest, "malformed frame length in polling batch");
            break;
        }
        let Ok(len) = rest[..digits].parse::<usize>() else {
            if frames.is_empty() {
                return None;
            }
            tracing::debug!(prefix = &rest[..digits], "oversized frame length in polling batch");
            break;
        };
        let payload = &rest[digits + 1..];
        let Some(end) = byte_len_of_chars(payload, len) else {
            if frames.is_empty() {
                return None;
            }
            tracing::debug!(declared = len, "truncated frame in polling batch");
            break;
        };
        if end > 0 {
            frames.push(&payload[..end]);
        }
        rest = &payload[end..];
    }

    Some(frames)
}

fn leading_digit_count(s: &str) -> usize {
    s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len()
}

/// Byte length of the first `n` characters of `s`, or `None` if `s` is
/// shorter than that. Frame lengths on the wire count characters.
fn byte_len_of_chars(s: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    let mut seen = 0;
    for (idx, c) in s.char_indices() {
        seen += 1;
        if seen == n {
            return Some(idx + c.len_utf8());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_separated_body_splits_on_separator() {
        let body = "42[\"a\"]\u{1e}42[\"b\"]\u{1e}2";
        assert_eq!(split_frames(body), vec!["42[\"a\"]", "42[\"b\"]", "2"]);
    }

    #[test]
    fn length_prefixed_body_splits_on_declared_lengths() {
        let body = "6:2probe9:42[\"x\",1]";
        assert_eq!(split_frames(body), vec!["2probe", "42[\"x\",1]"]);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // "é" is two bytes but one character.
        let body = "3:4éz2:40";
        assert_eq!(split_frames(body), vec!["4éz", "40"]);
    }

    #[test]
    fn bare_frame_is_returned_whole_never_per_character() {
        let body = "42[\"chat\",{\"msg\":\"hi\"}]";
        assert_eq!(split_frames(body), vec![body]);
    }

    #[test]
    fn truncated_batch_yields_recovered_frames() {
        assert_eq!(split_frames("3:abc999:xyz"), vec!["abc"]);
    }

    #[test]
    fn malformed_tail_stops_the_batch() {
        assert_eq!(split_frames("2:hi:::"), vec!["hi"]);
    }

    #[test]
    fn empty_body_yields_nothing() {
        assert!(split_frames("").is_empty());
    }

    #[test]
    fn zero_length_frames_are_skipped() {
        assert_eq!(split_frames("0:2:hi0:"), vec!["hi"]);
    }
}
