//! Whitespace-preserving segment encoding.
//!
//! The translate endpoint trims each segment, which would destroy leading
//! indentation and trailing spaces.  Before sending, runs of spaces and tabs
//! at either end of a segment are replaced by literal placeholder tokens
//! that the service passes through untouched; after the response arrives the
//! placeholders are turned back into whitespace.
//!
//! The encoded form is also the cache key, so encoding must be
//! deterministic.

use crate::entities::decode_entities;

pub const SPACE_PLACEHOLDER: &str = "<sp>";
pub const TAB_PLACEHOLDER: &str = "<tr>";

/// Entity-escape placeholder tokens that already occur in user text so the
/// response decoder restores them literally.
pub fn escape_placeholders(text: &str) -> String {
    text.replace(TAB_PLACEHOLDER, "&lt;tr&gt;")
        .replace(SPACE_PLACEHOLDER, "&lt;sp&gt;")
}

/// Encode one segment for the wire.  An empty segment becomes a single
/// space before encoding.
pub fn encode_segment(segment: &str) -> String {
    let segment = if segment.is_empty() { " " } else { segment };
    let is_pad = |c: char| c == ' ' || c == '\t';

    let body = segment.trim_matches(is_pad);
    let lead_len = segment.len() - segment.trim_start_matches(is_pad).len();
    let lead = &segment[..lead_len];
    // An all-whitespace segment is fully described by its leading run.
    let trail = if body.is_empty() {
        ""
    } else {
        &segment[segment.trim_end_matches(is_pad).len()..]
    };

    let mut out = String::with_capacity(segment.len() + 8);
    push_placeholders(&mut out, lead);
    out.push_str(body);
    push_placeholders(&mut out, trail);
    out
}

fn push_placeholders(out: &mut String, run: &str) {
    for c in run.chars() {
        out.push_str(if c == '\t' {
            TAB_PLACEHOLDER
        } else {
            SPACE_PLACEHOLDER
        });
    }
}

/// Decode a segment returned by the service: placeholders first, then
/// character entities (which also restores escaped literal placeholders).
pub fn decode_segment(segment: &str) -> String {
    let restored = segment
        .replace(TAB_PLACEHOLDER, "\t")
        .replace(SPACE_PLACEHOLDER, " ");
    decode_entities(&restored)
}
