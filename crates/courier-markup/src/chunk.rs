//! Length-bounded segmentation of translated payloads.
//!
//! Greedy word-wrap: whitespace-delimited tokens are packed into segments of
//! at most `limit` characters, joined by single spaces. A token longer than
//! `limit` is hard-split into limit-sized pieces so the size invariant holds
//! for every segment, with the cut nudged so it never separates an escape
//! backslash from the character it escapes.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("segment limit must be positive")]
    InvalidLimit,
}

/// Split `payload` into ordered segments of at most `limit` characters.
///
/// Segments never start or end mid-word (except the pieces of a hard-split
/// over-long token). Joining the segments with single spaces reproduces the
/// payload up to whitespace normalization.
pub fn split(payload: &str, limit: usize) -> Result<Vec<String>, ChunkError> {
    if limit == 0 {
        return Err(ChunkError::InvalidLimit);
    }

    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize; // chars, not bytes

    for token in payload.split_whitespace() {
        let token_len = token.chars().count();

        if token_len > limit {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let tail = hard_split(token, limit, &mut segments);
            current_len = tail.chars().count();
            current = tail;
            continue;
        }

        let cost = if current.is_empty() {
            token_len
        } else {
            1 + token_len
        };

        if current_len + cost > limit {
            segments.push(std::mem::take(&mut current));
            current.push_str(token);
            current_len = token_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(token);
            current_len += cost;
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    Ok(segments)
}

/// Cut an over-long token into `limit`-sized pieces, pushing every full piece
/// and returning the trailing remainder (≤ `limit` chars) to seed the next
/// segment.
fn hard_split(token: &str, limit: usize, segments: &mut Vec<String>) -> String {
    let chars: Vec<char> = token.chars().collect();
    let mut start = 0;

    while chars.len() - start > limit {
        let mut end = start + limit;
        // An odd run of trailing backslashes means the cut would separate an
        // escape from its character — back the cut off by one.
        let trailing = chars[start..end]
            .iter()
            .rev()
            .take_while(|&&c| c == '\\')
            .count();
        if trailing % 2 == 1 && end - start > 1 {
            end -= 1;
        }
        segments.push(chars[start..end].iter().collect());
        start = end;
    }

    chars[start..].iter().collect()
}
