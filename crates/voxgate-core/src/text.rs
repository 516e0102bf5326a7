//! Text segmentation for streamed generation.
//!
//! Long input is cut into sentence-aligned segments so the first audio can be
//! delivered before the whole text has been rendered. Lengths are counted in
//! characters, not bytes.

/// Split `text` into ordered segments of at most `max_chars` characters.
///
/// Whitespace runs are collapsed first. Sentences (ending in `!`, `?`, or a
/// `.` followed by a space) are packed greedily; a sentence that is too long
/// on its own is word-wrapped. A single word longer than `max_chars` becomes
/// its own oversized segment rather than being cut.
///
/// Returns an empty vector when the input has no visible characters.
#[must_use]
pub fn segment_text(text: &str, max_chars: usize) -> Vec<String> {
    let normalized = collapse_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let max_chars = max_chars.max(1);
    if char_len(&normalized) <= max_chars {
        return vec![normalized];
    }

    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(&normalized) {
        let fits = if current.is_empty() {
            char_len(sentence) <= max_chars
        } else {
            char_len(&current) + 1 + char_len(sentence) <= max_chars
        };

        if fits {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
            continue;
        }

        flush(&mut segments, &mut current);

        if char_len(sentence) > max_chars {
            wrap_words(sentence, max_chars, &mut segments);
        } else {
            current.push_str(sentence);
        }
    }

    flush(&mut segments, &mut current);
    segments
}

/// Collapse all whitespace runs to single spaces and trim both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Internal helpers ───────────────────────────────────────────────

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn flush(segments: &mut Vec<String>, current: &mut String) {
    let segment = std::mem::take(current);
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
}

/// Split normalized text into sentence chunks, keeping terminal punctuation.
///
/// `!` and `?` always end a sentence (a run like `?!` stays together); `.`
/// only does when a space follows, so decimals and abbreviations glued to the
/// next token are left alone.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        let boundary = match ch {
            '!' | '?' => !matches!(next, Some('!' | '?' | '.')),
            '.' => next == Some(' '),
            _ => false,
        };

        if boundary {
            let end = idx + ch.len_utf8();
            let chunk = text[start..end].trim();
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        chunks.push(tail);
    }

    chunks
}

/// Greedy word wrap for a sentence that cannot fit in one segment.
fn wrap_words(sentence: &str, max_chars: usize, segments: &mut Vec<String>) {
    let mut line = String::new();

    for word in sentence.split(' ').filter(|w| !w.is_empty()) {
        if line.is_empty() {
            line.push_str(word);
        } else if char_len(&line) + 1 + char_len(word) <= max_chars {
            line.push(' ');
            line.push_str(word);
        } else {
            segments.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }

    flush(segments, &mut line);
}
