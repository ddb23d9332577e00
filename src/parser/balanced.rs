//! Bracket-depth scanning shared by the item scanner, the doc grammar and the
//! type linker.
//!
//! All delimiters are ASCII, so every offset returned here is a char boundary.

/// Advance past a double quoted string starting at `pos`.
///
/// Returns the offset just past the closing quote, or `Err(pos)` when the
/// string is never closed.
pub fn skip_string(bytes: &[u8], pos: usize) -> Result<usize, usize> {
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(pos)
}

/// Advance past a `//` or `/* */` comment starting at `pos`, if there is one.
pub fn skip_comment(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes.get(pos..pos + 2) {
        Some(b"//") => Some(
            bytes[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |n| pos + n),
        ),
        Some(b"/*") => Some(
            bytes[pos + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(bytes.len(), |n| pos + 2 + n + 2),
        ),
        _ => None,
    }
}

/// Scan from `pos` to the first top-level byte in `stops`, the first unmatched
/// closing bracket, or the end of the text.
///
/// Nested `()`, `[]`, `{}` groups and string literals are skipped whole, and
/// comments too when `comments` is set. Nesting is a counter, so any closer
/// ends the innermost group and depth is bounded only by the input.
pub fn scan_until(text: &str, pos: usize, stops: &[u8], comments: bool) -> Result<usize, usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if depth == 0 && stops.contains(&b) {
            return Ok(i);
        }
        match b {
            b'"' => i = skip_string(bytes, i)?,
            b'(' | b'[' | b'{' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' if depth == 0 => return Ok(i),
            b')' | b']' | b'}' => {
                depth -= 1;
                i += 1;
            }
            b'/' if comments => match skip_comment(bytes, i) {
                Some(end) => i = end,
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    Ok(i)
}

/// Skip the bracket group opened at `pos`, including its closer.
pub fn skip_group(text: &str, pos: usize, comments: bool) -> Result<usize, usize> {
    let end = scan_until(text, pos + 1, &[], comments)?;
    Ok((end + 1).min(text.len()))
}

/// Split `text` on a top-level separator, stopping at an unmatched closer.
///
/// Returns the pieces and the offset where splitting stopped.
pub fn split_top_level(text: &str, sep: u8) -> (Vec<&str>, usize) {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    loop {
        let end = scan_until(text, start, &[sep], false).unwrap_or(text.len());
        parts.push(&text[start..end]);
        if end < bytes.len() && bytes[end] == sep {
            start = end + 1;
        } else {
            return (parts, end);
        }
    }
}

/// End of the identifier `[A-Za-z_][A-Za-z0-9_]*` starting at `pos`.
pub fn identifier(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes.get(pos) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let len = bytes[pos..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    Some(pos + len)
}

/// Skip ASCII whitespace.
pub fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Skip spaces and tabs only.
pub fn skip_blanks(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
        pos += 1;
    }
    pos
}

/// Whether `word` sits at `pos` as a whole keyword.
pub fn keyword_at(bytes: &[u8], pos: usize, word: &str) -> bool {
    bytes[pos..].starts_with(word.as_bytes())
        && bytes
            .get(pos + word.len())
            .map_or(true, |b| !(b.is_ascii_alphanumeric() || *b == b'_'))
}
