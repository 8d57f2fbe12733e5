/// Whitespace delimiters used for data files: space and tab.
pub const FIELD_DELIMITERS: &str = " \t";

/// Split `line` into maximal runs of characters that are not in `delims`.
///
/// Delimiter runs are compressed: consecutive delimiters never produce an
/// empty field and neither do leading or trailing delimiters.  The end of
/// the line always terminates the word being read, so a trailing word is
/// never lost.  Returns the number of fields written to `fields`, which is
/// cleared first; 0 means the line is effectively empty.
///
/// ```
/// let mut fields = Vec::new();
/// assert_eq!(makehist::tokenize::split_fields("  a\tb  c ", " \t", &mut fields), 3);
/// assert_eq!(fields, ["a", "b", "c"]);
/// ```
pub fn split_fields<'a>(line: &'a str, delims: &str, fields: &mut Vec<&'a str>) -> usize {
    fields.clear();
    let mut start: Option<usize> = None;
    for (idx, ch) in line.char_indices() {
        let is_delim = delims.contains(ch);
        match (start, is_delim) {
            (Some(s), true) => {
                fields.push(&line[s..idx]);
                start = None;
            }
            (None, false) => start = Some(idx),
            _ => {}
        }
    }
    // end of line acts as a delimiter
    if let Some(s) = start {
        fields.push(&line[s..]);
    }
    fields.len()
}

/// Convenience wrapper around [split_fields] returning a fresh vector.
pub fn fields<'a>(line: &'a str, delims: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    split_fields(line, delims, &mut out);
    out
}
