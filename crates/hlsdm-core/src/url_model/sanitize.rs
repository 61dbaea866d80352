//! Filesystem-safe file stems from free-form job titles.

/// Sanitizes a job title for use as a file stem.
///
/// - Replaces NUL, path separators, control characters and the characters
///   `: * ? " < > |` with `_`, one `_` per run
/// - Keeps spaces; other whitespace becomes a space, one per run
/// - Trims leading/trailing dots, spaces and underscores
/// - Limits length to 250 bytes so an extension still fits in NAME_MAX
pub fn sanitize_file_stem(title: &str) -> String {
    const STEM_MAX: usize = 250;

    let mut out = String::with_capacity(title.len());
    let mut prev: Option<char> = None;

    for c in title.chars() {
        let replacement = if c == '\0'
            || c == '/'
            || c == '\\'
            || c.is_control()
            || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|')
        {
            '_'
        } else if c.is_whitespace() {
            ' '
        } else {
            c
        };

        if matches!(replacement, '_' | ' ') && prev == Some(replacement) {
            continue;
        }
        out.push(replacement);
        prev = Some(replacement);
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.len() > STEM_MAX {
        let mut take = STEM_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
