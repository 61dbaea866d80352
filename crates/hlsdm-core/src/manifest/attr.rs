//! Attribute-list parsing for `#EXT-X-...:` tags.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `NAME=value` or `NAME="quoted, value"`, separated by commas.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|,)\s*([A-Za-z0-9-]+)=("[^"]*"|[^,]*)"#).expect("attribute regex")
});

/// Parses the attribute list following a tag's `:` into upper-cased names and
/// unquoted values. Later duplicates win.
pub(crate) fn parse_attributes(list: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(list)
        .map(|c| {
            let name = c[1].to_ascii_uppercase();
            let raw = c[2].trim();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            (name, value.to_string())
        })
        .collect()
}

/// Attribute list of `line` if it starts with `tag` (case-insensitive), e.g.
/// `tag_attributes("#EXT-X-KEY:METHOD=AES-128", "#EXT-X-KEY")`.
pub(crate) fn tag_attributes(line: &str, tag: &str) -> Option<HashMap<String, String>> {
    let head = line.get(..tag.len())?;
    if !head.eq_ignore_ascii_case(tag) {
        return None;
    }
    let rest = &line[tag.len()..];
    let list = rest.strip_prefix(':')?;
    Some(parse_attributes(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_values_keep_commas() {
        let attrs = parse_attributes(r#"BANDWIDTH=800000,CODECS="avc1.4d401f,mp4a.40.2",RESOLUTION=640x360"#);
        assert_eq!(attrs["BANDWIDTH"], "800000");
        assert_eq!(attrs["CODECS"], "avc1.4d401f,mp4a.40.2");
        assert_eq!(attrs["RESOLUTION"], "640x360");
    }

    #[test]
    fn average_bandwidth_is_distinct() {
        let attrs = parse_attributes("AVERAGE-BANDWIDTH=500000,BANDWIDTH=900000");
        assert_eq!(attrs["BANDWIDTH"], "900000");
        assert_eq!(attrs["AVERAGE-BANDWIDTH"], "500000");
    }

    #[test]
    fn tag_prefix_must_match() {
        assert!(tag_attributes("#EXT-X-KEY:METHOD=NONE", "#EXT-X-KEY").is_some());
        assert!(tag_attributes("#ext-x-key:METHOD=NONE", "#EXT-X-KEY").is_some());
        assert!(tag_attributes("#EXT-X-KEYS:METHOD=NONE", "#EXT-X-KEY").is_none());
        assert!(tag_attributes("#EXTINF:10,", "#EXT-X-KEY").is_none());
    }
}
