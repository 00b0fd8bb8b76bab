//! Link extraction from free-form message text.

/// Scheme prefixes that start a link.
const SCHEMES: [&str; 2] = ["http://", "https://"];

/// Trailing punctuation stripped from a link (ASCII and CJK sentence marks).
const TRAILING_PUNCT: &[char] = &[',', '.', ';', '!', '?', '，', '。', '；', '！', '？', '、'];

/// Candidates this short (in chars) or shorter are dropped.
const MIN_LINK_CHARS: usize = 8;

/// Extract links from `text`, skipping any that contain a blacklisted substring.
///
/// Returns a lazy iterator; links come out in reading order and are not
/// deduplicated.
pub fn extract_links<'a>(text: &'a str, blacklist: &'a [String]) -> Links<'a> {
    Links {
        lines: text.split('\n'),
        rest: "",
        blacklist,
    }
}

/// Iterator returned by [`extract_links`].
pub struct Links<'a> {
    lines: std::str::Split<'a, char>,
    rest: &'a str,
    blacklist: &'a [String],
}

impl<'a> Links<'a> {
    /// Next raw extent in the current line, advancing past it.
    fn next_extent(&mut self) -> Option<&'a str> {
        loop {
            let rest = self.rest;
            if let Some(start) = find_scheme(rest) {
                let tail = &rest[start..];
                let end = tail.find(is_link_terminator).unwrap_or(tail.len());
                self.rest = &tail[end..];
                return Some(&tail[..end]);
            }
            // Unicode-aware: also drops U+3000 and NBSP at line ends.
            self.rest = self.lines.next()?.trim();
        }
    }

    fn is_blacklisted(&self, link: &str) -> bool {
        let lower = link.to_lowercase();
        self.blacklist
            .iter()
            .any(|b| lower.contains(&b.to_lowercase()))
    }
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let extent = self.next_extent()?;
            let link = extent.trim_end_matches(TRAILING_PUNCT);
            if link.chars().count() <= MIN_LINK_CHARS || self.is_blacklisted(link) {
                continue;
            }
            return Some(link);
        }
    }
}

fn find_scheme(s: &str) -> Option<usize> {
    SCHEMES.iter().filter_map(|scheme| s.find(scheme)).min()
}

fn is_link_terminator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
