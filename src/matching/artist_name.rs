//! Artist-credit splitting.
//!
//! Source APIs hand back free-text artist credits ("Metro Boomin, Future",
//! "Drake feat. 21 Savage") that need to be broken into individual act
//! names before image lookup. Splitting naively on commas and ampersands
//! fragments acts whose registered name contains a separator, so known
//! multi-word acts are protected by a static exclusion list and a
//! "<Name>, The <Suffix>" heuristic.

/// Act names that contain separator characters and must never be split.
/// Checked case-insensitively, including when embedded in a larger credit.
const MULTI_ARTIST_EXCEPTIONS: &[&str] = &[
    "Tyler, The Creator",
    "Earth, Wind & Fire",
    "Crosby, Stills, Nash & Young",
    "Crosby, Stills & Nash",
    "Emerson, Lake & Palmer",
    "Blood, Sweat & Tears",
    "Simon & Garfunkel",
    "Hall & Oates",
    "Daryl Hall & John Oates",
    "Kool & The Gang",
    "Bob Marley & The Wailers",
    "Derek & The Dominos",
    "Huey Lewis & The News",
    "Ike & Tina Turner",
    "Brooks & Dunn",
    "Mumford & Sons",
    "She & Him",
    "Angus & Julia Stone",
];

/// Featuring markers treated as separators when they stand alone as words.
/// Longest first so "featuring" is not consumed as "feat".
const FEATURING_MARKERS: &[&str] = &["featuring", "feat.", "feat", "ft.", "ft", "with"];

/// Split a free-text artist credit into individual act names.
///
/// Returns names in first-seen order, original casing preserved,
/// case-insensitive duplicates removed.
pub fn split_artist_credit(credit: &str) -> Vec<String> {
    let credit = credit.trim();
    if credit.is_empty() {
        return Vec::new();
    }

    let mut names = Vec::new();
    collect_names(credit, &mut names);

    // Dedupe case-insensitively, keeping first occurrence
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for name in names {
        let key = name.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(name);
        }
    }
    out
}

fn collect_names(segment: &str, out: &mut Vec<String>) {
    let segment = clean_piece(segment);
    if segment.is_empty() {
        return;
    }

    // Whole-segment protections first
    if is_exception(&segment) || is_act_with_the_suffix(&segment) {
        out.push(segment);
        return;
    }

    // Protect exceptions embedded in a larger credit, e.g.
    // "Tyler, The Creator & Kali Uchis"
    if let Some((start, end)) = find_embedded_exception(&segment) {
        collect_names(&segment[..start], out);
        out.push(segment[start..end].to_string());
        collect_names(&segment[end..], out);
        return;
    }

    for piece in split_on_separators(&segment) {
        let piece = clean_piece(&piece);
        if !piece.is_empty() {
            out.push(piece);
        }
    }
}

fn is_exception(name: &str) -> bool {
    MULTI_ARTIST_EXCEPTIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(name))
}

/// "<Name>, The <Suffix>" is a single act even when not in the exclusion
/// list, provided the comma is the only separator in the credit.
fn is_act_with_the_suffix(name: &str) -> bool {
    let mut parts = name.splitn(2, ',');
    let head = parts.next().unwrap_or("").trim();
    let tail = match parts.next() {
        Some(t) => t.trim_start(),
        None => return false,
    };

    if head.is_empty() || tail.contains(',') || tail.contains('&') || head.contains('&') {
        return false;
    }

    let lower = tail.to_ascii_lowercase();
    lower.starts_with("the ") && tail.len() > 4
}

/// Earliest (longest on ties) exclusion-list occurrence bounded by
/// non-name characters. Byte offsets are valid for slicing because the
/// exclusion list is pure ASCII and scanning happens on an
/// ASCII-lowercased copy of the same length.
fn find_embedded_exception(segment: &str) -> Option<(usize, usize)> {
    let lower = segment.to_ascii_lowercase();
    let mut best: Option<(usize, usize)> = None;

    for exception in MULTI_ARTIST_EXCEPTIONS {
        let needle = exception.to_ascii_lowercase();
        let mut from = 0;
        while let Some(pos) = lower[from..].find(&needle) {
            let start = from + pos;
            let end = start + needle.len();
            if boundary_before(&lower, start) && boundary_after(&lower, end) {
                best = match best {
                    None => Some((start, end)),
                    Some((bs, be)) => {
                        if start < bs || (start == bs && end > be) {
                            Some((start, end))
                        } else {
                            Some((bs, be))
                        }
                    }
                };
                break;
            }
            from = end;
        }
    }
    best
}

fn boundary_before(s: &str, idx: usize) -> bool {
    idx == 0
        || s[..idx]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true)
}

fn boundary_after(s: &str, idx: usize) -> bool {
    idx >= s.len()
        || s[idx..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true)
}

/// Split on commas, ampersands, and standalone featuring markers
fn split_on_separators(segment: &str) -> Vec<String> {
    let lower = segment.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut cut = vec![false; bytes.len()];

    for (i, b) in bytes.iter().enumerate() {
        if *b == b',' || *b == b'&' {
            cut[i] = true;
        }
    }

    for marker in FEATURING_MARKERS {
        let mut from = 0;
        while let Some(pos) = lower[from..].find(marker) {
            let start = from + pos;
            let end = start + marker.len();
            let before_ok = start == 0 || matches!(bytes[start - 1], b' ' | b'(');
            let after_ok = end >= bytes.len() || matches!(bytes[end], b' ' | b')');
            if before_ok && after_ok && !cut[start] {
                for flag in &mut cut[start..end] {
                    *flag = true;
                }
            }
            from = end;
        }
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for (i, ch) in segment.char_indices() {
        if ch.is_ascii() && cut[i] {
            if !current.trim().is_empty() {
                pieces.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        } else {
            current.push(ch);
        }
    }
    if !current.trim().is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Trim whitespace and stray credit punctuation around one name
fn clean_piece(piece: &str) -> String {
    piece
        .trim()
        .trim_matches(|c: char| matches!(c, '(' | ')' | '[' | ']'))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_artist_passes_through() {
        assert_eq!(split_artist_credit("Drake"), vec!["Drake"]);
    }

    #[test]
    fn test_empty_credit() {
        assert!(split_artist_credit("").is_empty());
        assert!(split_artist_credit("   ").is_empty());
    }

    #[test]
    fn test_comma_split() {
        assert_eq!(
            split_artist_credit("Metro Boomin, Future"),
            vec!["Metro Boomin", "Future"]
        );
    }

    #[test]
    fn test_ampersand_split() {
        assert_eq!(
            split_artist_credit("Drake & Future"),
            vec!["Drake", "Future"]
        );
    }

    #[test]
    fn test_featuring_split() {
        assert_eq!(
            split_artist_credit("Drake feat. 21 Savage"),
            vec!["Drake", "21 Savage"]
        );
        assert_eq!(
            split_artist_credit("Drake ft. Rihanna"),
            vec!["Drake", "Rihanna"]
        );
        assert_eq!(
            split_artist_credit("Calvin Harris featuring Frank Ocean"),
            vec!["Calvin Harris", "Frank Ocean"]
        );
    }

    #[test]
    fn test_parenthesised_featuring() {
        assert_eq!(
            split_artist_credit("DJ Khaled (feat. Justin Bieber)"),
            vec!["DJ Khaled", "Justin Bieber"]
        );
    }

    #[test]
    fn test_exception_never_fragments() {
        assert_eq!(
            split_artist_credit("Earth, Wind & Fire"),
            vec!["Earth, Wind & Fire"]
        );
        assert_eq!(
            split_artist_credit("Tyler, The Creator"),
            vec!["Tyler, The Creator"]
        );
        assert_eq!(
            split_artist_credit("crosby, stills, nash & young"),
            vec!["crosby, stills, nash & young"]
        );
    }

    #[test]
    fn test_embedded_exception_protected() {
        assert_eq!(
            split_artist_credit("Tyler, The Creator & Kali Uchis"),
            vec!["Tyler, The Creator", "Kali Uchis"]
        );
        assert_eq!(
            split_artist_credit("Kendrick Lamar, Earth, Wind & Fire"),
            vec!["Kendrick Lamar", "Earth, Wind & Fire"]
        );
    }

    #[test]
    fn test_name_the_suffix_heuristic() {
        // Not on the exclusion list, still one act
        assert_eq!(
            split_artist_credit("Ezra, The Sound"),
            vec!["Ezra, The Sound"]
        );
    }

    #[test]
    fn test_the_suffix_heuristic_yields_to_other_separators() {
        assert_eq!(
            split_artist_credit("Ezra, The Sound & Foo"),
            vec!["Ezra", "The Sound", "Foo"]
        );
    }

    #[test]
    fn test_marker_not_cut_inside_words() {
        // "ft" inside "Swift" and "feat" inside "Defeater" are not separators
        assert_eq!(split_artist_credit("Taylor Swift"), vec!["Taylor Swift"]);
        assert_eq!(split_artist_credit("Defeater"), vec!["Defeater"]);
    }

    #[test]
    fn test_dedupe_preserves_first_casing() {
        assert_eq!(
            split_artist_credit("Drake, drake & DRAKE"),
            vec!["Drake"]
        );
    }

    #[test]
    fn test_mixed_credit() {
        assert_eq!(
            split_artist_credit("Metro Boomin, Future feat. Chris Brown"),
            vec!["Metro Boomin", "Future", "Chris Brown"]
        );
    }

    #[test]
    fn test_unicode_names_survive() {
        assert_eq!(
            split_artist_credit("Beyoncé & Jay-Z"),
            vec!["Beyoncé", "Jay-Z"]
        );
        assert_eq!(split_artist_credit("Sigur Rós"), vec!["Sigur Rós"]);
    }
}
