//! Section-preserving template regeneration.
//!
//! A generated file (the README) carries named, delimited regions:
//!
//! ```text
//! <!-- begin:header -->
//! ...scaffolding...
//! <!-- end:header -->
//! ```
//!
//! Before re-rendering, every complete `begin:NAME … end:NAME` span
//! (delimiters included) is replaced by an include directive for the section
//! partial named after NAME. Rendering the rewritten text regenerates the
//! scaffolding sections from the template library while everything outside
//! matched pairs passes through untouched. Malformed, unterminated, or
//! name-mismatched markers are left literally in place.
//!
//! Pairing is nearest-end: a begin marker closes at the first end marker
//! carrying the same name, so nested same-named sections are unsupported.

const BEGIN_PREFIX: &str = "<!-- begin:";
const END_PREFIX: &str = "<!-- end:";
const MARKER_SUFFIX: &str = " -->";

fn is_section_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse a marker name at the start of `text`, returning the name and the
/// byte length consumed including the closing ` -->`.
fn parse_marker_name(text: &str) -> Option<(&str, usize)> {
    let name_len = text.find(|c: char| !is_section_name_char(c))?;
    if name_len == 0 || !text[name_len..].starts_with(MARKER_SUFFIX) {
        return None;
    }
    Some((&text[..name_len], name_len + MARKER_SUFFIX.len()))
}

/// Path of the section partial regenerating the named section.
pub fn section_template(name: &str) -> String {
    format!("readme/section/{name}.md.j2")
}

/// Rewrite every complete marker pair into an include directive for its
/// section partial. Text with no complete pair is returned unchanged.
pub fn rewrite_sections(existing: &str) -> String {
    let mut output = String::with_capacity(existing.len());
    let mut rest = existing;

    while let Some(start) = rest.find(BEGIN_PREFIX) {
        let after_prefix = &rest[start + BEGIN_PREFIX.len()..];
        let Some((name, consumed)) = parse_marker_name(after_prefix) else {
            // Not a well-formed begin marker; emit it literally and move on.
            output.push_str(&rest[..start + BEGIN_PREFIX.len()]);
            rest = after_prefix;
            continue;
        };

        let end_marker = format!("{END_PREFIX}{name}{MARKER_SUFFIX}");
        let body = &after_prefix[consumed..];
        match body.find(&end_marker) {
            Some(end) => {
                output.push_str(&rest[..start]);
                output.push_str(&format!("{{% include \"{}\" %}}", section_template(name)));
                rest = &body[end + end_marker.len()..];
            }
            None => {
                // Unterminated or name-mismatched pair: the begin marker and
                // everything after it pass through unchanged.
                output.push_str(&rest[..start + BEGIN_PREFIX.len() + consumed]);
                rest = body;
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_pair_becomes_include_directive() {
        let input = "intro\n<!-- begin:header -->\nold scaffolding\n<!-- end:header -->\noutro";
        let rewritten = rewrite_sections(input);

        assert_eq!(
            rewritten,
            "intro\n{% include \"readme/section/header.md.j2\" %}\noutro"
        );
        assert!(!rewritten.contains("old scaffolding"));
    }

    #[test]
    fn multiple_sections_are_each_rewritten() {
        let input = "<!-- begin:badges -->x<!-- end:badges -->\nkeep me\n<!-- begin:usage -->y<!-- end:usage -->";
        let rewritten = rewrite_sections(input);

        assert_eq!(
            rewritten,
            "{% include \"readme/section/badges.md.j2\" %}\nkeep me\n{% include \"readme/section/usage.md.j2\" %}"
        );
    }

    #[test]
    fn zero_pairs_is_identity() {
        let input = "# Hand-written readme\n\nNothing generated here.\n";
        assert_eq!(rewrite_sections(input), input);
    }

    #[test]
    fn mismatched_names_pass_through() {
        let input = "<!-- begin:alpha -->content<!-- end:beta -->";
        assert_eq!(rewrite_sections(input), input);
    }

    #[test]
    fn unterminated_marker_passes_through() {
        let input = "<!-- begin:alpha -->dangling content";
        assert_eq!(rewrite_sections(input), input);
    }

    #[test]
    fn stray_end_marker_passes_through() {
        let input = "text<!-- end:alpha -->more";
        assert_eq!(rewrite_sections(input), input);
    }

    #[test]
    fn malformed_begin_marker_passes_through() {
        // Missing closing arrow and illegal name characters.
        let input = "<!-- begin:has space -->body<!-- end:has space -->";
        assert_eq!(rewrite_sections(input), input);
        let input = "<!-- begin:noclose body";
        assert_eq!(rewrite_sections(input), input);
    }

    #[test]
    fn pairing_is_nearest_end() {
        // The first end marker with the same name closes the span; the
        // trailing duplicate end marker stays literal.
        let input = "<!-- begin:a -->one<!-- end:a -->two<!-- end:a -->";
        assert_eq!(
            rewrite_sections(input),
            "{% include \"readme/section/a.md.j2\" %}two<!-- end:a -->"
        );
    }

    #[test]
    fn mismatched_pair_does_not_block_later_match() {
        let input = "<!-- begin:a -->x<!-- end:b --><!-- begin:c -->y<!-- end:c -->";
        let rewritten = rewrite_sections(input);
        assert!(rewritten.starts_with("<!-- begin:a -->x<!-- end:b -->"));
        assert!(rewritten.ends_with("{% include \"readme/section/c.md.j2\" %}"));
    }

    #[test]
    fn rewrite_is_deterministic() {
        let input = "<!-- begin:header -->h<!-- end:header -->";
        assert_eq!(rewrite_sections(input), rewrite_sections(input));
    }
}
