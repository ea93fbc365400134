// Rendering a summary as a bulleted list.
//
// Sentence splitting is the literal ". " delimiter, which misfires on
// abbreviations and decimals; it matches the summarizer's plain prose output
// well enough in practice.

/// Fragments at or below this many characters (after trimming) are dropped.
const MIN_FRAGMENT_CHARS: usize = 3;

const BULLET_MARKER: &str = "- ";

/// Split a summary into sentence fragments and render one bullet per line.
pub fn format_bullets(summary: &str) -> String {
    summary
        .split(". ")
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_FRAGMENT_CHARS)
        .map(|fragment| {
            // The split eats the period of every fragment but the last;
            // restore it so bullets read as sentences.
            if fragment.ends_with('.') {
                format!("{}{}", BULLET_MARKER, fragment)
            } else {
                format!("{}{}.", BULLET_MARKER, fragment)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_bullets_and_drops_short_fragments() {
        let bullets = format_bullets("Hello world. This is a test. Ok.");
        assert_eq!(bullets, "- Hello world.\n- This is a test.");
    }

    #[test]
    fn fragment_of_four_chars_survives() {
        let bullets = format_bullets("Done. We shipped the release.");
        assert_eq!(bullets, "- Done.\n- We shipped the release.");
    }

    #[test]
    fn empty_summary_yields_no_bullets() {
        assert_eq!(format_bullets(""), "");
    }

    #[test]
    fn whitespace_fragments_are_dropped() {
        assert_eq!(format_bullets("   .  . "), "");
    }

    #[test]
    fn single_sentence_becomes_one_bullet() {
        assert_eq!(
            format_bullets("The team agreed on the roadmap."),
            "- The team agreed on the roadmap."
        );
    }

    #[test]
    fn no_bullet_shorter_than_threshold() {
        let bullets = format_bullets("Hi. No. Yes. Maybe so. Ok then we are set.");
        for line in bullets.lines() {
            let fragment = line.trim_start_matches(BULLET_MARKER).trim_end_matches('.');
            assert!(fragment.chars().count() > MIN_FRAGMENT_CHARS);
        }
    }
}
