// Cleanup of degenerate whisper output.
//
// Long silences and noise can make the decoder loop on a word or a short
// phrase; collapse those before the text reaches the summarizer.

/// Collapse repeated words and short repeated phrases in a segment's text.
pub fn clean_repetitive_text(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return text.to_string();
    }

    let cleaned = collapse_repeated_words(&words);
    let cleaned = collapse_repeated_phrases(&cleaned);
    cleaned.join(" ")
}

/// Keep one instance of consecutively repeated words.
fn collapse_repeated_words<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(words.len());
    for &word in words {
        if out.last() != Some(&word) {
            out.push(word);
        }
    }
    out
}

/// Keep one instance of immediately repeated phrases of 2 to 5 words.
fn collapse_repeated_phrases<'a>(words: &[&'a str]) -> Vec<&'a str> {
    if words.len() < 4 {
        return words.to_vec();
    }

    let mut out = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        let mut collapsed = false;

        for phrase_len in 2..=std::cmp::min(5, (words.len() - i) / 2) {
            let phrase = &words[i..i + phrase_len];
            let next = &words[i + phrase_len..i + phrase_len * 2];

            if phrase == next {
                out.extend_from_slice(phrase);
                i += phrase_len * 2;
                // Skip any further copies of the same phrase.
                while i + phrase_len <= words.len() && &words[i..i + phrase_len] == phrase {
                    i += phrase_len;
                }
                collapsed = true;
                break;
            }
        }

        if !collapsed {
            out.push(words[i]);
            i += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        let text = "the quarterly numbers look good";
        assert_eq!(clean_repetitive_text(text), text);
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(clean_repetitive_text("ok ok"), "ok ok");
    }

    #[test]
    fn repeated_words_collapse() {
        assert_eq!(
            clean_repetitive_text("we we we should ship it"),
            "we should ship it"
        );
    }

    #[test]
    fn repeated_phrases_collapse() {
        assert_eq!(
            clean_repetitive_text("thank you thank you thank you very much"),
            "thank you very much"
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_repetitive_text(""), "");
    }
}
