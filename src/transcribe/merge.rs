// Speaker attribution by temporal overlap.
//
// Each transcript segment becomes exactly one utterance spanning the same
// interval; the speaker is taken from the diarization interval with the
// greatest overlap, and left unset when nothing overlaps.

use super::types::{TranscriptSegment, Utterance};
use crate::diarize::SpeakerInterval;

/// Attribute each segment to the best-overlapping speaker interval.
pub fn attribute_speakers(
    segments: Vec<TranscriptSegment>,
    intervals: &[SpeakerInterval],
) -> Vec<Utterance> {
    segments
        .into_iter()
        .map(|segment| {
            let speaker =
                best_overlapping_speaker(intervals, segment.start, segment.end).map(String::from);
            Utterance {
                speaker,
                start: segment.start,
                end: segment.end,
                text: segment.text,
            }
        })
        .collect()
}

/// Find the speaker whose interval overlaps the given span the most.
fn best_overlapping_speaker(
    intervals: &[SpeakerInterval],
    start: f64,
    end: f64,
) -> Option<&str> {
    intervals
        .iter()
        .filter_map(|interval| {
            let overlap_start = start.max(interval.start);
            let overlap_end = end.min(interval.end);
            let overlap = overlap_end - overlap_start;
            if overlap > 0.0 {
                Some((interval, overlap))
            } else {
                None
            }
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(interval, _)| interval.speaker.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    fn interval(start: f64, end: f64, speaker: &str) -> SpeakerInterval {
        SpeakerInterval {
            start,
            end,
            speaker: speaker.to_string(),
        }
    }

    #[test]
    fn one_interval_covers_all_segments() {
        let segments = vec![segment(0.0, 2.0, "hi"), segment(2.0, 4.0, "bye")];
        let intervals = vec![interval(0.0, 4.0, "A")];

        let utterances = attribute_speakers(segments, &intervals);
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].speaker.as_deref(), Some("A"));
        assert_eq!(utterances[1].speaker.as_deref(), Some("A"));
    }

    #[test]
    fn greatest_overlap_wins() {
        let segments = vec![segment(0.0, 3.0, "status update")];
        let intervals = vec![interval(0.0, 1.0, "A"), interval(1.0, 3.0, "B")];

        let utterances = attribute_speakers(segments, &intervals);
        assert_eq!(utterances[0].speaker.as_deref(), Some("B"));
    }

    #[test]
    fn no_overlap_leaves_speaker_unset() {
        let segments = vec![segment(10.0, 12.0, "late remark")];
        let intervals = vec![interval(0.0, 1.0, "A")];

        let utterances = attribute_speakers(segments, &intervals);
        assert_eq!(utterances[0].speaker, None);
    }

    #[test]
    fn touching_intervals_do_not_count_as_overlap() {
        let segments = vec![segment(2.0, 4.0, "hello")];
        let intervals = vec![interval(0.0, 2.0, "A")];

        let utterances = attribute_speakers(segments, &intervals);
        assert_eq!(utterances[0].speaker, None);
    }

    #[test]
    fn utterance_spans_match_their_segments() {
        let segments = vec![
            segment(0.0, 1.5, "first"),
            segment(1.5, 2.5, "second"),
            segment(3.0, 5.0, "third"),
        ];
        let intervals = vec![interval(0.0, 2.0, "A"), interval(2.0, 5.0, "B")];

        let spans: Vec<(f64, f64)> = segments.iter().map(|s| (s.start, s.end)).collect();
        let utterances = attribute_speakers(segments, &intervals);

        for utterance in &utterances {
            let containing = spans
                .iter()
                .filter(|(s, e)| utterance.start >= *s && utterance.end <= *e)
                .count();
            assert_eq!(containing, 1, "utterance span must sit in exactly one segment");
        }
    }

    #[test]
    fn empty_intervals_yield_unattributed_utterances() {
        let utterances = attribute_speakers(vec![segment(0.0, 1.0, "solo")], &[]);
        assert_eq!(utterances[0].speaker, None);
        assert_eq!(utterances[0].text, "solo");
    }
}
