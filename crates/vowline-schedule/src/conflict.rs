/// An identified half-open interval `[start, end)` in minutes since
/// midnight. The id is whatever the caller keys events by.
#[derive(Debug, Clone, Copy)]
pub struct TimedSpan<I> {
    pub id: I,
    pub start: u16,
    pub end: u16,
}

impl<I> TimedSpan<I> {
    pub fn new(id: I, start: u16, end: u16) -> Self {
        Self { id, start, end }
    }
}

/// Whether two half-open intervals overlap. Touching endpoints
/// (one block ending exactly when the next starts) do not conflict.
pub fn overlaps(a_start: u16, a_end: u16, b_start: u16, b_end: u16) -> bool {
    a_start < b_end && b_start < a_end
}

/// All overlapping pairs of events, each unordered pair reported once,
/// in input order.
pub fn event_conflicts<I: Copy>(events: &[TimedSpan<I>]) -> Vec<(I, I)> {
    let mut pairs = Vec::new();
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            if overlaps(a.start, a.end, b.start, b.end) {
                pairs.push((a.id, b.id));
            }
        }
    }
    pairs
}

/// Events intruding into restricted windows, as (event, restriction) pairs.
pub fn restriction_conflicts<I: Copy, J: Copy>(
    events: &[TimedSpan<I>],
    restrictions: &[TimedSpan<J>],
) -> Vec<(I, J)> {
    let mut hits = Vec::new();
    for event in events {
        for restriction in restrictions {
            if overlaps(event.start, event.end, restriction.start, restriction.end) {
                hits.push((event.id, restriction.id));
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (360, 420, 400, 500),
            (400, 500, 360, 420),
            (0, 1440, 700, 701),
            (100, 200, 300, 400),
        ];
        for (a1, a2, b1, b2) in cases {
            assert_eq!(overlaps(a1, a2, b1, b2), overlaps(b1, b2, a1, a2));
        }
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        // Ceremony 14:00-15:00, photos 15:00-16:00.
        assert!(!overlaps(840, 900, 900, 960));
        assert!(!overlaps(900, 960, 840, 900));
    }

    #[test]
    fn containment_and_identity_conflict() {
        assert!(overlaps(600, 1200, 700, 800));
        assert!(overlaps(700, 800, 700, 800));
    }

    #[test]
    fn each_pair_reported_once() {
        // Three mutually overlapping blocks -> exactly three pairs.
        let events = vec![
            TimedSpan::new('a', 600, 720),
            TimedSpan::new('b', 660, 780),
            TimedSpan::new('c', 700, 710),
        ];
        let pairs = event_conflicts(&events);
        assert_eq!(pairs, vec![('a', 'b'), ('a', 'c'), ('b', 'c')]);
    }

    #[test]
    fn disjoint_events_produce_no_pairs() {
        let events = vec![
            TimedSpan::new(1u8, 360, 420),
            TimedSpan::new(2u8, 420, 480),
            TimedSpan::new(3u8, 500, 560),
        ];
        assert!(event_conflicts(&events).is_empty());
    }

    #[test]
    fn restriction_hits_pair_event_with_window() {
        // "Music must end by 22:00" modeled as a restricted 22:00-24:00 window.
        let events = vec![
            TimedSpan::new('d', 1200, 1380), // dancing 20:00-23:00
            TimedSpan::new('b', 600, 660),   // brunch, fine
        ];
        let restrictions = vec![TimedSpan::new('q', 1320, 1440)];
        assert_eq!(restriction_conflicts(&events, &restrictions), vec![('d', 'q')]);
    }
}
