// Frame-sequence alignment between the ground-truth frames and the frames
// decoded from the ROI-encoded video.
//
// The policy is a heuristic for encoder warm-up / muxing offsets: when the
// ground truth is longer, its HEAD is dropped (the candidate is assumed to
// start late); when the candidate is longer, its TAIL is truncated. It is
// not a synchronization algorithm and cannot recover from frames dropped
// mid-sequence.

/// Two equal-length sequences ready for one-to-one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned<T> {
    pub gt: Vec<T>,
    pub candidate: Vec<T>,
}

/// Reconcile a length mismatch between the two sequences.
pub fn align<T>(mut gt: Vec<T>, mut candidate: Vec<T>) -> Aligned<T> {
    let lg = gt.len();
    let lc = candidate.len();

    if lg > lc {
        tracing::warn!(
            "Frame count mismatch: gt={}, candidate={}; dropping first {} gt frames",
            lg,
            lc,
            lg - lc
        );
        gt.drain(..lg - lc);
    } else if lc > lg {
        tracing::warn!(
            "Candidate has {} more frames than gt; truncating candidate tail",
            lc - lg
        );
        candidate.truncate(lg);
    }

    Aligned { gt, candidate }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_lengths_pass_through() {
        let result = align(vec![1, 2, 3], vec![4, 5, 6]);
        assert_eq!(result.gt, vec![1, 2, 3]);
        assert_eq!(result.candidate, vec![4, 5, 6]);
    }

    #[test]
    fn test_longer_gt_drops_head() {
        let result = align(vec![1, 2, 3, 4, 5], vec![10, 11, 12]);
        assert_eq!(result.gt, vec![3, 4, 5]);
        assert_eq!(result.candidate, vec![10, 11, 12]);
    }

    #[test]
    fn test_longer_candidate_truncates_tail() {
        let result = align(vec![1, 2], vec![10, 11, 12, 13]);
        assert_eq!(result.gt, vec![1, 2]);
        assert_eq!(result.candidate, vec![10, 11]);
    }

    #[test]
    fn test_lengths_equal_min_for_all_combinations() {
        for lg in 0..6usize {
            for lc in 0..6usize {
                let gt: Vec<usize> = (0..lg).collect();
                let candidate: Vec<usize> = (100..100 + lc).collect();
                let result = align(gt, candidate);
                assert_eq!(result.gt.len(), lg.min(lc));
                assert_eq!(result.candidate.len(), lg.min(lc));
                // Surviving gt frames are the LAST min elements,
                // surviving candidate frames the FIRST min elements.
                let expected_gt: Vec<usize> = (lg.saturating_sub(lg.min(lc))..lg).collect();
                let expected_candidate: Vec<usize> =
                    (100..100 + lg.min(lc)).collect();
                assert_eq!(result.gt, expected_gt);
                assert_eq!(result.candidate, expected_candidate);
            }
        }
    }

    #[test]
    fn test_empty_sequences() {
        let result = align(Vec::<u8>::new(), vec![1, 2]);
        assert!(result.gt.is_empty());
        assert!(result.candidate.is_empty());
    }
}
