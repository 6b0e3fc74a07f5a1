//! Property tests for the readiness tracker's claim bookkeeping.

use std::collections::BTreeSet;

use ar2simple_context::ReadinessTracker;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Ready(usize),
    Dispatch(usize),
    Complete(usize),
}

fn op(slots: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=slots + 2).prop_map(Op::Ready),
        (0..slots).prop_map(Op::Dispatch),
        (0..slots).prop_map(Op::Complete),
    ]
}

proptest! {
    #[test]
    fn claims_match_a_set_model(
        (slots, ops) in (1usize..130).prop_flat_map(|n| (Just(n), prop::collection::vec(op(n), 0..200)))
    ) {
        let tracker = ReadinessTracker::new(slots);
        let mut idle: BTreeSet<usize> = (0..slots).collect();
        let mut claimed: BTreeSet<usize> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Ready(max) => {
                    let available: Vec<usize> = idle.difference(&claimed).copied().collect();
                    if available.is_empty() {
                        // Would block forever; the model skips it.
                        continue;
                    }
                    let got = tracker.wait_ready(max).unwrap().into_vec();
                    let want: Vec<usize> = available.into_iter().take(max).collect();
                    prop_assert_eq!(&got, &want);
                    claimed.extend(got);
                }
                Op::Dispatch(i) => {
                    if !claimed.contains(&i) {
                        continue;
                    }
                    tracker.mark_busy(i).unwrap();
                    idle.remove(&i);
                    claimed.remove(&i);
                }
                Op::Complete(i) => {
                    if idle.contains(&i) {
                        continue;
                    }
                    tracker.mark_idle(i).unwrap();
                    idle.insert(i);
                }
            }
            prop_assert_eq!(tracker.idle_count(), idle.len());
        }
    }
}
