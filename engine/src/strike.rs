//! Strike rotation.

/// Whether the batsmen change ends after a delivery.
///
/// An odd number of runs run swaps strike, and so does the end of an over.
/// The two compose by XOR: a single off the last ball of an over leaves the
/// same batsman on strike for the next over.
pub fn strike_swaps(runs_run: u32, over_complete: bool) -> bool {
    (runs_run % 2 == 1) ^ over_complete
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_table() {
        let table = [
            // (runs, over end, swapped)
            (0, false, false),
            (1, false, true),
            (2, false, false),
            (3, false, true),
            (4, false, false),
            (5, false, true),
            (6, false, false),
            (0, true, true),
            (1, true, false),
            (2, true, true),
            (3, true, false),
            (4, true, true),
            (5, true, false),
            (6, true, true),
        ];

        for (runs, over_end, expected) in table {
            assert_eq!(
                strike_swaps(runs, over_end),
                expected,
                "runs={} over_end={}",
                runs,
                over_end
            );
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_over_end_flips_result(runs in 0u32..100) {
                prop_assert_ne!(strike_swaps(runs, false), strike_swaps(runs, true));
            }

            #[test]
            fn prop_parity_decides_mid_over(runs in 0u32..100) {
                prop_assert_eq!(strike_swaps(runs, false), runs % 2 == 1);
            }
        }
    }
}
