//! Positional-intersection algorithms used by [`crate::eval`] to evaluate proximity
//! phrase queries.
//!
//! Both routines take the *effective* distance `k = user_distance + 1` (word-distance,
//! not edit-distance) and an `ordered` flag requiring later query terms to occur at
//! non-decreasing positions.

use std::collections::{HashMap, HashSet};

type Postings = HashMap<String, Vec<usize>>;

/// Two-term positional intersection.
///
/// Iterates the candidate documents (those present in both posting maps, scanning the
/// smaller map to cut work) and, for each, looks for a qualifying `(p, q)` position pair:
/// `|p - q| <= k` and `p != q`, with `q >= p` additionally required when `ordered`.
pub(crate) fn two_term_intersect(
    p1: &Postings,
    p2: &Postings,
    k: usize,
    ordered: bool,
) -> HashSet<String> {
    let mut result = HashSet::new();

    let candidates: Vec<&String> = if p1.len() <= p2.len() {
        p1.keys().filter(|doc_id| p2.contains_key(*doc_id)).collect()
    } else {
        p2.keys().filter(|doc_id| p1.contains_key(*doc_id)).collect()
    };

    for doc_id in candidates {
        let positions1 = &p1[doc_id];
        let positions2 = &p2[doc_id];

        'positions: for &pp1 in positions1 {
            for &pp2 in positions2 {
                if ordered && pp2 < pp1 {
                    continue;
                }

                let dis = pp1.abs_diff(pp2);
                if dis <= k && dis != 0 {
                    result.insert(doc_id.clone());
                    break 'positions;
                } else if pp2 > pp1 {
                    // positions2 is ascending: distance only grows from here.
                    break;
                }
            }
        }
    }

    result
}

/// Multi-term (3+) positional intersection.
///
/// Maintains a working set of position ranges `(lo, hi)` per candidate document,
/// seeded from qualifying `(T1, T2)` pairs for a single `T1` position at a time, then
/// threaded through each subsequent term. A document qualifies as soon as some `T1`
/// position yields a non-empty final working set.
///
/// The `span = new_hi - new_lo - 1 - index` correction (`index` being the 0-based
/// position of the current term within `postings[2..]`) is load-bearing: it is what
/// converts the accumulated span back into word-distance among the matched tokens, and
/// reproducing it exactly (rather than a "cleaner" equivalent) is required to match
/// observed outputs for overlapping seed positions.
pub(crate) fn multi_term_intersect(
    postings: &[&Postings],
    k: usize,
    ordered: bool,
) -> HashSet<String> {
    let mut result = HashSet::new();
    let candidates = multi_term_candidates(postings);

    'doc: for doc_id in candidates {
        let positions1 = &postings[0][doc_id];
        let positions2 = &postings[1][doc_id];

        for &pp1 in positions1 {
            let mut ranges: Vec<(usize, usize)> = Vec::new();

            for &pp2 in positions2 {
                if ordered && pp2 < pp1 {
                    continue;
                }

                let dis = pp1.abs_diff(pp2);
                if dis <= k && dis != 0 {
                    ranges.push((pp1.min(pp2), pp1.max(pp2)));
                } else if pp2 > pp1 {
                    break;
                }
            }

            for (index, extra) in postings[2..].iter().enumerate() {
                let positions_k = &extra[doc_id];
                let mut next_ranges = Vec::new();

                for &(lo, hi) in &ranges {
                    for &pp_k in positions_k {
                        if ordered && pp_k < hi {
                            continue;
                        }

                        let new_lo = lo.min(pp_k);
                        let new_hi = hi.max(pp_k);
                        let span = (new_hi - new_lo) as isize - 1 - index as isize;

                        if span > 0 && span <= k as isize {
                            next_ranges.push((new_lo, new_hi));
                        } else if pp_k > hi {
                            break;
                        }
                    }
                }

                ranges = next_ranges;
            }

            if !ranges.is_empty() {
                result.insert(doc_id.clone());
                continue 'doc;
            }
        }
    }

    result
}

fn multi_term_candidates<'p>(postings: &[&'p Postings]) -> Vec<&'p String> {
    let smallest = postings
        .iter()
        .min_by_key(|p| p.len())
        .expect("multi-term intersect requires at least one posting map");

    smallest
        .keys()
        .filter(|doc_id| postings.iter().all(|p| p.contains_key(*doc_id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postings(entries: &[(&str, &[usize])]) -> Postings {
        entries
            .iter()
            .map(|(doc, positions)| (doc.to_string(), positions.to_vec()))
            .collect()
    }

    #[test]
    fn two_term_matches_within_effective_distance() {
        let p1 = postings(&[("a", &[0])]);
        let p2 = postings(&[("a", &[1])]);

        assert_eq!(
            two_term_intersect(&p1, &p2, 1, false),
            ["a".to_string()].into_iter().collect()
        );
    }

    #[test]
    fn two_term_rejects_same_position() {
        let p1 = postings(&[("a", &[2])]);
        let p2 = postings(&[("a", &[2])]);

        assert!(two_term_intersect(&p1, &p2, 5, false).is_empty());
    }

    #[test]
    fn two_term_ordered_requires_non_decreasing_positions() {
        let p1 = postings(&[("a", &[3])]);
        let p2 = postings(&[("a", &[1])]);

        assert!(two_term_intersect(&p1, &p2, 5, true).is_empty());
        assert!(!two_term_intersect(&p2, &p1, 5, true).is_empty());
    }

    #[test]
    fn multi_term_we_like_cake_at_distance_one() {
        // doc "we like cake": we=0, like=1, cake=2
        let we_matching = postings(&[("matching", &[0]), ("other", &[5])]);
        let like_matching = postings(&[("matching", &[1]), ("other", &[1, 6])]);
        let cake_matching = postings(&[("matching", &[2]), ("other", &[2, 9])]);

        let result = multi_term_intersect(
            &[&we_matching, &like_matching, &cake_matching],
            2,
            false,
        );

        assert_eq!(result, ["matching".to_string()].into_iter().collect());
    }
}
