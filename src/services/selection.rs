//! Reviewer eligibility and random selection.
//!
//! Candidates are fetched into memory and drawn with a PRNG, so the order
//! in which storage returns rows never decides who gets picked.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Reviewers assigned when a pull request is created.
pub const REVIEWERS_PER_PULL_REQUEST: usize = 2;

/// Active team members minus the exclusion set.
///
/// `active_members` must already be restricted to one team and to active
/// users; this only applies the exclusions and drops duplicates.
pub fn eligible(active_members: Vec<String>, exclusions: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    active_members
        .into_iter()
        .filter(|id| !exclusions.contains(id.as_str()))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Uniformly choose up to `count` distinct candidates.
pub fn choose_reviewers<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[String],
    count: usize,
) -> Vec<String> {
    candidates.choose_multiple(rng, count).cloned().collect()
}

/// Uniformly choose one candidate.
pub fn choose_replacement<R: Rng + ?Sized>(rng: &mut R, candidates: &[String]) -> Option<String> {
    candidates.choose(rng).cloned()
}

/// [`choose_reviewers`] with the thread-local generator.
pub fn pick_reviewers(candidates: &[String], count: usize) -> Vec<String> {
    choose_reviewers(&mut rand::thread_rng(), candidates, count)
}

/// [`choose_replacement`] with the thread-local generator.
pub fn pick_replacement(candidates: &[String]) -> Option<String> {
    choose_replacement(&mut rand::thread_rng(), candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_eligible_applies_exclusions() {
        let exclusions: HashSet<&str> = ["a", "c"].into_iter().collect();
        let result = eligible(ids(&["a", "b", "c", "d", "b"]), &exclusions);
        assert_eq!(result, ids(&["b", "d"]));
    }

    #[test]
    fn test_choose_reviewers_is_partial_when_short() {
        let mut rng = StdRng::seed_from_u64(7);

        assert!(choose_reviewers(&mut rng, &[], 2).is_empty());
        assert_eq!(choose_reviewers(&mut rng, &ids(&["x"]), 2), ids(&["x"]));

        let picked = choose_reviewers(&mut rng, &ids(&["x", "y", "z"]), 2);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
    }

    #[test]
    fn test_choose_replacement_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(choose_replacement(&mut rng, &[]), None);
    }

    #[test]
    fn test_selection_is_not_biased_to_first_candidate() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = ids(&["a", "b", "c"]);
        let mut counts: HashMap<String, usize> = HashMap::new();

        for _ in 0..3000 {
            let pick = choose_replacement(&mut rng, &candidates).unwrap();
            *counts.entry(pick).or_default() += 1;
        }

        for id in &candidates {
            let n = counts.get(id).copied().unwrap_or(0);
            assert!((800..=1200).contains(&n), "{} picked {} times", id, n);
        }
    }

    #[test]
    fn test_pairs_cover_all_members() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = ids(&["a", "b", "c", "d"]);
        let mut seen: HashMap<String, usize> = HashMap::new();

        for _ in 0..2000 {
            for id in choose_reviewers(&mut rng, &candidates, 2) {
                *seen.entry(id).or_default() += 1;
            }
        }

        // Each member should land in about half of the pairs
        for id in &candidates {
            let n = seen.get(id).copied().unwrap_or(0);
            assert!((800..=1200).contains(&n), "{} picked {} times", id, n);
        }
    }
}
