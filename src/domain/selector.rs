//! Selection algorithms: cyclic exchange matching and contest draws.
//!
//! Both functions are pure over an injected [`Rng`] so callers (and
//! tests) control the randomness source. The store transaction that
//! persists a selection lives in the persistence layer; nothing here
//! performs I/O.

use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

use super::UserId;
use crate::error::BotError;

/// Computes a cyclic derangement over the eligible registrants.
///
/// Applies a uniform shuffle, then pairs each shuffled participant with
/// the next one in shuffled order, wrapping the last back to the first.
/// The result is a single directed cycle covering all `n` participants:
/// every participant is exactly one santa and exactly one target, and
/// nobody is their own target. With `n == 2` the cycle degenerates to a
/// mutual pair, which is accepted.
///
/// The single-cycle structure (rather than independent random pairing)
/// is deliberate: a participant cannot infer that their own santa is the
/// person they give to unless `n == 2`.
///
/// # Errors
///
/// Returns [`BotError::InsufficientParticipants`] when fewer than two
/// registrants are eligible.
pub fn cyclic_pairing<R: Rng + ?Sized>(
    rng: &mut R,
    eligible: &[UserId],
) -> Result<Vec<(UserId, UserId)>, BotError> {
    if eligible.len() < 2 {
        return Err(BotError::InsufficientParticipants {
            count: eligible.len(),
        });
    }

    let mut order = eligible.to_vec();
    order.shuffle(rng);

    let edges = order
        .iter()
        .copied()
        .zip(order.iter().copied().cycle().skip(1))
        .collect();
    Ok(edges)
}

/// Requested winner count for a contest draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCount {
    /// Draw exactly this many winners (clamped to the eligible count).
    Exact(u32),
    /// Draw every remaining eligible registrant.
    All,
}

impl FromStr for DrawCount {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<i64>() {
            Ok(n) if n >= 1 => u32::try_from(n)
                .map(Self::Exact)
                .map_err(|_| BotError::InvalidCount(s.to_string())),
            _ => Err(BotError::InvalidCount(s.to_string())),
        }
    }
}

/// Samples contest winners uniformly and assigns cumulative ranks.
///
/// Shuffles the eligible registrants, clamps the requested count to the
/// eligible size, and assigns ranks `prev + 1 ..= prev + k` in shuffled
/// order. Rank is an arbitrary-but-fixed ordering among simultaneous
/// winners, not a relevance ranking. An empty eligible set yields an
/// empty result rather than an error.
///
/// Callers pass only not-yet-ranked registrants; winners of earlier
/// draws are never handed back in.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn draw_winners<R: Rng + ?Sized>(
    rng: &mut R,
    eligible: &[UserId],
    count: DrawCount,
    prev: i32,
) -> Vec<(i32, UserId)> {
    let mut order = eligible.to_vec();
    order.shuffle(rng);

    let k = match count {
        DrawCount::All => order.len(),
        DrawCount::Exact(n) => (n as usize).min(order.len()),
    };

    order
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(offset, user)| (prev + 1 + offset as i32, user))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn users(n: i64) -> Vec<UserId> {
        (1..=n).map(UserId::new).collect()
    }

    #[test]
    fn pairing_rejects_fewer_than_two() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(cyclic_pairing(&mut rng, &[]).is_err());
        assert!(cyclic_pairing(&mut rng, &users(1)).is_err());
    }

    #[test]
    fn pairing_has_no_self_matches() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let Ok(edges) = cyclic_pairing(&mut rng, &users(7)) else {
                panic!("pairing failed");
            };
            assert!(edges.iter().all(|(santa, target)| santa != target));
        }
    }

    #[test]
    fn pairing_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let participants = users(9);
        let Ok(edges) = cyclic_pairing(&mut rng, &participants) else {
            panic!("pairing failed");
        };
        assert_eq!(edges.len(), participants.len());

        let santas: HashSet<UserId> = edges.iter().map(|(santa, _)| *santa).collect();
        let targets: HashSet<UserId> = edges.iter().map(|(_, target)| *target).collect();
        let all: HashSet<UserId> = participants.iter().copied().collect();
        assert_eq!(santas, all);
        assert_eq!(targets, all);
    }

    #[test]
    fn three_participants_form_a_single_cycle() {
        // Walking the santa→target edges from any start must visit all
        // three participants before returning, never a 2+1 split.
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let participants = users(3);
            let Ok(edges) = cyclic_pairing(&mut rng, &participants) else {
                panic!("pairing failed");
            };
            let successor: HashMap<UserId, UserId> = edges.iter().copied().collect();

            let Some(start) = participants.first().copied() else {
                panic!("no participants");
            };
            let mut visited = HashSet::new();
            let mut current = start;
            loop {
                assert!(visited.insert(current), "revisited before cycle closed");
                let Some(next) = successor.get(&current) else {
                    panic!("participant without a target");
                };
                current = *next;
                if current == start {
                    break;
                }
            }
            assert_eq!(visited.len(), participants.len());
        }
    }

    #[test]
    fn two_participants_are_a_mutual_pair() {
        let mut rng = StdRng::seed_from_u64(11);
        let Ok(edges) = cyclic_pairing(&mut rng, &users(2)) else {
            panic!("pairing failed");
        };
        let successor: HashMap<UserId, UserId> = edges.iter().copied().collect();
        assert_eq!(successor.get(&UserId::new(1)), Some(&UserId::new(2)));
        assert_eq!(successor.get(&UserId::new(2)), Some(&UserId::new(1)));
    }

    #[test]
    fn pairing_is_deterministic_under_a_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let Ok(first) = cyclic_pairing(&mut a, &users(6)) else {
            panic!("pairing failed");
        };
        let Ok(second) = cyclic_pairing(&mut b, &users(6)) else {
            panic!("pairing failed");
        };
        assert_eq!(first, second);
    }

    #[test]
    fn draw_count_parses_numbers_and_all() {
        assert_eq!("3".parse::<DrawCount>().ok(), Some(DrawCount::Exact(3)));
        assert_eq!("ALL".parse::<DrawCount>().ok(), Some(DrawCount::All));
        assert_eq!(" all ".parse::<DrawCount>().ok(), Some(DrawCount::All));
        assert!("0".parse::<DrawCount>().is_err());
        assert!("-2".parse::<DrawCount>().is_err());
        assert!("many".parse::<DrawCount>().is_err());
    }

    #[test]
    fn draw_assigns_sequential_ranks_after_prev() {
        let mut rng = StdRng::seed_from_u64(5);
        let winners = draw_winners(&mut rng, &users(5), DrawCount::Exact(3), 2);
        let ranks: Vec<i32> = winners.iter().map(|(rank, _)| *rank).collect();
        assert_eq!(ranks, vec![3, 4, 5]);
    }

    #[test]
    fn draw_clamps_to_eligible_count() {
        let mut rng = StdRng::seed_from_u64(6);
        let winners = draw_winners(&mut rng, &users(2), DrawCount::Exact(10), 0);
        assert_eq!(winners.len(), 2);
    }

    #[test]
    fn draw_all_takes_everyone() {
        let mut rng = StdRng::seed_from_u64(7);
        let winners = draw_winners(&mut rng, &users(4), DrawCount::All, 0);
        let drawn: HashSet<UserId> = winners.iter().map(|(_, user)| *user).collect();
        assert_eq!(drawn.len(), 4);
    }

    #[test]
    fn draw_on_empty_eligible_is_empty_not_error() {
        let mut rng = StdRng::seed_from_u64(8);
        let winners = draw_winners(&mut rng, &[], DrawCount::All, 5);
        assert!(winners.is_empty());
    }

    #[test]
    fn draw_never_duplicates_a_winner() {
        let mut rng = StdRng::seed_from_u64(9);
        let winners = draw_winners(&mut rng, &users(8), DrawCount::Exact(8), 0);
        let distinct: HashSet<UserId> = winners.iter().map(|(_, user)| *user).collect();
        assert_eq!(distinct.len(), winners.len());
    }
}
