//! Deterministic leaderboard ordering shared by every storage backend.

use std::cmp::Ordering;

/// Aggregated answer totals of one user, either within a room or across rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// User the totals belong to.
    pub user_id: i64,
    /// Display name used as the final tie breaker.
    pub username: String,
    /// Sum of awarded points.
    pub score: i64,
    /// Number of correct answers.
    pub correct: i64,
    /// Number of answered questions.
    pub answered: i64,
}

/// Leaderboard ordering: score, then correct, then answered (all descending),
/// then username and user id ascending.
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.correct.cmp(&a.correct))
        .then_with(|| b.answered.cmp(&a.answered))
        .then_with(|| a.username.cmp(&b.username))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sort standings in leaderboard order and pair each with its 1-based position.
pub fn rank(mut standings: Vec<Standing>) -> Vec<(u32, Standing)> {
    standings.sort_by(compare);
    standings
        .into_iter()
        .enumerate()
        .map(|(idx, standing)| (idx as u32 + 1, standing))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(user_id: i64, username: &str, score: i64, correct: i64, answered: i64) -> Standing {
        Standing {
            user_id,
            username: username.to_string(),
            score,
            correct,
            answered,
        }
    }

    #[test]
    fn ties_fall_through_every_key() {
        let ranked = rank(vec![
            standing(1, "zed", 100, 1, 1),
            standing(2, "amy", 100, 1, 1),
            standing(3, "bob", 100, 2, 2),
            standing(4, "cat", 100, 1, 2),
            standing(5, "dan", 150, 0, 3),
        ]);
        let order: Vec<i64> = ranked.iter().map(|(_, s)| s.user_id).collect();
        assert_eq!(order, vec![5, 3, 4, 2, 1]);
        let positions: Vec<u32> = ranked.iter().map(|(pos, _)| *pos).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn ordering_ignores_input_order() {
        let a = vec![
            standing(1, "a", 10, 1, 1),
            standing(2, "b", 10, 1, 1),
            standing(3, "c", 30, 1, 1),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(rank(a), rank(b));
    }

    #[test]
    fn empty_input_yields_empty_board() {
        assert!(rank(Vec::new()).is_empty());
    }
}
