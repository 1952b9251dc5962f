use crate::core::ObjectivePair;

/// The preferred solution resulting from a Pareto-dominance comparison.
#[derive(Debug, PartialOrd, PartialEq)]
pub enum PreferredSolution {
    /// The first solution dominates the second.
    First,
    /// The second solution dominates the first.
    Second,
    /// Neither solution dominates the other.
    MutuallyPreferred,
}

/// Pareto dominance between two objective pairs where both objectives are minimised. A solution
/// $S_1$ dominates $S_2$ when it is no worse on every objective and strictly better on at least
/// one.
pub struct ParetoDominance;

impl ParetoDominance {
    /// Get the dominance relation between two objective pairs.
    ///
    /// # Arguments
    ///
    /// * `first`: The objective values of the first solution.
    /// * `second`: The objective values of the second solution.
    ///
    /// returns: `PreferredSolution`
    pub fn compare(first: &ObjectivePair, second: &ObjectivePair) -> PreferredSolution {
        let mut relation = PreferredSolution::MutuallyPreferred;
        for (value_1, value_2) in first.iter().zip(second) {
            if value_1 < value_2 {
                if relation == PreferredSolution::Second {
                    return PreferredSolution::MutuallyPreferred;
                }
                relation = PreferredSolution::First;
            } else if value_1 > value_2 {
                if relation == PreferredSolution::First {
                    return PreferredSolution::MutuallyPreferred;
                }
                relation = PreferredSolution::Second;
            }
        }
        relation
    }

    /// Whether the first objective pair dominates the second.
    ///
    /// # Arguments
    ///
    /// * `first`: The objective values of the first solution.
    /// * `second`: The objective values of the second solution.
    ///
    /// returns: `bool`
    pub fn dominates(first: &ObjectivePair, second: &ObjectivePair) -> bool {
        Self::compare(first, second) == PreferredSolution::First
    }
}

#[cfg(test)]
mod test {
    use crate::operators::{ParetoDominance, PreferredSolution};

    #[test]
    /// Strictly better on both objectives.
    fn test_dominance() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        assert_eq!(ParetoDominance::compare(&a, &b), PreferredSolution::First);
        assert_eq!(ParetoDominance::compare(&b, &a), PreferredSolution::Second);
    }

    #[test]
    /// Better on one objective with a tie on the other still dominates.
    fn test_dominance_with_tie() {
        let a = [1.0, 2.0];
        let b = [1.0, 4.0];
        assert!(ParetoDominance::dominates(&a, &b));
        assert!(!ParetoDominance::dominates(&b, &a));
    }

    #[test]
    /// Trade-offs and identical pairs are mutually preferred.
    fn test_mutually_preferred() {
        let a = [1.0, 4.0];
        let b = [3.0, 2.0];
        assert_eq!(
            ParetoDominance::compare(&a, &b),
            PreferredSolution::MutuallyPreferred
        );
        assert_eq!(
            ParetoDominance::compare(&a, &a),
            PreferredSolution::MutuallyPreferred
        );
    }

    #[test]
    /// Dominance is antisymmetric for every relation outcome.
    fn test_antisymmetry() {
        let pairs = [
            ([1.0, 2.0], [3.0, 4.0]),
            ([1.0, 4.0], [3.0, 2.0]),
            ([5.0, 5.0], [5.0, 5.0]),
            ([0.0, 9.0], [0.0, 8.0]),
        ];
        for (a, b) in pairs {
            assert!(!(ParetoDominance::dominates(&a, &b) && ParetoDominance::dominates(&b, &a)));
        }
    }
}
