use crate::core::{Individual, MobgaError};
use crate::operators::{ParetoDominance, PreferredSolution};

/// Outputs of the non-dominated sort algorithm.
#[derive(Debug)]
pub struct NonDominatedSortResults {
    /// A vector containing sub-vectors. Each child vector represents a front (with the first
    /// being the non-dominated front with solutions of rank 1); each child vector contains the
    /// individuals belonging to that front.
    pub fronts: Vec<Vec<Individual>>,
    /// This is [`NonDominatedSortResults::fronts`], but the individuals are given as indexes
    /// instead of copies. Each index refers to the slice of individuals passed to
    /// [`fast_non_dominated_sort`].
    pub front_indexes: Vec<Vec<usize>>,
    /// Number of individuals that dominate a solution at a given slice index. When the counter is
    /// 0, the solution is non-dominated. This is `n_p` in the paper.
    pub domination_counter: Vec<usize>,
}

/// Non-dominated fast sorting from the NSGA2 paper (with complexity $O(M * N^2)$, where `M` is
/// the number of objectives and `N` the number of individuals).
///
/// This sorts solutions into fronts and ranks the individuals based on the number of solutions an
/// individual dominates. Solutions that are not dominated by any other individual belong to the
/// first front. The method also stores the rank on each individual; to retrieve it, use
/// [`Individual::rank`].
///
/// Implemented based on paragraph 3A in:
/// > K. Deb, A. Pratap, S. Agarwal and T. Meyarivan, "A fast and elitist multi-objective genetic
/// > algorithm: NSGA-II," in IEEE Transactions on Evolutionary Computation, vol. 6, no. 2, pp.
/// > 182-197, April 2002, doi: 10.1109/4235.996017.
///
/// # Arguments
///
/// * `individuals`: The individuals to sort by dominance.
/// * `first_front_only`: Return the first front only (i.e. containing only non-dominated
///   individuals). If you need only the Pareto front set this to true to avoid ranking the
///   remaining individuals.
///
/// returns: `Result<NonDominatedSortResults, MobgaError>`.
pub fn fast_non_dominated_sort(
    individuals: &mut [Individual],
    first_front_only: bool,
) -> Result<NonDominatedSortResults, MobgaError> {
    if individuals.len() < 2 {
        return Err(MobgaError::SurvivalOperator(
            "fast non-dominated sort".to_string(),
            format!(
                "At least 2 individuals are needed for sorting, but {} given",
                individuals.len()
            ),
        ));
    }

    // this set contains all the individuals being dominated by an individual `p`. This is `S_p`
    // in the paper
    let mut dominated_solutions: Vec<Vec<usize>> =
        individuals.iter().map(|_| Vec::new()).collect();
    // number of individuals that dominate `p`. When the counter is 0, `p` is non-dominated. This
    // is `n_p` in the paper
    let mut domination_counter: Vec<usize> = individuals.iter().map(|_| 0).collect();

    // the front of given rank containing non-dominated solutions
    let mut current_front: Vec<usize> = Vec::new();
    // the vector with all fronts of sorted ranks. The first item has rank 1 and subsequent
    // elements have increasing rank
    let mut all_fronts: Vec<Vec<usize>> = Vec::new();

    for pi in 0..individuals.len() {
        for qi in (pi + 1)..individuals.len() {
            match ParetoDominance::compare(
                &individuals[pi].objectives(),
                &individuals[qi].objectives(),
            ) {
                PreferredSolution::First => {
                    // `p` dominates `q` - add `q` to the set of solutions dominated by `p`
                    dominated_solutions[pi].push(qi);
                    domination_counter[qi] += 1;
                }
                PreferredSolution::Second => {
                    // `q` dominates `p`
                    dominated_solutions[qi].push(pi);
                    domination_counter[pi] += 1;
                }
                PreferredSolution::MutuallyPreferred => {
                    // skip this
                }
            }
        }
    }
    for pi in 0..individuals.len() {
        // the solution `p` is not dominated by any other and belongs to the first front
        if domination_counter[pi] == 0 {
            current_front.push(pi);
            individuals[pi].set_rank(1);
        }
    }

    // early return
    if first_front_only {
        let first_front = current_front
            .iter()
            .map(|idx| individuals[*idx].clone())
            .collect();
        return Ok(NonDominatedSortResults {
            fronts: vec![first_front],
            front_indexes: vec![current_front],
            domination_counter,
        });
    }
    all_fronts.push(current_front.clone());
    let e_domination_counter = domination_counter.clone();

    // collect the other fronts
    let mut rank = 1;
    loop {
        let mut next_front: Vec<usize> = Vec::new();
        // loop individuals in the current non-dominated front
        for pi in current_front.iter() {
            // loop solutions that are dominated by `p` in the current front
            for qi in dominated_solutions[*pi].iter() {
                // decrement the domination count for individual `q`
                domination_counter[*qi] -= 1;

                // if the counter is 0 then `q` is not dominated by any member of a subsequent
                // front and belongs to the next one
                if domination_counter[*qi] == 0 {
                    next_front.push(*qi);
                    individuals[*qi].set_rank(rank + 1);
                }
            }
        }
        rank += 1;

        // stop when all solutions have been ranked
        if next_front.is_empty() {
            break;
        }

        all_fronts.push(next_front.clone());
        current_front = next_front;
    }

    // map indexes to individuals
    let mut fronts: Vec<Vec<Individual>> = Vec::new();
    for front in &all_fronts {
        let mut sub_front: Vec<Individual> = Vec::new();
        for i in front {
            sub_front.push(individuals[*i].clone());
        }
        fronts.push(sub_front);
    }

    Ok(NonDominatedSortResults {
        fronts,
        front_indexes: all_fronts,
        domination_counter: e_domination_counter,
    })
}
