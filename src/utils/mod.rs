pub use fast_non_dominated_sort::{fast_non_dominated_sort, NonDominatedSortResults};

pub mod fast_non_dominated_sort;
