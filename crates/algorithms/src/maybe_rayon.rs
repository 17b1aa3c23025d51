//! Row evaluation with or without rayon.
//!
//! With the `parallel` feature rows are evaluated on the rayon pool; without
//! it they run sequentially. Either way rows come back in index order, so
//! both builds produce identical surfaces.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluate `row_values` for every row in `0..rows` and concatenate the
/// results in row order.
pub(crate) fn collect_rows<F>(rows: usize, row_values: F) -> Vec<f64>
where
    F: Fn(usize) -> Vec<f64> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        (0..rows).into_par_iter().flat_map_iter(row_values).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..rows).flat_map(row_values).collect()
    }
}
