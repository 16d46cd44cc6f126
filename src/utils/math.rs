use num::Float;

use crate::vectorizer::config::Norm;

/// Euclidean norm of the values of a sparse row
#[inline]
pub fn l2_norm<N>(row: &[(usize, N)]) -> N
where
    N: Float,
{
    row.iter().fold(N::zero(), |acc, &(_, v)| acc + v * v).sqrt()
}

/// Sum of absolute values of a sparse row
#[inline]
pub fn l1_norm<N>(row: &[(usize, N)]) -> N
where
    N: Float,
{
    row.iter().fold(N::zero(), |acc, &(_, v)| acc + v.abs())
}

/// Scale a sparse row to unit norm.
/// A zero row is left as it is.
pub fn normalize<N>(row: &mut [(usize, N)], norm: Norm)
where
    N: Float,
{
    let n = match norm {
        Norm::L1 => l1_norm(row),
        Norm::L2 => l2_norm(row),
    };
    if n > N::zero() {
        row.iter_mut().for_each(|(_, v)| *v = *v / n);
    }
}
