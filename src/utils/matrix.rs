use std::borrow::Cow;

use sprs::CsMat;

use crate::error::{Result, VectorizerError};

/// Sparse row: (column, value), strictly increasing columns
pub type SparseRow = Vec<(usize, f64)>;

/// Build a CSR block from sparse rows.
/// Every row must be sorted by column with no duplicates and all columns
/// must be below `n_cols`.
pub fn csr_from_rows(rows: &[SparseRow], n_cols: usize) -> CsMat<f64> {
    let nnz = rows.iter().map(Vec::len).sum();
    let mut indptr = Vec::with_capacity(rows.len() + 1);
    let mut indices = Vec::with_capacity(nnz);
    let mut data = Vec::with_capacity(nnz);
    indptr.push(0);
    for row in rows {
        for &(col, val) in row {
            indices.push(col);
            data.push(val);
        }
        indptr.push(indices.len());
    }
    CsMat::new((rows.len(), n_cols), indptr, indices, data)
}

/// Borrow as CSR, converting CSC input
pub fn as_csr(mat: &CsMat<f64>) -> Cow<'_, CsMat<f64>> {
    if mat.is_csr() {
        Cow::Borrowed(mat)
    } else {
        Cow::Owned(mat.to_csr())
    }
}

/// Rows of a block as owned sparse rows
pub fn to_rows(mat: &CsMat<f64>) -> Vec<SparseRow> {
    as_csr(mat)
        .outer_iterator()
        .map(|row| row.iter().map(|(col, &val)| (col, val)).collect())
        .collect()
}

/// Fail unless the block has `expected` columns
#[inline]
pub fn check_cols(mat: &CsMat<f64>, expected: usize) -> Result<()> {
    if mat.cols() != expected {
        return Err(VectorizerError::InconsistentState {
            expected,
            actual: mat.cols(),
        });
    }
    Ok(())
}

/// Stack blocks vertically, in order.
/// No blocks gives a 0 x 0 matrix.
///
/// # Errors
/// `InconsistentState` when column counts differ.
pub fn vstack<'a, I>(blocks: I) -> Result<CsMat<f64>>
where
    I: IntoIterator<Item = &'a CsMat<f64>>,
{
    let blocks: Vec<Cow<'a, CsMat<f64>>> = blocks.into_iter().map(as_csr).collect();
    let Some(n_cols) = blocks.first().map(|b| b.cols()) else {
        return Ok(CsMat::new((0, 0), vec![0], Vec::new(), Vec::new()));
    };
    for block in &blocks {
        check_cols(block, n_cols)?;
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    Ok(sprs::vstack(&views))
}
