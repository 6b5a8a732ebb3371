//! # Read-Only Problem View
//!
//! The minimal view of a 0/1 problem that the certificate engine consumes:
//! a row- and column-indexed constraint matrix with optional side bounds,
//! row flags conveying which sides are finite, and the variable name table.
//! Coefficients are exact rationals; the engine's scale table makes every
//! number it emits integral.

use num_traits::Zero;
use thiserror::Error;

/// Exact coefficient type used throughout the problem view
pub type Rational = num_rational::Rational64;

/// Errors from constructing a problem view
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    /// A sparse vector was given differing numbers of indices and values
    #[error("sparse vector has {indices} indices but {values} values")]
    LengthMismatch {
        /// Number of indices given
        indices: usize,
        /// Number of values given
        values: usize,
    },
    /// Sparse indices must be strictly increasing
    #[error("sparse indices not strictly increasing at position {0}")]
    UnsortedIndices(usize),
    /// Rows, flags, and sides of a matrix must all have the same length
    #[error("matrix has {rows} rows but {given} entries of {what}")]
    RowCountMismatch {
        /// Number of rows
        rows: usize,
        /// Number of entries of the mismatching sequence
        given: usize,
        /// Which per-row sequence mismatches
        what: &'static str,
    },
    /// A row refers to a column outside the matrix
    #[error("column index {col} out of bounds for {n_cols} columns")]
    ColumnOutOfBounds {
        /// The offending column index
        col: usize,
        /// The number of columns of the matrix
        n_cols: usize,
    },
}

/// Flags conveying which sides of a row are infinite
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowFlags {
    /// The left-hand side of the row is minus infinity
    pub lhs_inf: bool,
    /// The right-hand side of the row is plus infinity
    pub rhs_inf: bool,
}

/// A sparse vector sorted by index
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseVec {
    indices: Vec<usize>,
    values: Vec<Rational>,
}

impl SparseVec {
    /// Creates a sparse vector from parallel index and value sequences
    ///
    /// # Errors
    ///
    /// If the sequences differ in length or the indices are not strictly
    /// increasing.
    pub fn new(indices: Vec<usize>, values: Vec<Rational>) -> Result<Self, ProblemError> {
        if indices.len() != values.len() {
            return Err(ProblemError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if let Some(pos) = indices.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ProblemError::UnsortedIndices(pos + 1));
        }
        Ok(SparseVec { indices, values })
    }

    /// Gets the number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Checks whether the vector stores no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Gets the sorted index sequence
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Gets the value sequence, parallel to [`SparseVec::indices`]
    #[must_use]
    pub fn values(&self) -> &[Rational] {
        &self.values
    }

    /// Iterates over (index, value) pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, Rational)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Gets the first nonzero value, if any
    #[must_use]
    pub fn first_nonzero(&self) -> Option<Rational> {
        self.values.iter().copied().find(|v| !v.is_zero())
    }

    /// Gets the value stored at a given index, if any
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<Rational> {
        self.indices
            .binary_search(&index)
            .ok()
            .map(|pos| self.values[pos])
    }
}

/// A row- and column-indexed constraint matrix with side bounds
///
/// The column-major storage is derived at construction; rows are the
/// authoritative data. Bound values of infinite sides (per [`RowFlags`]) are
/// ignored by all consumers.
#[derive(Clone, Debug)]
pub struct ConstraintMatrix {
    rows: Vec<SparseVec>,
    cols: Vec<SparseVec>,
    flags: Vec<RowFlags>,
    lhs: Vec<Rational>,
    rhs: Vec<Rational>,
}

impl ConstraintMatrix {
    /// Creates a matrix from rows, per-row flags, and side bounds
    ///
    /// # Errors
    ///
    /// If the per-row sequences differ in length or a row refers to a column
    /// `>= n_cols`.
    pub fn new(
        rows: Vec<SparseVec>,
        flags: Vec<RowFlags>,
        lhs: Vec<Rational>,
        rhs: Vec<Rational>,
        n_cols: usize,
    ) -> Result<Self, ProblemError> {
        for (given, what) in [
            (flags.len(), "row flags"),
            (lhs.len(), "left-hand sides"),
            (rhs.len(), "right-hand sides"),
        ] {
            if given != rows.len() {
                return Err(ProblemError::RowCountMismatch {
                    rows: rows.len(),
                    given,
                    what,
                });
            }
        }
        let mut cols = vec![SparseVec::default(); n_cols];
        for (row_idx, row) in rows.iter().enumerate() {
            for (col, val) in row.iter() {
                if col >= n_cols {
                    return Err(ProblemError::ColumnOutOfBounds { col, n_cols });
                }
                cols[col].indices.push(row_idx);
                cols[col].values.push(val);
            }
        }
        Ok(ConstraintMatrix {
            rows,
            cols,
            flags,
            lhs,
            rhs,
        })
    }

    /// Gets the number of rows
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Gets the number of columns
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    /// Gets the coefficients of a row
    #[must_use]
    pub fn row(&self, row: usize) -> &SparseVec {
        &self.rows[row]
    }

    /// Gets the coefficients of a column, indexed by row
    #[must_use]
    pub fn col(&self, col: usize) -> &SparseVec {
        &self.cols[col]
    }

    /// Gets the flags of a row
    #[must_use]
    pub fn row_flags(&self, row: usize) -> RowFlags {
        self.flags[row]
    }

    /// Gets the left-hand side bound of a row
    #[must_use]
    pub fn lhs(&self, row: usize) -> Rational {
        self.lhs[row]
    }

    /// Gets the right-hand side bound of a row
    #[must_use]
    pub fn rhs(&self, row: usize) -> Rational {
        self.rhs[row]
    }
}

/// A named 0/1 problem the certificate engine tracks
#[derive(Clone, Debug)]
pub struct Problem {
    name: String,
    matrix: ConstraintMatrix,
    var_names: Vec<String>,
}

impl Problem {
    /// Creates a problem view
    ///
    /// `var_names` is the name table of the *original* problem; handlers
    /// translate current column indices through a column remap before
    /// indexing into it, so it may be larger than the current matrix.
    #[must_use]
    pub fn new(name: String, matrix: ConstraintMatrix, var_names: Vec<String>) -> Self {
        Problem {
            name,
            matrix,
            var_names,
        }
    }

    /// Gets the problem name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the constraint matrix
    #[must_use]
    pub fn matrix(&self) -> &ConstraintMatrix {
        &self.matrix
    }

    /// Gets the original variable name table
    #[must_use]
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Gets the number of rows of the current matrix
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.matrix.n_rows()
    }
}
