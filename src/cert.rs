//! # Certificate Dispatch
//!
//! [`Certificate`] is the capability the presolver holds: either the active
//! [`VeriPb`] engine or the null variant chosen when proof emission is
//! disabled. The null variant performs no I/O, no counter updates, and no
//! state changes, so presolve behaves identically with logging off.

use std::{io, path::PathBuf};

use crate::{
    problem::{Problem, Rational, RowFlags, SparseVec},
    types::ArgumentType,
};

pub mod veripb;

pub use veripb::VeriPb;

/// Derives the proof file path from a problem name
///
/// A trailing `.mps`, `.mps.gz`, or `.mps.bz2` suffix is replaced by `.pbp`;
/// any other name gets `.pbp` appended.
#[must_use]
pub fn proof_path(problem_name: &str) -> PathBuf {
    for suffix in [".mps.gz", ".mps.bz2", ".mps"] {
        if let Some(stem) = problem_name.strip_suffix(suffix) {
            return PathBuf::from(format!("{stem}.pbp"));
        }
    }
    PathBuf::from(format!("{problem_name}.pbp"))
}

/// A presolve certificate, active or disabled
///
/// Every transformation handler of [`VeriPb`] is mirrored here; the
/// `Disabled` variant accepts all notifications and does nothing.
#[derive(Debug)]
pub enum Certificate<W: io::Write> {
    /// Proof emission is active
    VeriPb(VeriPb<W>),
    /// Proof emission is disabled
    Disabled,
}

impl<W: io::Write> Certificate<W> {
    /// Creates an active certificate writing to the given sink
    #[must_use]
    pub fn with_proof(writer: W, problem: &Problem) -> Self {
        Certificate::VeriPb(VeriPb::new(writer, problem))
    }

    /// Creates a disabled certificate
    #[must_use]
    pub fn disabled() -> Self {
        Certificate::Disabled
    }

    /// See [`VeriPb::write_header`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn write_header(&mut self) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.write_header(),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::flush`]
    ///
    /// # Errors
    ///
    /// If flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.flush(),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_upper_bound`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_upper_bound(
        &mut self,
        val: Rational,
        name: &str,
        argument: ArgumentType,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.change_upper_bound(val, name, argument),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_lower_bound`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_lower_bound(
        &mut self,
        val: Rational,
        name: &str,
        argument: ArgumentType,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.change_lower_bound(val, name, argument),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::dominating_columns`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn dominating_columns(
        &mut self,
        dominating: usize,
        dominated: usize,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => {
                cert.dominating_columns(dominating, dominated, names, col_map)
            }
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_rhs`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_rhs(
        &mut self,
        row: usize,
        val: Rational,
        data: &SparseVec,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.change_rhs(row, val, data, names, col_map),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_lhs`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_lhs(
        &mut self,
        row: usize,
        val: Rational,
        data: &SparseVec,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.change_lhs(row, val, data, names, col_map),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_lhs_inf`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_lhs_inf(&mut self, row: usize) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.change_lhs_inf(row),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_rhs_inf`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_rhs_inf(&mut self, row: usize) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.change_rhs_inf(row),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_rhs_parallel_row`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_rhs_parallel_row(
        &mut self,
        row: usize,
        val: Rational,
        parallel_row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => {
                cert.change_rhs_parallel_row(row, val, parallel_row, problem)
            }
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::change_lhs_parallel_row`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn change_lhs_parallel_row(
        &mut self,
        row: usize,
        val: Rational,
        parallel_row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => {
                cert.change_lhs_parallel_row(row, val, parallel_row, problem)
            }
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::update_row`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    #[allow(clippy::too_many_arguments)]
    pub fn update_row(
        &mut self,
        row: usize,
        col: usize,
        new_val: Rational,
        data: &SparseVec,
        rflags: RowFlags,
        lhs: Rational,
        rhs: Rational,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => {
                cert.update_row(row, col, new_val, data, rflags, lhs, rhs, names, col_map)
            }
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::mark_row_redundant`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn mark_row_redundant(&mut self, row: usize) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.mark_row_redundant(row),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::sparsify`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn sparsify(
        &mut self,
        eq_row: usize,
        cand_row: usize,
        scale: Rational,
        problem: &Problem,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.sparsify(eq_row, cand_row, scale, problem),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::substitute_with_equality`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn substitute_with_equality(
        &mut self,
        col: usize,
        equality: &SparseVec,
        offset: Rational,
        problem: &Problem,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => {
                cert.substitute_with_equality(col, equality, offset, problem, names, col_map)
            }
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::substitute_with_row`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn substitute_with_row(
        &mut self,
        col: usize,
        row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.substitute_with_row(col, row, problem),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::log_solution`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn log_solution(&mut self, assignment: &[bool], names: &[String]) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.log_solution(assignment, names),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::compress`]
    ///
    /// # Errors
    ///
    /// If flushing the proof sink fails.
    pub fn compress(
        &mut self,
        row_mapping: &[Option<usize>],
        col_mapping: &[Option<usize>],
        full: bool,
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.compress(row_mapping, col_mapping, full),
            Certificate::Disabled => Ok(()),
        }
    }

    /// See [`VeriPb::log_problem_state`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn log_problem_state(
        &mut self,
        problem: &Problem,
        col_mapping: &[usize],
    ) -> io::Result<()> {
        match self {
            Certificate::VeriPb(cert) => cert.log_problem_state(problem, col_mapping),
            Certificate::Disabled => Ok(()),
        }
    }

    /// Recovers the proof sink from an active certificate
    #[must_use]
    pub fn into_writer(self) -> Option<W> {
        match self {
            Certificate::VeriPb(cert) => Some(cert.into_writer()),
            Certificate::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::proof_path;

    #[test]
    fn proof_path_strips_known_suffixes() {
        assert_eq!(proof_path("model.mps"), Path::new("model.pbp"));
        assert_eq!(proof_path("model.mps.gz"), Path::new("model.pbp"));
        assert_eq!(proof_path("model.mps.bz2"), Path::new("model.pbp"));
    }

    #[test]
    fn proof_path_appends_for_other_names() {
        assert_eq!(proof_path("model"), Path::new("model.pbp"));
        assert_eq!(proof_path("model.lp"), Path::new("model.lp.pbp"));
    }
}
