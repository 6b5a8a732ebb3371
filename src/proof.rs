//! # Proof Line Emission
//!
//! [`Proof`] owns the proof sink and the monotonic constraint-ID counter and
//! knows how to write each kind of line of a version 1.0 pseudo-Boolean
//! proof. All emission goes through this type, so lines appear in the exact
//! order the certificate handlers produce them.

use std::{fmt, io};

use itertools::Itertools;

use crate::{
    ops::OperationSequence,
    types::{Axiom, ConstraintId, LinConstr, Substitution},
};

/// The proof stream of a presolve run
///
/// # Performance
///
/// For performance reasons, consider using a buffered writer (e.g.,
/// [`std::io::BufWriter`]).
#[derive(Debug)]
pub struct Proof<W: io::Write> {
    /// Where the proof is written to
    writer: W,
    /// The next free constraint ID
    next_id: u64,
}

impl<W: io::Write> Proof<W> {
    /// Initializes a proof with a given writer
    ///
    /// Nothing is written until [`Proof::header`] is called; IDs reserved
    /// before that are counted into the header's `f`-line.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Proof { writer, next_id: 1 }
    }

    /// Reserves the next free constraint ID and advances the counter
    #[must_use]
    pub(crate) fn new_id(&mut self) -> ConstraintId {
        let id = ConstraintId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Gets the next unused constraint ID in the proof
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Writes the proof header
    ///
    /// # Proof Log
    ///
    /// Writes the version line, one `*`-comment per element of `comments`,
    /// and the `f`-line binding all previously reserved IDs to the input
    /// formulation.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn header(&mut self, comments: &[&str]) -> io::Result<()> {
        writeln!(self.writer, "pseudo-Boolean proof version 1.0")?;
        for comment in comments {
            writeln!(self.writer, "* {comment}")?;
        }
        writeln!(self.writer, "f {}", self.next_id - 1)
    }

    /// Adds an arbitrary single-line comment to the proof
    ///
    /// **Note**: if the object displays as more than one line, an invalid
    /// proof line is produced
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn comment<C: fmt::Display>(&mut self, comment: &C) -> io::Result<()> {
        writeln!(self.writer, "* {comment}")
    }

    /// Adds a constraint implied by reverse unit propagation and returns its
    /// [`ConstraintId`]
    ///
    /// # Proof Log
    ///
    /// Adds a `rup`-rule line.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn reverse_unit_prop(&mut self, constr: &LinConstr) -> io::Result<ConstraintId> {
        writeln!(self.writer, "rup {constr} ;")?;
        Ok(self.new_id())
    }

    /// Adds a constraint that is redundant, checked via redundance based
    /// strengthening, and returns its [`ConstraintId`]
    ///
    /// # Proof Log
    ///
    /// Adds a `red`-rule line with the witness substitutions.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn redundant<'a, SI>(&mut self, constr: &LinConstr, witness: SI) -> io::Result<ConstraintId>
    where
        SI: IntoIterator<Item = Substitution<'a>>,
    {
        writeln!(
            self.writer,
            "red {constr} ; {}",
            witness.into_iter().format(" ")
        )?;
        Ok(self.new_id())
    }

    /// Adds a new constraint that is derived via a sequence of cutting-planes
    /// operations and returns its [`ConstraintId`]
    ///
    /// # Proof Log
    ///
    /// Adds a `pol`-rule line.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn operations(&mut self, operations: &OperationSequence) -> io::Result<ConstraintId> {
        writeln!(self.writer, "pol {operations}")?;
        Ok(self.new_id())
    }

    /// Deletes a constraint by its [`ConstraintId`]
    ///
    /// # Proof Log
    ///
    /// Adds a `del id`-rule line.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn delete_id(&mut self, id: ConstraintId) -> io::Result<()> {
        writeln!(self.writer, "del id {id}")
    }

    /// Checks that a constraint with a given ID equals the stated one
    ///
    /// # Proof Log
    ///
    /// Adds an `e`-rule line.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn equals(&mut self, id: ConstraintId, constr: &LinConstr) -> io::Result<()> {
        writeln!(self.writer, "e {id} {constr} ;")
    }

    /// Logs a feasible solution and returns the ID of the asserted
    /// solution-excluding constraint
    ///
    /// # Proof Log
    ///
    /// Adds an `o` line.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn solution<'a, I>(&mut self, solution: I) -> io::Result<ConstraintId>
    where
        I: IntoIterator<Item = Axiom<'a>>,
    {
        writeln!(self.writer, "o {}", solution.into_iter().format(" "))?;
        Ok(self.new_id())
    }

    /// Concludes the proof after a logged solution and returns the ID the
    /// conclusion is bound to
    ///
    /// # Proof Log
    ///
    /// Adds the `u >= 1 ;` contradiction claim and the `c`-line referencing
    /// it.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn conclude(&mut self) -> io::Result<ConstraintId> {
        writeln!(self.writer, "u >= 1 ;")?;
        let id = self.new_id();
        writeln!(self.writer, "c {id}")?;
        Ok(id)
    }

    /// Flushes the underlying writer
    ///
    /// # Errors
    ///
    /// If flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Recovers the underlying writer, consuming the proof
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}
