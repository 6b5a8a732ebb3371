//! # The Active Certificate Engine
//!
//! [`VeriPb`] tracks, for every row of the problem, which proof constraint
//! currently derives each finite side, together with the integer scale factor
//! that keeps all emitted numbers integral. Every presolve transformation
//! notification emits the matching derivation lines and updates these tables.

use std::{fmt, fs::File, io};

use num_traits::{One, Signed, Zero};
use tracing::{debug, trace};

use crate::{
    problem::{Problem, Rational, RowFlags, SparseVec},
    proof::Proof,
    types::{ArgumentType, Axiom, ConstraintId, LinConstr, Substitution},
    utils::compress_vector,
};

/// Which side of a row a derivation concerns
///
/// The proof views a row `lhs <= sum a_i x_i <= rhs` as up to two pseudo-
/// Boolean constraints, one per finite side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    /// The `>= lhs` direction
    Lhs,
    /// The `<= rhs` direction
    Rhs,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Lhs => Side::Rhs,
            Side::Rhs => Side::Lhs,
        }
    }

    fn finite(self, flags: RowFlags) -> bool {
        match self {
            Side::Lhs => !flags.lhs_inf,
            Side::Rhs => !flags.rhs_inf,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Lhs => write!(f, "lhs"),
            Side::Rhs => write!(f, "rhs"),
        }
    }
}

/// Converts an exact rational to an integer
///
/// # Panics
///
/// If the value is not integral. Such a value reaching a proof line is a
/// programming error in the caller, not a recoverable condition.
fn integral(val: Rational) -> i64 {
    assert!(val.is_integer(), "expected an integral value, got {val}");
    val.to_integer()
}

/// Builds the normalized pseudo-Boolean form of one side of a row
///
/// Positive coefficients of a rhs-side constraint (and negative ones of a
/// lhs-side constraint) turn into negated literals; their magnitudes shift
/// the degree accordingly. Zero coefficients are skipped.
fn normalized<'a>(
    terms: impl Iterator<Item = (usize, Rational)>,
    side: Side,
    bound: Rational,
    scale: i64,
    names: &'a [String],
    col_map: &[usize],
) -> LinConstr<'a> {
    let scale = Rational::from_integer(scale);
    let mut out = Vec::new();
    let mut offset: i64 = 0;
    for (col, val) in terms {
        let coeff = integral(val * scale);
        if coeff == 0 {
            continue;
        }
        let neg = match side {
            Side::Rhs => coeff > 0,
            Side::Lhs => coeff < 0,
        };
        if neg {
            offset += coeff.abs();
        }
        out.push((coeff.unsigned_abs(), Axiom::new(&names[col_map[col]], neg)));
    }
    let degree = match side {
        Side::Rhs => offset - integral(bound * scale),
        Side::Lhs => integral(bound * scale) + offset,
    };
    LinConstr { terms: out, degree }
}

/// The first coefficient of `eq` at a column absent from `cand`
///
/// Both vectors are sorted by index, so a co-ordered merge walk finds the
/// mismatch in one pass.
///
/// # Panics
///
/// If every column of `eq` also appears in `cand`.
fn mismatch_value(eq: &SparseVec, cand: &SparseVec) -> Rational {
    let mut cand_indices = cand.indices().iter().peekable();
    for (col, val) in eq.iter() {
        while cand_indices.next_if(|&&c| c < col).is_some() {}
        if cand_indices.peek() == Some(&&col) {
            continue;
        }
        return val;
    }
    panic!("equality row is contained in the candidate row")
}

/// The certificate engine for proof-logged presolve
///
/// Construction scans the initial problem and reserves one proof constraint
/// ID per finite row side; [`VeriPb::write_header`] then binds those IDs to
/// the input formulation. Afterwards the presolver reports every
/// transformation through the handler methods, which emit derivation lines
/// synchronously.
///
/// Emission failures are fatal to the presolve run; no handler attempts
/// recovery.
#[derive(Debug)]
pub struct VeriPb<W: io::Write> {
    proof: Proof<W>,
    /// Proof constraint currently deriving the `>=` side of each row
    lhs_ids: Vec<Option<ConstraintId>>,
    /// Proof constraint currently deriving the `<=` side of each row
    rhs_ids: Vec<Option<ConstraintId>>,
    /// Positive integer multiplier making each row's numbers integral
    scale: Vec<i64>,
    /// Suppresses the next deletion of a transferred lhs constraint
    skip_delete_lhs: Option<ConstraintId>,
    /// Suppresses the next deletion of a transferred rhs constraint
    skip_delete_rhs: Option<ConstraintId>,
}

impl VeriPb<io::BufWriter<File>> {
    /// Creates an engine writing to the problem's `.pbp` proof file
    ///
    /// The file name is derived with [`crate::proof_path`].
    ///
    /// # Errors
    ///
    /// If the proof file cannot be created.
    pub fn for_problem(problem: &Problem) -> io::Result<Self> {
        let path = super::proof_path(problem.name());
        let file = File::create(path)?;
        Ok(Self::new(io::BufWriter::new(file), problem))
    }
}

impl<W: io::Write> VeriPb<W> {
    /// Creates an engine for a problem, reserving a proof constraint ID for
    /// every finite row side
    ///
    /// Nothing is written; call [`VeriPb::write_header`] before the first
    /// transformation.
    #[must_use]
    pub fn new(writer: W, problem: &Problem) -> Self {
        let n_rows = problem.n_rows();
        let mut proof = Proof::new(writer);
        let mut lhs_ids = Vec::with_capacity(n_rows);
        let mut rhs_ids = Vec::with_capacity(n_rows);
        for row in 0..n_rows {
            let flags = problem.matrix().row_flags(row);
            lhs_ids.push((!flags.lhs_inf).then(|| proof.new_id()));
            rhs_ids.push((!flags.rhs_inf).then(|| proof.new_id()));
        }
        debug!(
            "reserved {} proof constraint ids for {n_rows} rows",
            proof.next_id() - 1
        );
        VeriPb {
            proof,
            lhs_ids,
            rhs_ids,
            scale: vec![1; n_rows],
            skip_delete_lhs: None,
            skip_delete_rhs: None,
        }
    }

    /// Gets the proof constraint ID deriving a row's lhs, if finite
    #[must_use]
    pub fn lhs_id(&self, row: usize) -> Option<ConstraintId> {
        self.lhs_ids[row]
    }

    /// Gets the proof constraint ID deriving a row's rhs, if finite
    #[must_use]
    pub fn rhs_id(&self, row: usize) -> Option<ConstraintId> {
        self.rhs_ids[row]
    }

    /// Gets the scale factor of a row
    #[must_use]
    pub fn scale_factor(&self, row: usize) -> i64 {
        self.scale[row]
    }

    /// Gets the next unused constraint ID in the proof
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.proof.next_id()
    }

    /// Recovers the proof sink, consuming the engine
    #[must_use]
    pub fn into_writer(self) -> W {
        self.proof.into_writer()
    }

    fn id_of(&self, side: Side, row: usize) -> Option<ConstraintId> {
        match side {
            Side::Lhs => self.lhs_ids[row],
            Side::Rhs => self.rhs_ids[row],
        }
    }

    fn require_id(&self, side: Side, row: usize) -> ConstraintId {
        self.id_of(side, row)
            .unwrap_or_else(|| panic!("row {row} has no {side} constraint id"))
    }

    fn slot(&mut self, side: Side, row: usize) -> &mut Option<ConstraintId> {
        match side {
            Side::Lhs => &mut self.lhs_ids[row],
            Side::Rhs => &mut self.rhs_ids[row],
        }
    }

    fn scale_of(&self, row: usize) -> Rational {
        Rational::from_integer(self.scale[row])
    }

    /// Writes the proof header binding the reserved IDs to the original
    /// formulation
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.proof.header(&[
            "proof log generated during presolve",
            "constraint ids refer to the formulation the checker was given",
        ])
    }

    /// Flushes the proof sink so an external checker can start replaying
    ///
    /// # Errors
    ///
    /// If flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.proof.flush()
    }

    /// Logs tightening a variable's upper bound to zero
    ///
    /// # Proof Log
    ///
    /// A `rup` line asserting the negated literal for a primal argument, a
    /// `red` line with the fixing witness otherwise.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If `val` is not zero; only 0/1 domains exist in the proof's view.
    pub fn change_upper_bound(
        &mut self,
        val: Rational,
        name: &str,
        argument: ArgumentType,
    ) -> io::Result<()> {
        assert!(val.is_zero(), "upper bound must be tightened to zero");
        trace!("fixing {name} to 0 ({argument:?})");
        let constr = LinConstr {
            terms: vec![(1, Axiom::neg(name))],
            degree: 1,
        };
        match argument {
            ArgumentType::Primal => self.proof.reverse_unit_prop(&constr)?,
            ArgumentType::Dual | ArgumentType::Symmetry => self
                .proof
                .redundant(&constr, [Substitution::fixed(name, false)])?,
        };
        Ok(())
    }

    /// Logs tightening a variable's lower bound to one
    ///
    /// # Proof Log
    ///
    /// A `rup` line asserting the literal for a primal argument, a `red`
    /// line with the fixing witness otherwise.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If `val` is not one.
    pub fn change_lower_bound(
        &mut self,
        val: Rational,
        name: &str,
        argument: ArgumentType,
    ) -> io::Result<()> {
        assert!(val.is_one(), "lower bound must be tightened to one");
        trace!("fixing {name} to 1 ({argument:?})");
        let constr = LinConstr {
            terms: vec![(1, Axiom::pos(name))],
            degree: 1,
        };
        match argument {
            ArgumentType::Primal => self.proof.reverse_unit_prop(&constr)?,
            ArgumentType::Dual | ArgumentType::Symmetry => self
                .proof
                .redundant(&constr, [Substitution::fixed(name, true)])?,
        };
        Ok(())
    }

    /// Logs that one column dominates another
    ///
    /// # Proof Log
    ///
    /// A `red` line with the swap witness.
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
        let dom = names[col_map[dominating]].as_str();
        let sub = names[col_map[dominated]].as_str();
        let constr = LinConstr {
            terms: vec![(1, Axiom::pos(dom)), (1, Axiom::neg(sub))],
            degree: 1,
        };
        self.proof.redundant(
            &constr,
            [
                Substitution::literal(dom, Axiom::pos(sub)),
                Substitution::literal(sub, Axiom::pos(dom)),
            ],
        )?;
        Ok(())
    }

    /// Logs replacing the rhs bound of a row
    ///
    /// `data` is the row's current coefficients; zero coefficients are
    /// skipped.
    ///
    /// # Proof Log
    ///
    /// A `rup` line restating the side at the row's scale. The previous rhs
    /// constraint is *not* deleted here; handlers that orchestrate a full
    /// rewrite delete it themselves.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If a coefficient or the bound is not integral at the row's scale.
    pub fn change_rhs(
        &mut self,
        row: usize,
        val: Rational,
        data: &SparseVec,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        self.change_side(Side::Rhs, row, val, data, names, col_map)
    }

    /// Logs replacing the lhs bound of a row; see [`VeriPb::change_rhs`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If a coefficient or the bound is not integral at the row's scale.
    pub fn change_lhs(
        &mut self,
        row: usize,
        val: Rational,
        data: &SparseVec,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        self.change_side(Side::Lhs, row, val, data, names, col_map)
    }

    fn change_side(
        &mut self,
        side: Side,
        row: usize,
        val: Rational,
        data: &SparseVec,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        let constr = normalized(data.iter(), side, val, self.scale[row], names, col_map);
        let id = self.proof.reverse_unit_prop(&constr)?;
        trace!("row {row} {side} now derived by constraint {id}");
        *self.slot(side, row) = Some(id);
        Ok(())
    }

    /// Logs that a row's lhs became minus infinity
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If the row has no lhs constraint.
    pub fn change_lhs_inf(&mut self, row: usize) -> io::Result<()> {
        let id = self.lhs_ids[row]
            .take()
            .unwrap_or_else(|| panic!("row {row} has no lhs constraint id"));
        self.proof.delete_id(id)
    }

    /// Logs that a row's rhs became plus infinity
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If the row has no rhs constraint.
    pub fn change_rhs_inf(&mut self, row: usize) -> io::Result<()> {
        let id = self.rhs_ids[row]
            .take()
            .unwrap_or_else(|| panic!("row {row} has no rhs constraint id"));
        self.proof.delete_id(id)
    }

    /// Logs changing one coefficient of a row
    ///
    /// `data` holds the row *before* the update; the entry of `col` is
    /// replaced by `new_val` on the fly, and dropped entirely if `new_val`
    /// is zero.
    ///
    /// # Proof Log
    ///
    /// Per finite side: a `rup` line restating the row with the updated
    /// coefficient, followed by deletion of the superseded side constraint.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If a number is not integral at the row's scale, or an updated side
    /// has no constraint id.
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
        assert!(
            (new_val * self.scale_of(row)).is_integer(),
            "updated coefficient must be integral at the row's scale"
        );
        for (side, bound) in [(Side::Lhs, lhs), (Side::Rhs, rhs)] {
            if !side.finite(rflags) {
                continue;
            }
            let terms = data
                .iter()
                .map(|(c, v)| if c == col { (c, new_val) } else { (c, v) });
            let constr = normalized(terms, side, bound, self.scale[row], names, col_map);
            let new_id = self.proof.reverse_unit_prop(&constr)?;
            let old = self
                .slot(side, row)
                .replace(new_id)
                .unwrap_or_else(|| panic!("row {row} has no {side} constraint id"));
            self.proof.delete_id(old)?;
            trace!("row {row} {side} rederived as {new_id} after coefficient update");
        }
        Ok(())
    }

    /// Logs that a row became redundant
    ///
    /// Both sides end up untracked. A side whose id matches its skip-delete
    /// marker was transferred by a parallel-row merge and stays alive in the
    /// proof; the marker is consumed.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn mark_row_redundant(&mut self, row: usize) -> io::Result<()> {
        debug_assert!(
            self.lhs_ids[row].is_some() || self.rhs_ids[row].is_some(),
            "row {row} is already untracked"
        );
        if let Some(id) = self.lhs_ids[row].take() {
            if self.skip_delete_lhs == Some(id) {
                self.skip_delete_lhs = None;
                trace!("transferred constraint {id} stays alive");
            } else {
                self.proof.delete_id(id)?;
            }
        }
        if let Some(id) = self.rhs_ids[row].take() {
            if self.skip_delete_rhs == Some(id) {
                self.skip_delete_rhs = None;
                trace!("transferred constraint {id} stays alive");
            } else {
                self.proof.delete_id(id)?;
            }
        }
        Ok(())
    }

    /// Logs defining a row's rhs from a parallel row
    ///
    /// # Proof Log
    ///
    /// A traceability comment, then: nothing for a unit factor (the source
    /// constraint is transferred and protected by a skip-delete marker), or
    /// a `pol` scaling of the matching source side. A fractional factor
    /// additionally restates the target's opposite side at a coarser scale.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If the factor between the rows has magnitude below one or a consumed
    /// side has no constraint id.
    pub fn change_rhs_parallel_row(
        &mut self,
        row: usize,
        val: Rational,
        parallel_row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        self.parallel_row(Side::Rhs, row, val, parallel_row, problem)
    }

    /// Logs defining a row's lhs from a parallel row; see
    /// [`VeriPb::change_rhs_parallel_row`]
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If the factor between the rows has magnitude below one or a consumed
    /// side has no constraint id.
    pub fn change_lhs_parallel_row(
        &mut self,
        row: usize,
        val: Rational,
        parallel_row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        self.parallel_row(Side::Lhs, row, val, parallel_row, problem)
    }

    fn parallel_row(
        &mut self,
        side: Side,
        row: usize,
        val: Rational,
        parallel_row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        let matrix = problem.matrix();
        let f_row = matrix
            .row(row)
            .first_nonzero()
            .expect("parallel target row is empty")
            * self.scale_of(row);
        let f_par = matrix
            .row(parallel_row)
            .first_nonzero()
            .expect("parallel source row is empty")
            * self.scale_of(parallel_row);
        let factor = f_row / f_par;
        assert!(
            factor.abs() >= Rational::one(),
            "parallel-row factor must have magnitude at least one, got {factor}"
        );
        trace!("row {row} {side} set to {val} from parallel row {parallel_row}, factor {factor}");
        // a positive factor keeps orientations, a negative one swaps sides
        let source_side = if factor.is_positive() {
            side
        } else {
            side.opposite()
        };
        let source_id = self.require_id(source_side, parallel_row);
        let fmt_slot =
            |slot: Option<ConstraintId>| slot.map_or_else(|| "-".to_string(), |id| id.to_string());
        self.proof.comment(&format_args!(
            "{source_id} is parallel to {}/{} of row {row}",
            fmt_slot(self.rhs_ids[row]),
            fmt_slot(self.lhs_ids[row]),
        ))?;

        if factor.abs() == Rational::one() {
            debug_assert!(
                self.id_of(side, row).is_none(),
                "transfer would leak the {side} constraint of row {row}"
            );
            *self.slot(side, row) = Some(source_id);
            match side {
                Side::Lhs => self.skip_delete_lhs = Some(source_id),
                Side::Rhs => self.skip_delete_rhs = Some(source_id),
            }
            return Ok(());
        }

        // a fractional factor forces the target onto the scale of the source
        // derivation; f_row and f_par are integral at the current scales
        let (mult, rescale) = if factor.is_integer() {
            (factor.to_integer(), None)
        } else {
            (integral(f_row), Some(integral(f_par).abs()))
        };
        let new_id = self.proof.operations(&(source_id * mult.unsigned_abs()))?;
        if let Some(old) = self.slot(side, row).replace(new_id) {
            self.proof.delete_id(old)?;
        }
        if let Some(par_scale) = rescale {
            if let Some(old) = self.id_of(side.opposite(), row) {
                let restated = self.proof.operations(&(old * par_scale.unsigned_abs()))?;
                self.proof.delete_id(old)?;
                *self.slot(side.opposite(), row) = Some(restated);
            }
            self.scale[row] *= par_scale;
        }
        Ok(())
    }

    /// Logs adding `s` times an equality row onto a candidate row
    ///
    /// `eq_row` must be an equality (both sides tracked); `cand_row` is the
    /// candidate, whose matrix data is the *updated* row.
    ///
    /// # Proof Log
    ///
    /// Per finite candidate side: one `pol` combination with the
    /// sign-matching equality side, followed by deletion of the superseded
    /// candidate constraint. Depending on which of the scaled factors is
    /// integral, the combination scales the equality, the candidate, or both.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If `scale` is zero, a required side is untracked, or the combination
    /// cannot be made integral.
    pub fn sparsify(
        &mut self,
        eq_row: usize,
        cand_row: usize,
        scale: Rational,
        problem: &Problem,
    ) -> io::Result<()> {
        assert!(!scale.is_zero(), "sparsification with zero scale");
        let matrix = problem.matrix();
        let flags = matrix.row_flags(cand_row);
        let s_upd = scale * self.scale_of(cand_row) / self.scale_of(eq_row);
        trace!("sparsify row {cand_row} with {scale} times row {eq_row}");
        if s_upd.is_integer() {
            // candidate stays at its scale, equality is multiplied up
            let mult = s_upd.to_integer();
            for side in [Side::Rhs, Side::Lhs] {
                if !side.finite(flags) {
                    continue;
                }
                let eq_side = if mult > 0 { side } else { side.opposite() };
                let eq_id = self.require_id(eq_side, eq_row);
                let cand_id = self.require_id(side, cand_row);
                let new_id = self
                    .proof
                    .operations(&(eq_id * mult.unsigned_abs() + cand_id))?;
                self.proof.delete_id(cand_id)?;
                *self.slot(side, cand_row) = Some(new_id);
            }
        } else if s_upd.recip().is_integer() {
            // candidate must be multiplied up instead; its scale coarsens
            let mult = s_upd.recip().to_integer();
            for side in [Side::Rhs, Side::Lhs] {
                if !side.finite(flags) {
                    continue;
                }
                let eq_side = if mult > 0 { side } else { side.opposite() };
                let eq_id = self.require_id(eq_side, eq_row);
                let cand_id = self.require_id(side, cand_row);
                let new_id = self
                    .proof
                    .operations(&(cand_id * mult.unsigned_abs() + eq_id))?;
                self.proof.delete_id(cand_id)?;
                *self.slot(side, cand_row) = Some(new_id);
            }
            self.scale[cand_row] *= mult.abs();
        } else {
            // reconstruct the fraction from the coefficient pair at the
            // first column eliminated from the candidate row
            let p = mismatch_value(matrix.row(eq_row), matrix.row(cand_row));
            let q = -scale * p;
            let cand_mult = integral(p * self.scale_of(eq_row)).abs();
            let eq_mult = integral(q * self.scale_of(cand_row)).abs();
            for side in [Side::Rhs, Side::Lhs] {
                if !side.finite(flags) {
                    continue;
                }
                let eq_side = if scale.is_positive() {
                    side
                } else {
                    side.opposite()
                };
                let eq_id = self.require_id(eq_side, eq_row);
                let cand_id = self.require_id(side, cand_row);
                let new_id = self.proof.operations(
                    &(cand_id * cand_mult.unsigned_abs() + eq_id * eq_mult.unsigned_abs()),
                )?;
                self.proof.delete_id(cand_id)?;
                *self.slot(side, cand_row) = Some(new_id);
            }
            self.scale[cand_row] *= cand_mult;
        }
        Ok(())
    }

    /// Logs substituting a column through a two-term equality that is not a
    /// problem row
    ///
    /// # Proof Log
    ///
    /// Two auxiliary `rup` lines proving the equality's two directions, each
    /// preceded by a postsolve-stack comment, then one `pol` chain per finite
    /// side of every row supporting the column. The auxiliaries survive for
    /// postsolve and are not deleted.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If the equality does not have exactly two integral nonzero terms and
    /// an integral offset, does not cover `col`, or a combination cannot be
    /// made integral.
    pub fn substitute_with_equality(
        &mut self,
        col: usize,
        equality: &SparseVec,
        offset: Rational,
        problem: &Problem,
        names: &[String],
        col_map: &[usize],
    ) -> io::Result<()> {
        assert!(offset.is_integer(), "equality offset must be integral");
        assert_eq!(
            equality.len(),
            2,
            "substituted equality must have exactly two terms"
        );
        for (_, val) in equality.iter() {
            assert!(
                val.is_integer() && !val.is_zero(),
                "equality coefficients must be integral and nonzero"
            );
        }
        let substitute_factor = equality
            .value_at(col)
            .expect("substituted column missing from the equality");
        let next = self.proof.next_id();
        self.proof
            .comment(&format_args!("postsolve stack : row id {next}"))?;
        let geq = normalized(equality.iter(), Side::Lhs, offset, 1, names, col_map);
        let lhs_id = self.proof.reverse_unit_prop(&geq)?;
        let next = self.proof.next_id();
        self.proof
            .comment(&format_args!("postsolve stack : row id {next}"))?;
        let leq = normalized(equality.iter(), Side::Rhs, offset, 1, names, col_map);
        let rhs_id = self.proof.reverse_unit_prop(&leq)?;
        self.proof.flush()?;
        // the auxiliary constraints survive for postsolve
        self.substitute_in_column(col, substitute_factor, lhs_id, rhs_id, problem, None)
    }

    /// Logs substituting a column through an equality row of the problem
    ///
    /// # Proof Log
    ///
    /// One `pol` chain per finite side of every other row supporting the
    /// column, then postsolve-stack comments and deletion of the equality
    /// row's two constraints.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If `row` is not a tracked equality, does not cover `col`, or a
    /// combination cannot be made integral.
    pub fn substitute_with_row(
        &mut self,
        col: usize,
        row: usize,
        problem: &Problem,
    ) -> io::Result<()> {
        let matrix = problem.matrix();
        let flags = matrix.row_flags(row);
        assert!(
            !flags.lhs_inf && !flags.rhs_inf,
            "substituted row must be an equality"
        );
        let coeff = matrix
            .col(col)
            .value_at(row)
            .expect("substituted column missing from the equality row");
        let factor = coeff * self.scale_of(row);
        let lhs_id = self.require_id(Side::Lhs, row);
        let rhs_id = self.require_id(Side::Rhs, row);
        self.substitute_in_column(col, factor, lhs_id, rhs_id, problem, Some(row))?;
        // the equality moves to the postsolve stack and leaves the proof
        self.proof
            .comment(&format_args!("postsolve stack : row id {rhs_id}"))?;
        self.proof
            .comment(&format_args!("postsolve stack : row id {lhs_id}"))?;
        self.proof.delete_id(rhs_id)?;
        self.proof.delete_id(lhs_id)?;
        self.lhs_ids[row] = None;
        self.rhs_ids[row] = None;
        Ok(())
    }

    /// Rederives every row supporting `col` as a combination with the
    /// auxiliary equality constraints `lhs_aux`/`rhs_aux`
    ///
    /// The sign rule pairs a row's rhs with the `>=` direction of the
    /// equality when the substituted and row factors agree in sign, and with
    /// the `<=` direction otherwise; symmetrically for the row's lhs.
    fn substitute_in_column(
        &mut self,
        col: usize,
        substitute_factor: Rational,
        lhs_aux: ConstraintId,
        rhs_aux: ConstraintId,
        problem: &Problem,
        skip_row: Option<usize>,
    ) -> io::Result<()> {
        assert!(
            !substitute_factor.is_zero(),
            "substituted coefficient must be nonzero"
        );
        let matrix = problem.matrix();
        for (row, coeff) in matrix.col(col).iter() {
            if skip_row == Some(row) {
                continue;
            }
            let factor = coeff * self.scale_of(row);
            let flags = matrix.row_flags(row);
            let same_sign = (substitute_factor * factor).is_positive();
            let aux = |side: Side| match (side, same_sign) {
                (Side::Rhs, true) | (Side::Lhs, false) => lhs_aux,
                (Side::Rhs, false) | (Side::Lhs, true) => rhs_aux,
            };
            if (factor / substitute_factor).is_integer() {
                let mult = (factor / substitute_factor).to_integer().unsigned_abs();
                for side in [Side::Rhs, Side::Lhs] {
                    if !side.finite(flags) {
                        continue;
                    }
                    let row_id = self.require_id(side, row);
                    let new_id = self.proof.operations(&(aux(side) * mult + row_id))?;
                    self.proof.delete_id(row_id)?;
                    *self.slot(side, row) = Some(new_id);
                }
            } else if (substitute_factor / factor).is_integer() {
                let mult = (substitute_factor / factor).to_integer().abs();
                self.scale[row] *= mult;
                for side in [Side::Rhs, Side::Lhs] {
                    if !side.finite(flags) {
                        continue;
                    }
                    let row_id = self.require_id(side, row);
                    let new_id = self
                        .proof
                        .operations(&(row_id * mult.unsigned_abs() + aux(side)))?;
                    self.proof.delete_id(row_id)?;
                    *self.slot(side, row) = Some(new_id);
                }
            } else {
                assert!(
                    substitute_factor.is_integer() && factor.is_integer(),
                    "substitution requires integral factors when neither divides the other"
                );
                let row_mult = integral(factor).abs();
                let aux_scale = integral(substitute_factor).abs();
                self.scale[row] *= aux_scale;
                for side in [Side::Rhs, Side::Lhs] {
                    if !side.finite(flags) {
                        continue;
                    }
                    let row_id = self.require_id(side, row);
                    let new_id = self.proof.operations(
                        &(aux(side) * row_mult.unsigned_abs() + row_id * aux_scale.unsigned_abs()),
                    )?;
                    self.proof.delete_id(row_id)?;
                    *self.slot(side, row) = Some(new_id);
                }
            }
        }
        Ok(())
    }

    /// Logs a feasible solution over the original variable ordering and
    /// concludes the proof
    ///
    /// # Proof Log
    ///
    /// An `o` line listing every variable's literal, the `u >= 1 ;`
    /// contradiction claim, and the `c`-line binding the conclusion.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    pub fn log_solution(&mut self, assignment: &[bool], names: &[String]) -> io::Result<()> {
        debug_assert_eq!(assignment.len(), names.len());
        let axioms = names
            .iter()
            .zip(assignment)
            .map(|(name, &value)| Axiom::new(name, !value));
        self.proof.solution(axioms)?;
        let bound = self.proof.conclude()?;
        debug!("logged solution, conclusion bound to constraint {bound}");
        Ok(())
    }

    /// Reindexes the registry and scale table after problem compaction
    ///
    /// Proof IDs are global and unchanged; only the row index mapping to
    /// them moves. The three vector compactions are independent and run on
    /// the rayon thread pool. `col_mapping` does not affect the registry and
    /// is only reported for observability.
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
        self.proof.flush()?;
        trace!(
            "compacting registry to {} rows, problem to {} cols",
            row_mapping.iter().flatten().count(),
            col_mapping.iter().flatten().count()
        );
        let Self {
            lhs_ids,
            rhs_ids,
            scale,
            ..
        } = self;
        rayon::join(
            || {
                compress_vector(row_mapping, lhs_ids);
                if full {
                    lhs_ids.shrink_to_fit();
                }
            },
            || {
                rayon::join(
                    || {
                        compress_vector(row_mapping, rhs_ids);
                        if full {
                            rhs_ids.shrink_to_fit();
                        }
                    },
                    || {
                        compress_vector(row_mapping, scale);
                        if full {
                            scale.shrink_to_fit();
                        }
                    },
                );
            },
        );
        Ok(())
    }

    /// Dumps `e` equality-check lines restating every tracked row side at
    /// its current scale
    ///
    /// Diagnostic helper for replaying the compacted problem against the
    /// proof; not part of the regular presolve flow.
    ///
    /// # Errors
    ///
    /// If writing the proof fails.
    ///
    /// # Panics
    ///
    /// If a number is not integral at its row's scale.
    pub fn log_problem_state(&mut self, problem: &Problem, col_mapping: &[usize]) -> io::Result<()> {
        let matrix = problem.matrix();
        let names = problem.var_names();
        debug_assert_eq!(matrix.n_rows(), self.lhs_ids.len());
        for row in 0..matrix.n_rows() {
            if let Some(id) = self.lhs_ids[row] {
                let constr = normalized(
                    matrix.row(row).iter(),
                    Side::Lhs,
                    matrix.lhs(row),
                    self.scale[row],
                    names,
                    col_mapping,
                );
                self.proof.equals(id, &constr)?;
            }
            if let Some(id) = self.rhs_ids[row] {
                let constr = normalized(
                    matrix.row(row).iter(),
                    Side::Rhs,
                    matrix.rhs(row),
                    self.scale[row],
                    names,
                    col_mapping,
                );
                self.proof.equals(id, &constr)?;
            }
        }
        self.proof.flush()
    }
}
