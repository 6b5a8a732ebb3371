//! # Basic Types for Proof Emission

use std::{fmt, num::NonZeroU64};

use itertools::Itertools;

/// A VeriPB proof constraint ID
///
/// IDs are assigned by [`crate::Proof`] strictly increasing and are never
/// reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub(crate) NonZeroU64);

impl ConstraintId {
    /// Creates a constraint ID with a given value
    ///
    /// # Panics
    ///
    /// If `id` is zero.
    #[must_use]
    pub fn new(id: u64) -> ConstraintId {
        ConstraintId(id.try_into().expect("constraint ID cannot be zero"))
    }

    /// Gets the numeric value of the ID
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An axiom, i.e., a possibly negated variable from the problem's name table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Axiom<'a> {
    /// Whether the literal is negated
    pub(crate) neg: bool,
    /// The variable name
    pub(crate) var: &'a str,
}

impl<'a> Axiom<'a> {
    /// Creates an axiom with the given polarity
    #[must_use]
    pub fn new(var: &'a str, neg: bool) -> Self {
        Axiom { neg, var }
    }

    /// Creates a positive axiom of a variable
    #[must_use]
    pub fn pos(var: &'a str) -> Self {
        Axiom { neg: false, var }
    }

    /// Creates a negative axiom of a variable
    #[must_use]
    pub fn neg(var: &'a str) -> Self {
        Axiom { neg: true, var }
    }
}

impl fmt::Display for Axiom<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.neg { "~" } else { "" }, self.var)
    }
}

/// A substitution of a variable for the witness of a `red` line
#[derive(Clone, Copy, Debug)]
pub struct Substitution<'a> {
    /// The variable to substitute
    pub(crate) var: &'a str,
    /// What to substitute with
    pub(crate) sub: SubstituteWith<'a>,
}

impl<'a> Substitution<'a> {
    /// Substitutes the variable with a fixed truth value
    #[must_use]
    pub fn fixed(var: &'a str, value: bool) -> Self {
        Substitution {
            var,
            sub: if value {
                SubstituteWith::True
            } else {
                SubstituteWith::False
            },
        }
    }

    /// Substitutes the variable with a literal
    #[must_use]
    pub fn literal(var: &'a str, lit: Axiom<'a>) -> Self {
        Substitution {
            var,
            sub: SubstituteWith::Lit(lit),
        }
    }
}

impl fmt::Display for Substitution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.var, self.sub)
    }
}

/// What to substitute a variable with
#[derive(Clone, Copy, Debug)]
pub(crate) enum SubstituteWith<'a> {
    /// Fix true value
    True,
    /// Fix false value
    False,
    /// Substitute variable with literal
    Lit(Axiom<'a>),
}

impl fmt::Display for SubstituteWith<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstituteWith::True => write!(f, "1"),
            SubstituteWith::False => write!(f, "0"),
            SubstituteWith::Lit(lit) => write!(f, "{lit}"),
        }
    }
}

/// A pseudo-Boolean constraint in normalized form: `sum(c_i * l_i) >= degree`
/// with non-negative coefficients
///
/// Displays as a valid VeriPB constraint body, e.g. `2 ~x1 +1 x2 >= 1`.
#[derive(Clone, Debug)]
pub struct LinConstr<'a> {
    /// Coefficient-literal pairs; coefficients are positive
    pub terms: Vec<(u64, Axiom<'a>)>,
    /// The degree (right-hand side) of the normalized constraint
    pub degree: i64,
}

impl fmt::Display for LinConstr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} >= {}",
            self.terms
                .iter()
                .format_with(" +", |(cf, lit), f| f(&format_args!("{cf} {lit}"))),
            self.degree
        )
    }
}

/// The argument kind justifying a variable bound change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArgumentType {
    /// The bound follows from the constraints by unit propagation
    #[default]
    Primal,
    /// The bound is justified by a dual argument and needs a witness
    Dual,
    /// The bound is justified by a symmetry argument and needs a witness
    Symmetry,
}
