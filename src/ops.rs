//! # Operation Sequences for Cutting-Planes Derivations
//!
//! Builder for the reverse polish notation bodies of `pol` lines. Only the
//! subset of operations the certificate engine derives with is covered:
//! referencing a constraint, multiplying by a positive integer, and adding.

use std::{
    fmt,
    num::NonZeroU64,
    ops::{Add, Mul},
};

use itertools::Itertools;

use crate::types::ConstraintId;

/// A sequence of operations to be added to the proof in reverse polish
/// notation
#[derive(Clone, Debug)]
pub struct OperationSequence(Vec<Operation>);

impl fmt::Display for OperationSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(" "))
    }
}

/// A single cutting-planes operation
#[derive(Clone, Copy, Debug)]
enum Operation {
    /// A trivial identity operation to get a constraint from its
    /// [`ConstraintId`]
    Id(ConstraintId),
    /// A constant multiplication operation
    Mult(NonZeroU64),
    /// An addition operation over two constraints
    Add,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Id(id) => write!(f, "{id}"),
            Operation::Mult(fact) => write!(f, "{fact} *"),
            Operation::Add => write!(f, "+"),
        }
    }
}

impl From<ConstraintId> for OperationSequence {
    fn from(value: ConstraintId) -> Self {
        OperationSequence(vec![Operation::Id(value)])
    }
}

impl Mul<u64> for OperationSequence {
    type Output = OperationSequence;

    fn mul(mut self, rhs: u64) -> Self::Output {
        self.0.push(Operation::Mult(
            rhs.try_into().expect("cannot multiply by zero"),
        ));
        self
    }
}

impl Mul<u64> for ConstraintId {
    type Output = OperationSequence;

    fn mul(self, rhs: u64) -> Self::Output {
        Into::<OperationSequence>::into(self) * rhs
    }
}

impl<O: Into<OperationSequence>> Add<O> for OperationSequence {
    type Output = OperationSequence;

    fn add(mut self, rhs: O) -> Self::Output {
        let rhs = Into::<OperationSequence>::into(rhs);
        self.0.extend(rhs.0);
        self.0.push(Operation::Add);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::types::ConstraintId as Id;

    #[test]
    fn scale_only() {
        let seq = Id::new(42) * 5;
        assert_eq!(&format!("{seq}"), "42 5 *");
    }

    #[test]
    fn scale_and_add() {
        let seq = Id::new(42) * 5 + Id::new(45);
        assert_eq!(&format!("{seq}"), "42 5 * 45 +");
    }

    #[test]
    fn doubly_scaled_add() {
        let seq = Id::new(42) * 5 + Id::new(45) * 3;
        assert_eq!(&format!("{seq}"), "42 5 * 45 3 * +");
    }

    #[test]
    #[should_panic(expected = "cannot multiply by zero")]
    fn zero_multiplier() {
        let _ = Id::new(42) * 0;
    }
}
