//! # Presolve-Cert
//!
//! A certificate engine emitting
//! [VeriPB](https://gitlab.com/MIAOresearch/software/VeriPB) pseudo-Boolean
//! proofs for presolve transformations on 0/1 optimization problems.
//!
//! While a presolver simplifies a problem, every transformation it applies is
//! reported to a [`Certificate`]; the active [`VeriPb`] engine synchronously
//! writes a version 1.0 pseudo-Boolean proof whose constraint identifiers
//! track each row side's current derivation, so an external checker can
//! replay the whole simplification. The engine maintains, per row, the proof
//! constraint ids of both sides and an integer scale factor that keeps every
//! emitted number integral.
//!
//! ## Coverage of the proof syntax
//!
//! - `rup`: side changes, coefficient updates, bound fixings
//! - `pol`: parallel-row merges, sparsification, column substitution
//! - `red`: dual/symmetry bound fixings, column domination
//! - `del id`: retiring superseded derivations
//! - `o`/`u`/`c`: solution logging and conclusion
//! - `e`: diagnostic restatement of the tracked problem
//!
//! ## Example
//!
//! ```
//! use presolve_cert::{
//!     ArgumentType, Certificate, ConstraintMatrix, Problem, Rational, RowFlags, SparseVec,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = vec![SparseVec::new(
//!     vec![0, 1],
//!     vec![Rational::from_integer(1), Rational::from_integer(1)],
//! )?];
//! let matrix = ConstraintMatrix::new(
//!     rows,
//!     vec![RowFlags { lhs_inf: false, rhs_inf: true }],
//!     vec![Rational::from_integer(1)],
//!     vec![Rational::from_integer(0)],
//!     2,
//! )?;
//! let problem = Problem::new(
//!     "toy.mps".to_string(),
//!     matrix,
//!     vec!["x1".to_string(), "x2".to_string()],
//! );
//! let mut cert = Certificate::with_proof(Vec::new(), &problem);
//! cert.write_header()?;
//! cert.change_upper_bound(Rational::from_integer(0), "x2", ArgumentType::Primal)?;
//! let proof = String::from_utf8(cert.into_writer().unwrap())?;
//! assert!(proof.ends_with("rup 1 ~x2 >= 1 ;\n"));
//! # Ok(())
//! # }
//! ```
//!
//! The problem data model itself (matrix mutation, presolve algorithms,
//! parsing) is out of scope; [`Problem`] is the read-only view the engine
//! consumes.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

mod cert;
mod ops;
mod problem;
mod proof;
mod types;
mod utils;

pub use cert::{proof_path, Certificate, VeriPb};
pub use ops::OperationSequence;
pub use problem::{ConstraintMatrix, Problem, ProblemError, Rational, RowFlags, SparseVec};
pub use proof::Proof;
pub use types::{ArgumentType, Axiom, ConstraintId, LinConstr, Substitution};
