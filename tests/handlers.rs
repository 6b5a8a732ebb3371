//! # Handler-Level Regression Tests
//!
//! Each test drives the active engine through one transformation scenario
//! and asserts the exact emitted proof text together with the registry and
//! scale-table state afterwards.

use anyhow::Result;
use presolve_cert::{
    ArgumentType, ConstraintMatrix, Problem, Rational, RowFlags, SparseVec, VeriPb,
};

fn rat(n: i64) -> Rational {
    Rational::from_integer(n)
}

fn build_problem(
    rows: &[(&[usize], &[i64])],
    flags: &[(bool, bool)],
    lhs: &[i64],
    rhs: &[i64],
    n_cols: usize,
) -> Problem {
    let rows = rows
        .iter()
        .map(|(idx, vals)| {
            SparseVec::new(idx.to_vec(), vals.iter().map(|&v| rat(v)).collect()).unwrap()
        })
        .collect();
    let flags = flags
        .iter()
        .map(|&(lhs_inf, rhs_inf)| RowFlags { lhs_inf, rhs_inf })
        .collect();
    let matrix = ConstraintMatrix::new(
        rows,
        flags,
        lhs.iter().map(|&v| rat(v)).collect(),
        rhs.iter().map(|&v| rat(v)).collect(),
        n_cols,
    )
    .unwrap();
    let names = (1..=n_cols).map(|i| format!("x{i}")).collect();
    Problem::new("test.mps".to_string(), matrix, names)
}

fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

fn output(cert: VeriPb<Vec<u8>>) -> String {
    String::from_utf8(cert.into_writer()).unwrap()
}

#[test]
fn upper_bound_fix_primal() -> Result<()> {
    let problem = build_problem(
        &[(&[0, 1], &[1, 1])],
        &[(false, true)],
        &[1],
        &[0],
        2,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    assert_eq!(cert.next_id(), 2);
    cert.change_upper_bound(rat(0), "x1", ArgumentType::Primal)?;
    assert_eq!(cert.next_id(), 3);
    assert_eq!(output(cert), "rup 1 ~x1 >= 1 ;\n");
    Ok(())
}

#[test]
fn upper_bound_fix_dual_needs_witness() -> Result<()> {
    let problem = build_problem(&[(&[0], &[1])], &[(false, true)], &[0], &[0], 1);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.change_upper_bound(rat(0), "x1", ArgumentType::Dual)?;
    assert_eq!(output(cert), "red 1 ~x1 >= 1 ; x1 -> 0\n");
    Ok(())
}

#[test]
fn lower_bound_fix_symmetry() -> Result<()> {
    let problem = build_problem(&[(&[0], &[1])], &[(false, true)], &[0], &[0], 1);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.change_lower_bound(rat(1), "x1", ArgumentType::Symmetry)?;
    assert_eq!(output(cert), "red 1 x1 >= 1 ; x1 -> 1\n");
    Ok(())
}

#[test]
fn dominating_columns_swap_witness() -> Result<()> {
    let problem = build_problem(&[(&[0, 1], &[1, 1])], &[(false, true)], &[1], &[0], 2);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.dominating_columns(0, 1, problem.var_names(), &identity(2))?;
    assert_eq!(
        output(cert),
        "red 1 x1 +1 ~x2 >= 1 ; x1 -> x2 x2 -> x1\n"
    );
    Ok(())
}

#[test]
fn change_rhs_normalizes_offset() -> Result<()> {
    // 2 x1 - x2 <= 1 normalizes to 2 ~x1 + x2 >= 1
    let problem = build_problem(&[(&[0, 1], &[2, -1])], &[(true, true)], &[0], &[0], 2);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    assert_eq!(cert.next_id(), 1);
    cert.change_rhs(
        0,
        rat(1),
        problem.matrix().row(0),
        problem.var_names(),
        &identity(2),
    )?;
    assert_eq!(cert.rhs_id(0).unwrap().get(), 1);
    assert_eq!(output(cert), "rup 2 ~x1 +1 x2 >= 1 ;\n");
    Ok(())
}

#[test]
fn change_lhs_normalizes_offset() -> Result<()> {
    // 2 x1 - x2 >= 1 normalizes to 2 x1 + ~x2 >= 2
    let problem = build_problem(&[(&[0, 1], &[2, -1])], &[(true, true)], &[0], &[0], 2);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.change_lhs(
        0,
        rat(1),
        problem.matrix().row(0),
        problem.var_names(),
        &identity(2),
    )?;
    assert_eq!(cert.lhs_id(0).unwrap().get(), 1);
    assert_eq!(output(cert), "rup 2 x1 +1 ~x2 >= 2 ;\n");
    Ok(())
}

#[test]
fn side_turning_infinite_deletes_its_constraint() -> Result<()> {
    let problem = build_problem(&[(&[0], &[1])], &[(false, false)], &[0], &[1], 1);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.change_rhs_inf(0)?;
    cert.change_lhs_inf(0)?;
    assert_eq!(cert.lhs_id(0), None);
    assert_eq!(cert.rhs_id(0), None);
    assert_eq!(output(cert), "del id 2\ndel id 1\n");
    Ok(())
}

#[test]
fn parallel_row_unit_factor_transfers_and_skips_delete() -> Result<()> {
    // rows are identical; the target's rhs inherits the source's derivation
    let problem = build_problem(
        &[(&[0, 1], &[1, 1]), (&[0, 1], &[1, 1])],
        &[(false, false), (false, true)],
        &[1, 1],
        &[2, 0],
        2,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    assert_eq!(cert.next_id(), 4);
    cert.change_rhs_parallel_row(1, rat(2), 0, &problem)?;
    // no derivation line, no counter advance
    assert_eq!(cert.next_id(), 4);
    assert_eq!(cert.rhs_id(1).unwrap().get(), 2);
    cert.mark_row_redundant(1)?;
    assert_eq!(cert.lhs_id(1), None);
    assert_eq!(cert.rhs_id(1), None);
    // the transferred constraint 2 is protected; only the lhs is deleted
    assert_eq!(
        output(cert),
        "* 2 is parallel to -/3 of row 1\ndel id 3\n"
    );
    Ok(())
}

#[test]
fn parallel_row_integral_factor_scales_source() -> Result<()> {
    let problem = build_problem(
        &[(&[0, 1], &[1, 1]), (&[0, 1], &[2, 2])],
        &[(false, false), (true, false)],
        &[1, 0],
        &[2, 4],
        2,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    // row0: lhs 1, rhs 2; row1: rhs 3
    cert.change_rhs_parallel_row(1, rat(4), 0, &problem)?;
    assert_eq!(cert.rhs_id(1).unwrap().get(), 4);
    assert_eq!(cert.scale_factor(1), 1);
    assert_eq!(
        output(cert),
        "* 2 is parallel to 3/- of row 1\npol 2 2 *\ndel id 3\n"
    );
    Ok(())
}

#[test]
fn parallel_row_negative_factor_consumes_opposite_side() -> Result<()> {
    let problem = build_problem(
        &[(&[0, 1], &[1, 1]), (&[0, 1], &[-2, -2])],
        &[(false, false), (true, false)],
        &[1, 0],
        &[2, -2],
        2,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    // factor is -2: the target's rhs derives from the source's lhs
    cert.change_rhs_parallel_row(1, rat(-2), 0, &problem)?;
    assert_eq!(
        output(cert),
        "* 1 is parallel to 3/- of row 1\npol 1 2 *\ndel id 3\n"
    );
    Ok(())
}

#[test]
fn parallel_row_fractional_factor_rescales_target() -> Result<()> {
    let problem = build_problem(
        &[(&[0], &[2]), (&[0], &[3])],
        &[(false, false), (false, false)],
        &[0, 0],
        &[2, 3],
        1,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    // row0: lhs 1, rhs 2; row1: lhs 3, rhs 4; factor 3/2
    cert.change_rhs_parallel_row(1, rat(3), 0, &problem)?;
    assert_eq!(cert.rhs_id(1).unwrap().get(), 5);
    assert_eq!(cert.lhs_id(1).unwrap().get(), 6);
    assert_eq!(cert.scale_factor(1), 2);
    assert_eq!(
        output(cert),
        "* 2 is parallel to 4/3 of row 1\n\
         pol 2 3 *\n\
         del id 4\n\
         pol 3 2 *\n\
         del id 3\n"
    );
    Ok(())
}

#[test]
fn update_row_drops_zeroed_coefficient() -> Result<()> {
    let problem = build_problem(&[(&[0, 1], &[2, 1])], &[(false, false)], &[0], &[2], 2);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    let flags = problem.matrix().row_flags(0);
    cert.update_row(
        0,
        1,
        rat(0),
        problem.matrix().row(0),
        flags,
        rat(0),
        rat(2),
        problem.var_names(),
        &identity(2),
    )?;
    assert_eq!(cert.lhs_id(0).unwrap().get(), 3);
    assert_eq!(cert.rhs_id(0).unwrap().get(), 4);
    assert_eq!(
        output(cert),
        "rup 2 x1 >= 0 ;\ndel id 1\nrup 2 ~x1 >= 0 ;\ndel id 2\n"
    );
    Ok(())
}

#[test]
fn sparsify_integral_scale_pairs_sides_by_sign() -> Result<()> {
    // cand <- cand - 2 * eq with both scales 1
    let problem = build_problem(
        &[(&[0, 1], &[1, 1]), (&[0, 1, 2], &[1, 2, 1])],
        &[(false, false), (false, false)],
        &[1, 0],
        &[1, 3],
        3,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.sparsify(0, 1, rat(-2), &problem)?;
    assert_eq!(cert.rhs_id(1).unwrap().get(), 5);
    assert_eq!(cert.lhs_id(1).unwrap().get(), 6);
    assert_eq!(cert.scale_factor(1), 1);
    assert_eq!(
        output(cert),
        "pol 1 2 * 4 +\ndel id 4\npol 2 2 * 3 +\ndel id 3\n"
    );
    Ok(())
}

#[test]
fn sparsify_reciprocal_scale_multiplies_candidate() -> Result<()> {
    let problem = build_problem(
        &[(&[0, 1], &[3, 3]), (&[0, 1, 2], &[1, 2, 1])],
        &[(false, false), (false, false)],
        &[3, 0],
        &[3, 3],
        3,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.sparsify(0, 1, Rational::new(1, 3), &problem)?;
    assert_eq!(cert.scale_factor(1), 3);
    assert_eq!(
        output(cert),
        "pol 4 3 * 2 +\ndel id 4\npol 3 3 * 1 +\ndel id 3\n"
    );
    Ok(())
}

#[test]
fn sparsify_fractional_scale_reconstructs_pair() -> Result<()> {
    // scale -3/2; the column of eq eliminated from cand carries coefficient 2
    let problem = build_problem(
        &[(&[0, 1], &[2, 2]), (&[0], &[3])],
        &[(false, false), (false, false)],
        &[2, 0],
        &[2, 3],
        2,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.sparsify(0, 1, Rational::new(-3, 2), &problem)?;
    assert_eq!(cert.scale_factor(1), 2);
    assert_eq!(
        output(cert),
        "pol 4 2 * 1 3 * +\ndel id 4\npol 3 2 * 2 3 * +\ndel id 3\n"
    );
    Ok(())
}

#[test]
#[should_panic(expected = "zero scale")]
fn sparsify_rejects_zero_scale() {
    let problem = build_problem(
        &[(&[0], &[1]), (&[0], &[1])],
        &[(false, false), (false, false)],
        &[0, 0],
        &[1, 1],
        1,
    );
    let mut cert: VeriPb<Vec<u8>> = VeriPb::new(Vec::new(), &problem);
    let _ = cert.sparsify(0, 1, rat(0), &problem);
}

#[test]
fn substitute_with_equality_keeps_auxiliaries() -> Result<()> {
    // substitute x1 through x1 + x2 = 1
    let problem = build_problem(
        &[(&[0, 2], &[3, 1]), (&[0, 1], &[-2, 1])],
        &[(false, false), (true, false)],
        &[0, 0],
        &[3, 1],
        3,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    // row0: lhs 1, rhs 2; row1: rhs 3
    let equality = SparseVec::new(vec![0, 1], vec![rat(1), rat(1)])?;
    cert.substitute_with_equality(
        0,
        &equality,
        rat(1),
        &problem,
        problem.var_names(),
        &identity(3),
    )?;
    let out = output(cert);
    assert_eq!(
        out,
        "* postsolve stack : row id 4\n\
         rup 1 x1 +1 x2 >= 1 ;\n\
         * postsolve stack : row id 5\n\
         rup 1 ~x1 +1 ~x2 >= 1 ;\n\
         pol 4 3 * 2 +\n\
         del id 2\n\
         pol 5 3 * 1 +\n\
         del id 1\n\
         pol 5 2 * 3 +\n\
         del id 3\n"
    );
    // the two auxiliary constraints survive for postsolve
    assert!(!out.contains("del id 4"));
    assert!(!out.contains("del id 5"));
    Ok(())
}

#[test]
fn substitute_with_equality_rescales_when_needed() -> Result<()> {
    // substituted coefficient 2 does not divide the row's coefficient 1
    let problem = build_problem(
        &[(&[0, 2], &[1, 1])],
        &[(false, false)],
        &[0],
        &[2],
        3,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    let equality = SparseVec::new(vec![0, 1], vec![rat(2), rat(1)])?;
    cert.substitute_with_equality(
        0,
        &equality,
        rat(0),
        &problem,
        problem.var_names(),
        &identity(3),
    )?;
    assert_eq!(cert.scale_factor(0), 2);
    assert_eq!(
        output(cert),
        "* postsolve stack : row id 3\n\
         rup 2 x1 +1 x2 >= 0 ;\n\
         * postsolve stack : row id 4\n\
         rup 2 ~x1 +1 ~x2 >= 3 ;\n\
         pol 2 2 * 3 +\n\
         del id 2\n\
         pol 1 2 * 4 +\n\
         del id 1\n"
    );
    Ok(())
}

#[test]
fn substitute_with_row_retires_the_equality() -> Result<()> {
    let problem = build_problem(
        &[(&[0, 1], &[1, 1]), (&[0, 2], &[2, 1])],
        &[(false, false), (false, false)],
        &[1, 0],
        &[1, 2],
        3,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    // row0 (the equality): lhs 1, rhs 2; row1: lhs 3, rhs 4
    cert.substitute_with_row(0, 0, &problem)?;
    assert_eq!(cert.lhs_id(0), None);
    assert_eq!(cert.rhs_id(0), None);
    assert_eq!(cert.lhs_id(1).unwrap().get(), 6);
    assert_eq!(cert.rhs_id(1).unwrap().get(), 5);
    assert_eq!(
        output(cert),
        "pol 1 2 * 4 +\n\
         del id 4\n\
         pol 2 2 * 3 +\n\
         del id 3\n\
         * postsolve stack : row id 2\n\
         * postsolve stack : row id 1\n\
         del id 2\n\
         del id 1\n"
    );
    Ok(())
}

#[test]
fn solution_logging_advances_counter_twice() -> Result<()> {
    let problem = build_problem(&[], &[], &[], &[], 3);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    assert_eq!(cert.next_id(), 1);
    cert.log_solution(&[true, false, true], problem.var_names())?;
    assert_eq!(cert.next_id(), 3);
    assert_eq!(output(cert), "o x1 ~x2 x3\nu >= 1 ;\nc 2\n");
    Ok(())
}

#[test]
fn compress_moves_registry_entries() -> Result<()> {
    let problem = build_problem(
        &[(&[0], &[1]), (&[0], &[1]), (&[0], &[2])],
        &[(false, true), (false, false), (true, false)],
        &[1, 0, 0],
        &[0, 1, 2],
        1,
    );
    let mut cert = VeriPb::new(Vec::new(), &problem);
    // ids: row0 lhs 1; row1 lhs 2, rhs 3; row2 rhs 4
    cert.compress(&[Some(0), None, Some(1)], &[Some(0)], true)?;
    assert_eq!(cert.lhs_id(0).unwrap().get(), 1);
    assert_eq!(cert.lhs_id(1), None);
    assert_eq!(cert.rhs_id(1).unwrap().get(), 4);
    assert_eq!(cert.scale_factor(1), 1);
    assert_eq!(output(cert), "");
    Ok(())
}

#[test]
fn problem_state_dump_restates_live_sides() -> Result<()> {
    let problem = build_problem(&[(&[0, 1], &[1, -1])], &[(false, true)], &[0], &[0], 2);
    let mut cert = VeriPb::new(Vec::new(), &problem);
    cert.log_problem_state(&problem, &identity(2))?;
    assert_eq!(output(cert), "e 1 1 x1 +1 ~x2 >= 1 ;\n");
    Ok(())
}
