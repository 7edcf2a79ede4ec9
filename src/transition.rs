//! Component B: transition-probability cache.
//!
//! Computes `log P(t) = log(exp(tQ))` once per non-root branch and attaches
//! it to the tree; the per-pattern kernel (`reconstruct.rs`) only ever adds
//! entries of these cached matrices, so the matrix exponential runs once per
//! edge rather than once per pattern per edge.

use crate::errors::{ReconstructionError, ReconstructionResult};
use crate::tree::Tree;

/// Attaches `log P(t)` to every non-root node of `tree`, once, reused across
/// every pattern during reconstruction (the
/// exponential runs once per edge, never once per pattern per edge).
pub fn attach_to_tree(tree: &mut Tree, q: &[[f64; 4]; 4]) -> ReconstructionResult<()> {
    let root = tree.root();
    let ids: Vec<_> = tree.non_root_nodes().collect();
    for id in ids {
        let (branch_length, label) = {
            let node = tree.node(id);
            (node.branch_length, node.label.to_string())
        };
        let log_p = log_transition_matrix(q, branch_length, &label)?;
        tree.node_mut(id).log_p = Some(log_p);
    }
    debug_assert!(tree.node(root).log_p.is_none());
    Ok(())
}

/// `log P(t)`, a 4x4 matrix of natural logs. Off-diagonal entries for a
/// zero-length branch use `f64::NEG_INFINITY`; the kernel only ever adds
/// these, so any sentinel smaller than every achievable path score is
/// acceptable.
pub type LogTransitionMatrix = [[f64; 4]; 4];

/// Computes `log(exp(t * q))` for a single branch.
///
/// `t == 0.0` is the identity limit handled directly, rather than relying
/// on the general exponential to converge to it exactly.
pub fn log_transition_matrix(
    q: &[[f64; 4]; 4],
    branch_length: f64,
    branch_label: &str,
) -> ReconstructionResult<LogTransitionMatrix> {
    if branch_length == 0.0 {
        let mut out = [[f64::NEG_INFINITY; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        return Ok(out);
    }

    let scaled = scale(q, branch_length);
    let p = matrix_exp(&scaled);

    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            let v = p[i][j];
            if !v.is_finite() || v <= 0.0 {
                return Err(ReconstructionError::NumericFailure {
                    branch: branch_label.to_string(),
                    branch_length,
                    detail: "matrix exponential produced a non-finite or non-positive entry",
                });
            }
            out[i][j] = v.ln();
        }
    }
    Ok(out)
}

fn scale(m: &[[f64; 4]; 4], t: f64) -> [[f64; 4]; 4] {
    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = m[i][j] * t;
        }
    }
    out
}

/// Matrix exponential of a fixed 4x4 matrix via scaling-and-squaring with a
/// Pade(6) approximant, the standard approach for small dense matrices where
/// pulling in a general linear-algebra crate would be disproportionate.
fn matrix_exp(m: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let norm = one_norm(m);
    let squarings = if norm <= 0.0 {
        0
    } else {
        (norm.log2().ceil().max(0.0)) as u32
    };
    let scale_factor = 2f64.powi(squarings as i32);

    let scaled = scale(m, 1.0 / scale_factor);
    let mut p = pade6(&scaled);

    for _ in 0..squarings {
        p = mat_mul(&p, &p);
    }
    p
}

fn one_norm(m: &[[f64; 4]; 4]) -> f64 {
    (0..4)
        .map(|j| (0..4).map(|i| m[i][j].abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

fn identity() -> [[f64; 4]; 4] {
    let mut id = [[0.0_f64; 4]; 4];
    for (i, row) in id.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    id
}

fn mat_mul(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            let mut acc = 0.0;
            for k in 0..4 {
                acc += a[i][k] * b[k][j];
            }
            out[i][j] = acc;
        }
    }
    out
}

fn mat_add(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = a[i][j] + b[i][j];
        }
    }
    out
}

fn mat_sub(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = a[i][j] - b[i][j];
        }
    }
    out
}

fn mat_scale(a: &[[f64; 4]; 4], s: f64) -> [[f64; 4]; 4] {
    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = a[i][j] * s;
        }
    }
    out
}

/// Degree-6 Pade approximant of `exp(a)`, solved via `N * exp(a) = D` by
/// Gauss-Jordan elimination on the fixed 4x4 system.
fn pade6(a: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    const C: [f64; 7] = [
        1.0,
        1.0 / 2.0,
        1.0 / 10.0,
        1.0 / 120.0,
        1.0 / 1_680.0,
        1.0 / 30_240.0,
        1.0 / 665_280.0,
    ];

    let id = identity();
    let a2 = mat_mul(a, a);
    let a4 = mat_mul(&a2, &a2);
    let a6 = mat_mul(&a4, &a2);

    // even powers of a, weighted by Pade coefficients
    let u_even = mat_add(
        &mat_add(&mat_scale(&id, C[0]), &mat_scale(&a2, C[2])),
        &mat_add(&mat_scale(&a4, C[4]), &mat_scale(&a6, C[6])),
    );
    let v_odd = mat_add(
        &mat_add(&mat_scale(&id, C[1]), &mat_scale(&a2, C[3])),
        &mat_scale(&a4, C[5]),
    );

    let u = mat_mul(a, &v_odd);
    let numerator = mat_add(&u_even, &u);
    let denominator = mat_sub(&u_even, &u);

    solve(&denominator, &numerator)
}

/// Solves `denominator * x = numerator` for the fixed 4x4 case via
/// Gauss-Jordan elimination with partial pivoting.
fn solve(denominator: &[[f64; 4]; 4], numerator: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut aug = [[0.0_f64; 8]; 4];
    for i in 0..4 {
        for j in 0..4 {
            aug[i][j] = denominator[i][j];
            aug[i][4 + j] = numerator[i][j];
        }
    }

    for col in 0..4 {
        let pivot_row = (col..4)
            .max_by(|&a, &b| aug[a][col].abs().partial_cmp(&aug[b][col].abs()).unwrap())
            .unwrap();
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }

        for row in 0..4 {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            let pivot_row = aug[col];
            for (k, v) in aug[row].iter_mut().enumerate() {
                *v -= factor * pivot_row[k];
            }
        }
    }

    let mut out = [[0.0_f64; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = aug[i][4 + j];
        }
    }
    out
}
