//! Component A: rate-matrix builder.
//!
//! Assembles the instantaneous substitution-rate matrix `Q` from base
//! frequencies and exchangeabilities: validate up front, fail fast with a
//! named error, otherwise fall back to a fixed default.

use crate::base::rho_index;
use crate::errors::{ReconstructionError, ReconstructionResult};

const FREQ_SUM_EPSILON: f64 = 1e-6;

/// Base frequencies `pi` and exchangeabilities `rho` of a time-reversible
/// 4-state nucleotide substitution model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateModel {
    /// `[pi_A, pi_C, pi_G, pi_T]`.
    pub pi: [f64; 4],
    /// `[r_AC, r_AG, r_AT, r_CG, r_CT, r_GT]`.
    pub rho: [f64; 6],
}

impl Default for RateModel {
    /// Jukes-Cantor defaults: uniform frequencies, uniform exchangeabilities.
    fn default() -> Self {
        Self {
            pi: [0.25, 0.25, 0.25, 0.25],
            rho: [1.0; 6],
        }
    }
}

impl RateModel {
    pub fn new(pi: [f64; 4], rho: [f64; 6]) -> ReconstructionResult<Self> {
        let model = Self { pi, rho };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> ReconstructionResult<()> {
        let negative_count = self.pi.iter().chain(self.rho.iter()).filter(|v| **v < 0.0).count();
        if negative_count > 0 {
            return Err(ReconstructionError::BadModel {
                reason: "frequencies and exchangeabilities must be non-negative",
                freq_sum: self.pi.iter().sum(),
                negative_count,
            });
        }

        let freq_sum: f64 = self.pi.iter().sum();
        if (freq_sum - 1.0).abs() > FREQ_SUM_EPSILON {
            return Err(ReconstructionError::BadModel {
                reason: "base frequencies must sum to 1",
                freq_sum,
                negative_count: 0,
            });
        }

        Ok(())
    }

    /// Builds the 4x4 rate matrix `Q`: off-diagonal `Q[i][j] = pi[i] * rho(i, j)`,
    /// diagonal set so each row sums to zero.
    pub fn rate_matrix(&self) -> [[f64; 4]; 4] {
        let mut q = [[0.0_f64; 4]; 4];

        for (i, row) in q.iter_mut().enumerate() {
            let mut row_sum = 0.0;
            for (j, cell) in row.iter_mut().enumerate() {
                if i == j {
                    continue;
                }
                let rate = self.pi[i] * self.rho[rho_index(i, j)];
                *cell = rate;
                row_sum += rate;
            }
            row[i] = -row_sum;
        }

        q
    }
}
