use thiserror::Error;

/// Errors raised anywhere in the reconstruction pipeline.
///
/// One variant per failure kind named by the engine's contract: malformed
/// model parameters, a synthesised internal label colliding with a taxon, a
/// tree leaf absent from the alignment, or a non-finite transition
/// probability. All are fatal to the whole run; none are retried.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("missing input: {what}")]
    MissingInput { what: &'static str },

    #[error(
        "bad model: {reason} (frequencies sum to {freq_sum:.6}, {negative_count} negative value(s))"
    )]
    BadModel {
        reason: &'static str,
        freq_sum: f64,
        negative_count: usize,
    },

    #[error("synthesised label '{label}' collides with an existing taxon label")]
    LabelCollision { label: String },

    #[error("tree leaf '{taxon}' has no row in the supplied alignment")]
    UnknownTaxon { taxon: String },

    #[error(
        "non-finite transition probability on branch '{branch}' (length {branch_length}): {detail}"
    )]
    NumericFailure {
        branch: String,
        branch_length: f64,
        detail: &'static str,
    },
}

pub type ReconstructionResult<T> = Result<T, ReconstructionError>;
