//! Joint maximum-likelihood ancestral sequence reconstruction over a rooted
//! nucleotide phylogeny (Pupko et al.'s algorithm), with site-pattern
//! compression and a data-parallel driver over patterns.
//!
//! The crate is built around a two-phase lifecycle: a mutable build phase
//! (load, validate, compress, attach transition matrices) is followed by
//! `seal()` into an immutable, `Arc`-shared context safe to fan out across
//! worker threads, after which `run()` can be called any number of times.

pub mod alignment;
pub mod base;
pub mod driver;
pub mod errors;
pub mod model;
pub mod options;
pub mod output;
pub mod pattern;
pub mod reconstruct;
pub mod transition;
pub mod tree;

use std::sync::Arc;

pub use alignment::Alignment;
pub use errors::{ReconstructionError, ReconstructionResult};
pub use model::RateModel;
pub use options::ReconstructionOptions;
pub use output::ReconstructionOutput;
pub use pattern::Pattern;
pub use tree::{InputNode, Tree};

/// Read-only state shared by every worker once the reconstructor is sealed:
/// the prepared tree (with `log P(t)` attached to every branch), the model's
/// base frequencies, and the compressed site patterns.
///
/// Contains only immutable owned data, no interior mutability — safe to
/// share across threads by construction.
pub struct ReconstructionContext {
    tree: Tree,
    pi: [f64; 4],
    patterns: Vec<Pattern>,
}

/// Build-phase handle: load inputs, validate, and seal into a
/// [`SealedReconstructor`] before running the parallel driver.
pub struct Reconstructor {
    alignment: Alignment,
    tree: Tree,
    model: RateModel,
    options: ReconstructionOptions,
}

/// An immutable, `Arc`-shared reconstructor ready for `run()`.
pub struct SealedReconstructor {
    alignment: Alignment,
    context: Arc<ReconstructionContext>,
    options: ReconstructionOptions,
}

impl Reconstructor {
    /// Loads an alignment, a caller-prepared tree topology, and a
    /// substitution model. Leaves must have a one-to-one correspondence with
    /// alignment records; violations fail fast with [`ReconstructionError`].
    pub fn new(
        records: &[(String, String)],
        topology: InputNode,
        model: RateModel,
        options: ReconstructionOptions,
    ) -> ReconstructionResult<Self> {
        tracing::info!(taxa = records.len(), "loading alignment");
        let mut alignment = Alignment::from_records(records)?;

        let taxon_rows: hashbrown::HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();

        let tree = Tree::prepare(topology, &taxon_rows)?;

        let extra_labels: Vec<Box<str>> = std::iter::once(tree.root())
            .chain(tree.non_root_nodes())
            .filter(|id| !tree.node(*id).is_leaf)
            .map(|id| tree.node(id).label.clone())
            .collect();
        alignment.extend_rows(extra_labels);

        if options.verbose {
            tracing::debug!(node_count = tree.node_count(), "tree prepared");
        }

        Ok(Self { alignment, tree, model, options })
    }

    /// Attaches `log P(t)` to every branch and compresses the alignment into
    /// unique site patterns, then freezes the result for concurrent use.
    pub fn seal(self) -> ReconstructionResult<SealedReconstructor> {
        let q = self.model.rate_matrix();
        let mut tree = self.tree;
        transition::attach_to_tree(&mut tree, &q)?;

        let n_leaf_rows = leaf_count(&tree);
        let patterns = pattern::compress(&self.alignment, n_leaf_rows);

        tracing::debug!(pattern_count = patterns.len(), "site patterns compressed");

        let context = Arc::new(ReconstructionContext { tree, pi: self.model.pi, patterns });

        Ok(SealedReconstructor {
            alignment: self.alignment,
            context,
            options: self.options,
        })
    }
}

impl SealedReconstructor {
    /// Runs the parallel driver over every unique pattern and assembles the
    /// joint alignment and the SNP-annotated tree.
    pub fn run(&self) -> ReconstructionResult<ReconstructionOutput> {
        let driver_output = driver::run(
            &self.context.tree,
            &self.context.pi,
            &self.context.patterns,
            self.options.workers,
        )?;

        Ok(ReconstructionOutput::assemble(
            self.alignment.clone(),
            self.context.tree.clone(),
            driver_output,
        ))
    }

    pub fn context(&self) -> &Arc<ReconstructionContext> {
        &self.context
    }
}

fn leaf_count(tree: &Tree) -> usize {
    tree.non_root_nodes()
        .chain(std::iter::once(tree.root()))
        .filter(|id| tree.node(*id).is_leaf)
        .count()
}

/// One-shot convenience wrapper: build, seal, and run in a single call.
pub fn reconstruct(
    records: &[(String, String)],
    topology: InputNode,
    model: RateModel,
    options: ReconstructionOptions,
) -> ReconstructionResult<ReconstructionOutput> {
    Reconstructor::new(records, topology, model, options)?.seal()?.run()
}
