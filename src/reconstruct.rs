//! Component E: per-pattern joint reconstructor.
//!
//! Pupko et al.'s linear-time joint reconstruction as a two-pass
//! stack-based walk over the prepared tree: post-order to fill
//! likelihoods, pre-order to propagate the winning ancestral state back
//! down.
//!
//! This is a pure function over borrowed, read-only shared state
//! (`ReconstructionScratch` is the only thing that gets mutated, and it is
//! private to one worker's call).

use crate::base::{BASES, GAP, base_index};
use crate::pattern::Pattern;
use crate::tree::Tree;

/// Per-pattern scratch state, recycled across patterns within one worker to
/// avoid repeated allocation.
pub struct ReconstructionScratch {
    /// `L[node * 4 + base]`: best joint log-likelihood of the subtree rooted
    /// at `node` conditional on its parent carrying `base`.
    l: Vec<f64>,
    /// `C[node * 4 + base]`: the base assigned to `node` attaining that best.
    /// `-1` means unset.
    c: Vec<i8>,
    /// DP-chosen base index per node (post pre-order cascade, pre gap-fix).
    dp_r: Vec<i8>,
    /// Final emitted character per node, after gap propagation.
    final_r: Vec<u8>,
}

impl ReconstructionScratch {
    pub fn new(node_count: usize) -> Self {
        Self {
            l: vec![f64::NEG_INFINITY; node_count * 4],
            c: vec![-1; node_count * 4],
            dp_r: vec![-1; node_count],
            final_r: vec![GAP; node_count],
        }
    }

    fn reset(&mut self) {
        self.l.fill(f64::NEG_INFINITY);
        self.c.fill(-1);
        self.dp_r.fill(-1);
        self.final_r.fill(GAP);
    }
}

/// Result of reconstructing one site pattern: the emitted character for
/// every internal-node row, and the per-branch SNP contribution (already
/// multiplied by the pattern's column count).
pub struct PatternResult {
    /// `(alignment row, character)` for every non-leaf node.
    pub internal_rows: Vec<(usize, u8)>,
    /// Branch label -> SNP contribution for this pattern.
    pub snp: hashbrown::HashMap<Box<str>, u64>,
}

/// Reconstructs the ancestral states for one site pattern.
///
/// `n_leaf_rows` is the number of alignment rows that are taxa (and hence
/// the length of `pattern.bases`); tree leaves index into it via their own
/// `row` field.
pub fn reconstruct_pattern(
    tree: &Tree,
    pi: &[f64; 4],
    pattern: &Pattern,
    scratch: &mut ReconstructionScratch,
) -> PatternResult {
    scratch.reset();

    let columnbases: Vec<usize> = (0..4)
        .filter(|&i| pattern.bases.iter().any(|&b| base_index(b) == Some(i)))
        .collect();

    if columnbases.is_empty() {
        // EmptyColumnBases: the pattern is trivially all-gap. Fill every
        // internal row with a gap and contribute no SNPs.
        let internal_rows = tree
            .non_root_nodes()
            .chain(std::iter::once(tree.root()))
            .filter(|id| !tree.node(*id).is_leaf)
            .map(|id| (tree.node(id).row, GAP))
            .collect();
        return PatternResult { internal_rows, snp: hashbrown::HashMap::new() };
    }

    // Step 1: post-order over non-root nodes.
    for &id in tree.postorder() {
        if id == tree.root() {
            continue;
        }
        let node = tree.node(id);
        let log_p = node.log_p.expect("non-root node must have a transition matrix");

        if node.is_leaf {
            let observed = pattern.bases[node.row];
            match base_index(observed) {
                Some(j) => {
                    for &i in &columnbases {
                        scratch.c[id.index() * 4 + i] = j as i8;
                        scratch.l[id.index() * 4 + i] = log_p[i][j];
                    }
                }
                None => {
                    for &i in &columnbases {
                        scratch.c[id.index() * 4 + i] = i as i8;
                        scratch.l[id.index() * 4 + i] = log_p[i][i];
                    }
                }
            }
        } else {
            for &i in &columnbases {
                scratch.l[id.index() * 4 + i] = f64::NEG_INFINITY;
                scratch.c[id.index() * 4 + i] = -1;
            }
            let children = &tree.node(id).children;
            for &end in &columnbases {
                let s_end: f64 = children
                    .iter()
                    .map(|&child| scratch.l[child.index() * 4 + end])
                    .sum();
                for &start in &columnbases {
                    let j = log_p[start][end] + s_end;
                    if j > scratch.l[id.index() * 4 + start] {
                        scratch.l[id.index() * 4 + start] = j;
                        scratch.c[id.index() * 4 + start] = end as i8;
                    }
                }
            }
        }
    }

    // Step 2: root relaxation. Substitutes the prior log pi[end] for the
    // (nonexistent) parent-transition term. Always applied to the root
    // explicitly, regardless of postorder iteration order (the source's
    // reliance on "whichever node the loop variable last pointed to" is not
    // replicated).
    let root = tree.root();
    let root_children = &tree.node(root).children;
    let mut root_temp: usize = columnbases[0];
    let mut root_best = f64::NEG_INFINITY;
    for &end in &columnbases {
        let s_end: f64 = root_children
            .iter()
            .map(|&child| scratch.l[child.index() * 4 + end])
            .sum();
        let j = pi[end].ln() + s_end;
        if j > root_best {
            root_best = j;
            root_temp = end;
        }
    }
    scratch.dp_r[root.index()] = root_temp as i8;

    // Step 3: pre-order, root to leaves.
    for &id in tree.preorder() {
        if id == root {
            continue;
        }
        let parent = tree.node(id).parent.expect("non-root node has a parent");
        let parent_r = scratch.dp_r[parent.index()] as usize;
        scratch.dp_r[id.index()] = scratch.c[id.index() * 4 + parent_r];
    }

    // Step 5: seed tiebreak. The root adopts the r of the child with the
    // largest branch length. On a branch-length tie, the smaller base wins
    // (the same lexicographic direction as step 1's argmax ties), with the
    // child's label as a final tiebreaker — applied before gap propagation,
    // since the tiebreak compares children's DP-chosen bases, not their
    // post-gap-fix values.
    if let Some(&winner) = root_children.iter().max_by(|&&a, &&b| {
        let na = tree.node(a);
        let nb = tree.node(b);
        let ra = BASES[scratch.dp_r[a.index()] as usize];
        let rb = BASES[scratch.dp_r[b.index()] as usize];
        (na.branch_length, std::cmp::Reverse(ra), na.label.as_ref())
            .partial_cmp(&(nb.branch_length, std::cmp::Reverse(rb), nb.label.as_ref()))
            .expect("branch lengths are finite")
    }) {
        scratch.dp_r[root.index()] = scratch.dp_r[winner.index()];
    }

    // Step 4 + 6: gap propagation and leaf reset, post-order over the whole
    // tree (root included), then SNP accounting and emission.
    for &id in tree.postorder() {
        let node = tree.node(id);
        if node.is_leaf {
            scratch.final_r[id.index()] = pattern.bases[node.row];
        } else {
            let has_concrete_child = node
                .children
                .iter()
                .any(|&c| base_index(scratch.final_r[c.index()]).is_some());
            scratch.final_r[id.index()] = if has_concrete_child {
                BASES[scratch.dp_r[id.index()] as usize]
            } else {
                GAP
            };
        }
    }

    let mut snp: hashbrown::HashMap<Box<str>, u64> = hashbrown::HashMap::new();
    let weight = pattern.columns.len() as u64;
    for id in tree.non_root_nodes() {
        let node = tree.node(id);
        let parent = node.parent.expect("non-root node has a parent");
        let this_base = base_index(scratch.final_r[id.index()]);
        let parent_base = base_index(scratch.final_r[parent.index()]);
        if let (Some(a), Some(b)) = (this_base, parent_base)
            && a != b
        {
            *snp.entry(node.label.clone()).or_insert(0) += weight;
        }
    }

    let internal_rows = tree
        .non_root_nodes()
        .chain(std::iter::once(root))
        .filter(|id| !tree.node(*id).is_leaf)
        .map(|id| (tree.node(id).row, scratch.final_r[id.index()]))
        .collect();

    PatternResult { internal_rows, snp }
}
