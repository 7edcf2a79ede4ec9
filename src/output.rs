//! Component G: output assembler.
//!
//! Folds the driver's per-worker results into the shared alignment and the
//! tree's edge lengths, then serialises both artifacts by hand — FASTA and
//! Newick are simple enough line-oriented formats that a dependency would
//! be disproportionate.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::alignment::Alignment;
use crate::driver::DriverOutput;
use crate::tree::Tree;

/// The two artifacts named in the engine's external contract: the extended
/// alignment (taxa + reconstructed ancestors) and the tree with branch
/// lengths replaced by SNP counts.
pub struct ReconstructionOutput {
    pub alignment: Alignment,
    pub tree: Tree,
}

impl ReconstructionOutput {
    /// Applies a driver's results: writes every reconstructed cell, then
    /// zeroes every edge length and sets it to that branch's total SNP
    /// contribution across all patterns.
    pub fn assemble(mut alignment: Alignment, mut tree: Tree, driver_output: DriverOutput) -> Self {
        for (row, col, ch) in driver_output.cells {
            alignment.set_cell(row, col, ch);
        }

        for id in tree.non_root_nodes().collect::<Vec<_>>() {
            let label = tree.node(id).label.clone();
            let snps = driver_output.snp_totals.get(label.as_ref()).copied().unwrap_or(0);
            tree.node_mut(id).branch_length = snps as f64;
        }

        Self { alignment, tree }
    }

    /// Writes the joint alignment as FASTA, taxa first in input order,
    /// followed by internal nodes in creation order.
    pub fn write_fasta(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut w = BufWriter::new(std::fs::File::create(path)?);
        self.write_fasta_to(&mut w)
    }

    pub fn write_fasta_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for row in 0..self.alignment.rows() {
            writeln!(w, ">{}", self.alignment.label(row))?;
            w.write_all(self.alignment.row_slice(row))?;
            writeln!(w)?;
        }
        Ok(())
    }

    /// Writes the tree as Newick, root marker elided, internal node labels
    /// suppressed, quoting stripped so labels appear bare.
    pub fn write_newick(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut w = BufWriter::new(std::fs::File::create(path)?);
        self.write_newick_to(&mut w)
    }

    pub fn write_newick_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut s = String::new();
        write_node(&self.tree, self.tree.root(), &mut s, true);
        writeln!(w, "{s};")
    }
}

fn write_node(tree: &Tree, id: crate::tree::NodeId, out: &mut String, is_root: bool) {
    let node = tree.node(id);
    if node.is_leaf {
        out.push_str(bare(&node.label).as_str());
        if !is_root {
            out.push(':');
            out.push_str(&format_branch_length(node.branch_length));
        }
        return;
    }

    out.push('(');
    for (i, &child) in node.children.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_node(tree, child, out, false);
    }
    out.push(')');
    if !is_root {
        out.push(':');
        out.push_str(&format_branch_length(node.branch_length));
    }
}

fn bare(label: &str) -> String {
    label.replace(['\'', '"'], "")
}

fn format_branch_length(length: f64) -> String {
    if length.fract() == 0.0 {
        format!("{length:.1}")
    } else {
        format!("{length}")
    }
}
