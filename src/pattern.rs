//! Component C: site-pattern compressor.
//!
//! Deduplicates alignment columns the way a string interner deduplicates
//! strings: each unique N-character column vector is assigned one id, and
//! every column index sharing that vector is recorded against it. Bucket
//! order preserves ascending column index by construction, since columns
//! are scanned left to right.

use hashbrown::HashMap as FastHashMap;

use crate::alignment::Alignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub u32);

/// One unique site pattern: the leaf-column byte vector that defines it, and
/// the (ascending) list of original column indices sharing that vector.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub bases: Box<[u8]>,
    pub columns: Vec<usize>,
}

/// Compresses an alignment's `L` columns into unique site patterns over its
/// first `n_leaf_rows` rows (the taxa; internal placeholder rows never
/// participate in pattern identity).
pub fn compress(alignment: &Alignment, n_leaf_rows: usize) -> Vec<Pattern> {
    let mut index: FastHashMap<Box<[u8]>, usize> = FastHashMap::new();
    let mut patterns: Vec<Pattern> = Vec::new();

    for col in 0..alignment.cols() {
        let mut key = Vec::with_capacity(n_leaf_rows);
        for row in 0..n_leaf_rows {
            key.push(alignment.cell(row, col));
        }
        let key: Box<[u8]> = key.into_boxed_slice();

        match index.get(&key) {
            Some(&pattern_idx) => patterns[pattern_idx].columns.push(col),
            None => {
                index.insert(key.clone(), patterns.len());
                patterns.push(Pattern { bases: key, columns: vec![col] });
            }
        }
    }

    patterns
}
