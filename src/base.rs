//! The canonical nucleotide alphabet and the gap/ambiguity sentinel.

pub const GAP: u8 = b'-';

/// Index of a concrete base in `A, C, G, T` order. `rho` and `Q` are both
/// indexed this way.
pub const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Maps a concrete base byte to its index in [`BASES`], or `None` for any
/// ambiguity code or gap.
#[inline]
pub fn base_index(b: u8) -> Option<usize> {
    match b {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

#[inline]
pub fn is_concrete(b: u8) -> bool {
    base_index(b).is_some()
}

/// Unordered-pair index into `rho` for bases `i` and `j` (i != j), in the
/// fixed order: AC, AG, AT, CG, CT, GT.
#[inline]
pub fn rho_index(i: usize, j: usize) -> usize {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    match (lo, hi) {
        (0, 1) => 0, // AC
        (0, 2) => 1, // AG
        (0, 3) => 2, // AT
        (1, 2) => 3, // CG
        (1, 3) => 4, // CT
        (2, 3) => 5, // GT
        _ => unreachable!("base index out of range: {lo}, {hi}"),
    }
}
