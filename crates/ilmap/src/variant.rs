use fnv::FnvHashSet;

use crate::peptide::Peptide;
use crate::Error;

pub const DEFAULT_MAX_AMBIGUOUS: usize = 16;

/// Expands a peptide into every I/L-substitution variant.
///
/// A peptide with `n` ambiguous positions has `2^n - 1` variants, one for
/// each non-empty subset of positions flipped. The peptide itself is never
/// part of the returned set - callers that need the full candidate pool must
/// add it explicitly, which keeps canonical and substitution provenance
/// separate downstream.
#[derive(Copy, Clone, Debug)]
pub struct VariantGenerator {
    max_ambiguous: usize,
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AMBIGUOUS)
    }
}

impl VariantGenerator {
    pub fn new(max_ambiguous: usize) -> Self {
        // subsets are enumerated with a u64 bitmask
        Self {
            max_ambiguous: max_ambiguous.min(63),
        }
    }

    pub fn max_ambiguous(&self) -> usize {
        self.max_ambiguous
    }

    pub fn expand(&self, peptide: &Peptide) -> Result<FnvHashSet<String>, Error> {
        let positions = peptide.ambiguous_positions();
        let n = positions.len();
        if n > self.max_ambiguous {
            return Err(Error::VariantExplosion {
                sequence: peptide.as_str().into(),
                positions: n,
                limit: self.max_ambiguous,
            });
        }

        let mut variants = FnvHashSet::default();
        let bytes = peptide.as_str().as_bytes();
        for mask in 1..(1u64 << n) {
            let mut flipped = bytes.to_vec();
            for (bit, &pos) in positions.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    flipped[pos] = match flipped[pos] {
                        b'I' => b'L',
                        b'L' => b'I',
                        other => unreachable!("BUG: non-I/L residue {} at flip position", other as char),
                    };
                }
            }
            variants.insert(String::from_utf8(flipped).expect("BUG: I/L flip must preserve utf-8"));
        }
        Ok(variants)
    }
}
