use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::kana::Kana;

/// Keys drawn so far in the current pass over the pool.
pub type SeenKeys = HashSet<&'static str>;

/// Draw one record from `pool`, preferring keys not yet in `seen`.
///
/// Once `seen` holds at least as many keys as the pool, the pass is over
/// and `seen` starts again from empty, so the next card may repeat the
/// one just shown. Returns `None` only for an empty pool.
pub fn draw<R: Rng + ?Sized>(
    pool: &[&'static Kana],
    seen: &mut SeenKeys,
    rng: &mut R,
) -> Option<&'static Kana> {
    if pool.is_empty() {
        return None;
    }

    if seen.len() >= pool.len() {
        seen.clear();
    }

    let unused: Vec<&'static Kana> = pool
        .iter()
        .copied()
        .filter(|k| !seen.contains(k.key()))
        .collect();
    let candidates = if unused.is_empty() { pool } else { &unused[..] };

    let selected = *candidates.choose(rng)?;
    seen.insert(selected.key());
    Some(selected)
}
