use crate::config::Heuristic;
use crate::model::{PlacedRect, Rect};

/// Where a request would go and how good that spot is.
///
/// Lower scores are better for every heuristic. `free_index` identifies the
/// free region the placement was taken from, in the scanned slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredPlacement {
    /// Placed rectangle in stored orientation.
    pub rect: Rect,
    pub rotated: bool,
    pub free_index: usize,
    pub primary: i128,
    pub secondary: i128,
}

impl ScoredPlacement {
    /// Strict lexicographic (primary, secondary) improvement; equal scores keep the incumbent.
    pub fn beats(&self, other: &ScoredPlacement) -> bool {
        (self.primary, self.secondary) < (other.primary, other.secondary)
    }
}

/// Read-only view of the bin state a heuristic needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScoreContext<'a> {
    pub(crate) bin_width: u32,
    pub(crate) bin_height: u32,
    pub(crate) used: &'a [PlacedRect],
    pub(crate) allow_rotation: bool,
}

/// Scans `free` for the best spot for a `w` x `h` request (and its rotation).
///
/// Returns `None` when neither orientation fits any free region.
pub(crate) fn find_position(
    free: &[Rect],
    ctx: &ScoreContext<'_>,
    w: u32,
    h: u32,
    heuristic: Heuristic,
) -> Option<ScoredPlacement> {
    let mut best: Option<ScoredPlacement> = None;
    let try_rotated = ctx.allow_rotation && w != h;

    for (free_index, fr) in free.iter().enumerate() {
        let orientations = [(w, h, false), (h, w, true)];
        for &(cw, ch, rotated) in orientations.iter().take(if try_rotated { 2 } else { 1 }) {
            if fr.w < cw || fr.h < ch {
                continue;
            }
            let (primary, secondary) = score(fr, cw, ch, heuristic, ctx);
            let candidate = ScoredPlacement {
                rect: Rect::new(fr.x, fr.y, cw, ch),
                rotated,
                free_index,
                primary,
                secondary,
            };
            if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                best = Some(candidate);
            }
        }
    }
    best
}

/// (primary, secondary) score of putting a `w` x `h` rectangle at the top-left of `fr`.
///
/// Scores are `i128` so areas of any two `u32` sides never overflow.
fn score(fr: &Rect, w: u32, h: u32, heuristic: Heuristic, ctx: &ScoreContext<'_>) -> (i128, i128) {
    let leftover_h = fr.w as i128 - w as i128;
    let leftover_v = fr.h as i128 - h as i128;
    let short_fit = leftover_h.min(leftover_v);
    let long_fit = leftover_h.max(leftover_v);
    match heuristic {
        Heuristic::BestShortSideFit => (short_fit, long_fit),
        Heuristic::BestLongSideFit => (long_fit, short_fit),
        Heuristic::BestAreaFit => (fr.area() as i128 - (w as i128 * h as i128), short_fit),
        Heuristic::BottomLeft => (fr.y as i128 + h as i128, fr.x as i128),
        Heuristic::ContactPoint => {
            // more contact is better, so negate for minimization; no tie-break
            let contact = contact_point_score(ctx, &Rect::new(fr.x, fr.y, w, h));
            (-(contact as i128), i128::MAX)
        }
    }
}

/// Length of `node`'s boundary that touches the bin edges or a used rectangle.
///
/// A bin edge pair counts at most once per axis: touching the left or right
/// bin edge adds `h`, touching the top or bottom bin edge adds `w`.
pub(crate) fn contact_point_score(ctx: &ScoreContext<'_>, node: &Rect) -> u64 {
    let mut score = 0u64;
    if node.x == 0 || node.right() == ctx.bin_width {
        score += node.h as u64;
    }
    if node.y == 0 || node.bottom() == ctx.bin_height {
        score += node.w as u64;
    }

    for u in ctx.used.iter().map(PlacedRect::rect) {
        // left/right edges
        if u.x == node.right() || u.right() == node.x {
            score += overlap_1d(u.y, u.bottom(), node.y, node.bottom()) as u64;
        }
        // top/bottom edges
        if u.y == node.bottom() || u.bottom() == node.y {
            score += overlap_1d(u.x, u.right(), node.x, node.right()) as u64;
        }
    }
    score
}

fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    let start = a1.max(b1);
    let end = a2.min(b2);
    end.saturating_sub(start)
}
