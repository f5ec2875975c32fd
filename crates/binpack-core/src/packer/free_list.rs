use crate::model::Rect;

/// Candidate free regions of a MaxRects bin.
///
/// Regions may overlap each other. After [`FreeList::prune`] no region is
/// contained in another.
#[derive(Debug, Clone, Default)]
pub(crate) struct FreeList {
    rects: Vec<Rect>,
}

impl FreeList {
    /// A free list covering the whole bin.
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            rects: vec![Rect::new(0, 0, width, height)],
        }
    }

    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    pub(crate) fn len(&self) -> usize {
        self.rects.len()
    }

    /// Carves `used` out of every intersecting region, then prunes.
    ///
    /// Split regions are replaced by their children, appended after the
    /// regions that were left untouched.
    pub(crate) fn place(&mut self, used: &Rect) {
        let mut children = Vec::new();
        self.rects
            .retain(|fr| !split_free_node(fr, used, &mut children));
        self.rects.extend(children);
        self.prune();
    }

    /// Removes every region fully contained in another region.
    ///
    /// Of two identical regions, the one that comes first is removed.
    pub(crate) fn prune(&mut self) {
        let mut i = 0;
        while i < self.rects.len() {
            let a = self.rects[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.rects.len() {
                let b = self.rects[j];
                if b.contains(&a) {
                    remove_i = true;
                    break;
                }
                if a.contains(&b) {
                    self.rects.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.rects.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

/// Splits `free` against the newly placed `used` rectangle.
///
/// Returns false, pushing nothing, when the two do not overlap. Otherwise
/// pushes the top, bottom, left and right strips of `free` that `used` does
/// not cover (zero-area strips are skipped) and returns true: the caller must
/// drop `free` in favour of the pushed children.
pub(crate) fn split_free_node(free: &Rect, used: &Rect, out: &mut Vec<Rect>) -> bool {
    if free.disjoint(used) {
        return false;
    }

    let mut push = |r: Rect| {
        if !r.is_empty() {
            out.push(r);
        }
    };

    if used.x < free.right() && used.right() > free.x {
        // above
        if used.y > free.y && used.y < free.bottom() {
            push(Rect::new(free.x, free.y, free.w, used.y - free.y));
        }
        // below
        if used.bottom() < free.bottom() {
            push(Rect::new(
                free.x,
                used.bottom(),
                free.w,
                free.bottom() - used.bottom(),
            ));
        }
    }

    if used.y < free.bottom() && used.bottom() > free.y {
        // left
        if used.x > free.x && used.x < free.right() {
            push(Rect::new(free.x, free.y, used.x - free.x, free.h));
        }
        // right
        if used.right() < free.right() {
            push(Rect::new(
                used.right(),
                free.y,
                free.right() - used.right(),
                free.h,
            ));
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_rects_do_not_split() {
        let mut out = Vec::new();
        let free = Rect::new(0, 0, 4, 4);
        assert!(!split_free_node(&free, &Rect::new(4, 0, 2, 2), &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn centered_rect_leaves_four_strips() {
        let mut out = Vec::new();
        let free = Rect::new(0, 0, 10, 10);
        assert!(split_free_node(&free, &Rect::new(3, 4, 2, 2), &mut out));
        assert_eq!(
            out,
            vec![
                Rect::new(0, 0, 10, 4),
                Rect::new(0, 6, 10, 4),
                Rect::new(0, 0, 3, 10),
                Rect::new(5, 0, 5, 10),
            ]
        );
    }

    #[test]
    fn corner_rect_leaves_two_strips() {
        let mut out = Vec::new();
        let free = Rect::new(0, 0, 10, 10);
        assert!(split_free_node(&free, &Rect::new(0, 0, 10, 3), &mut out));
        assert_eq!(out, vec![Rect::new(0, 3, 10, 7)]);
    }

    #[test]
    fn full_cover_consumes_region() {
        let mut out = Vec::new();
        let free = Rect::new(2, 2, 3, 3);
        assert!(split_free_node(&free, &Rect::new(0, 0, 10, 10), &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn prune_keeps_one_of_identical_regions() {
        let mut list = FreeList {
            rects: vec![
                Rect::new(0, 0, 5, 5),
                Rect::new(1, 1, 2, 2),
                Rect::new(0, 0, 5, 5),
                Rect::new(4, 0, 6, 2),
            ],
        };
        list.prune();
        assert_eq!(
            list.as_slice(),
            &[Rect::new(0, 0, 5, 5), Rect::new(4, 0, 6, 2)]
        );
    }

    #[test]
    fn place_keeps_maximal_regions_only() {
        let mut list = FreeList::new(8, 8);
        list.place(&Rect::new(0, 0, 3, 3));
        assert_eq!(
            list.as_slice(),
            &[Rect::new(0, 3, 8, 5), Rect::new(3, 0, 5, 8)]
        );
        for (i, a) in list.as_slice().iter().enumerate() {
            for (j, b) in list.as_slice().iter().enumerate() {
                assert!(i == j || !b.contains(a), "{a:?} is redundant");
            }
        }
    }
}
