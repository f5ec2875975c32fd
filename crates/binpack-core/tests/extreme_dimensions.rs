use binpack_core::config::{Heuristic, Strategy};
use binpack_core::packer::{BinPack, BinPacker, MaxRectsBinPack};

#[test]
fn full_u32_bin_takes_a_full_u32_rect() {
    for heuristic in Heuristic::ALL {
        let mut p = MaxRectsBinPack::with_size(u32::MAX, u32::MAX).unwrap();
        let r = p.insert_one(u32::MAX, u32::MAX, heuristic).unwrap();
        assert!(!r.is_empty(), "{heuristic} found no fit");
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, u32::MAX, u32::MAX));
        assert_eq!(p.occupancy().unwrap(), 1.0);
        assert!(p.free_rectangles().is_empty());
    }
}

#[test]
fn huge_halves_share_a_u32_bin() {
    let half = u32::MAX / 2;
    for strategy in [Strategy::MaxRects, Strategy::Guillotine] {
        for heuristic in Heuristic::ALL {
            let mut p = BinPacker::new(strategy);
            p.init(u32::MAX, u32::MAX).unwrap();
            let a = p.insert_one(u32::MAX, half, heuristic).unwrap();
            let b = p.insert_one(u32::MAX, half, heuristic).unwrap();
            assert!(!a.is_empty() && !b.is_empty(), "{strategy:?}/{heuristic}");
            assert!(a.rect().disjoint(&b.rect()));
            // a strip taller than what is left must not fit
            let c = p.insert_one(u32::MAX, 3, heuristic).unwrap();
            assert!(c.is_empty(), "{strategy:?}/{heuristic}: {c:?}");
            let occ = p.occupancy().unwrap();
            assert!(occ > 0.99 && occ <= 1.0);
        }
    }
}
