use binpack_core::config::Heuristic;
use binpack_core::model::{DisjointRectCollection, RectSize};
use binpack_core::packer::{BinPack, MaxRectsBinPack};
use rand::{Rng, SeedableRng};

const BIN: u32 = 128;

fn check_invariants(p: &MaxRectsBinPack) {
    let used = p.used_rectangles();
    let mut disjoint = DisjointRectCollection::new();
    for u in &used {
        assert!(disjoint.add(u.rect()), "{u:?} overlaps an earlier placement");
        assert!(u.x + u.width <= BIN && u.y + u.height <= BIN, "{u:?} outside bin");
    }

    let free = p.free_rectangles();
    for (i, a) in free.iter().enumerate() {
        assert!(!a.is_empty());
        for (j, b) in free.iter().enumerate() {
            assert!(i == j || !b.contains(a), "free {a:?} is contained in {b:?}");
        }
        for u in &used {
            assert!(a.disjoint(&u.rect()), "free {a:?} overlaps used {u:?}");
        }
    }

    let occ = p.occupancy().unwrap();
    assert!((0.0..=1.0).contains(&occ));
}

#[test]
fn single_insert_keeps_invariants() {
    for heuristic in Heuristic::ALL {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1234);
        let mut p = MaxRectsBinPack::with_size(BIN, BIN).unwrap();
        check_invariants(&p);
        for _ in 0..150 {
            let w = rng.gen_range(1..=40);
            let h = rng.gen_range(1..=40);
            p.insert_one(w, h, heuristic).unwrap();
            check_invariants(&p);
        }
    }
}

#[test]
fn batch_insert_keeps_invariants() {
    for heuristic in Heuristic::ALL {
        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let requests: Vec<RectSize> = (0..80)
            .map(|i| RectSize::new(format!("r{i}"), rng.gen_range(2..=30), rng.gen_range(2..=30)))
            .collect();
        let mut p = MaxRectsBinPack::with_size(BIN, BIN).unwrap();
        let placed = p.insert_batch(requests, heuristic).unwrap();
        assert_eq!(placed.len(), p.used_rectangles().len());
        check_invariants(&p);
    }
}
