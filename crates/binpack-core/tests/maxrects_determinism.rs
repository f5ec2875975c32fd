use binpack_core::config::Heuristic;
use binpack_core::model::{PlacedRect, RectSize};
use binpack_core::packer::{BinPack, MaxRectsBinPack};
use rand::{Rng, SeedableRng};

fn random_requests(seed: u64, count: usize) -> Vec<RectSize> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| RectSize::new(format!("r{i}"), rng.gen_range(4..=64), rng.gen_range(4..=64)))
        .collect()
}

fn pack(requests: Vec<RectSize>, heuristic: Heuristic) -> Vec<PlacedRect> {
    let mut p = MaxRectsBinPack::with_size(512, 512).unwrap();
    p.insert_batch(requests, heuristic).unwrap()
}

#[test]
fn maxrects_repeatable() {
    for heuristic in Heuristic::ALL {
        let a = pack(random_requests(42, 120), heuristic);
        let b = pack(random_requests(42, 120), heuristic);
        assert_eq!(a, b, "{heuristic} is not deterministic");
    }
}

#[test]
fn batch_output_names_are_a_subset_of_input() {
    let requests = random_requests(7, 200);
    let names: std::collections::HashSet<String> =
        requests.iter().map(|r| r.name.clone()).collect();
    let placed = pack(requests, Heuristic::BestShortSideFit);
    let mut seen = std::collections::HashSet::new();
    for p in &placed {
        assert!(names.contains(&p.name));
        assert!(seen.insert(p.name.clone()), "{} placed twice", p.name);
    }
}
