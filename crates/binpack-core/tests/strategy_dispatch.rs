use binpack_core::config::{Heuristic, PackerConfig, Strategy};
use binpack_core::error::BinPackError;
use binpack_core::model::RectSize;
use binpack_core::packer::{BinPack, BinPacker};

fn fill<P: BinPack>(packer: &mut P) -> usize {
    let requests = (0..16)
        .map(|i| RectSize::new(format!("q{i}"), 4, 4))
        .collect();
    packer.insert_batch(requests, Heuristic::BestShortSideFit).unwrap().len()
}

#[test]
fn strategies_are_interchangeable() {
    for strategy in [Strategy::MaxRects, Strategy::Guillotine] {
        let mut packer = BinPacker::new(strategy);
        assert_eq!(packer.strategy(), strategy);
        assert!(matches!(packer.occupancy(), Err(BinPackError::UninitializedBin)));

        packer.init(16, 16).unwrap();
        assert_eq!(fill(&mut packer), 16, "{strategy:?}");
        assert_eq!(packer.occupancy().unwrap(), 1.0);

        packer.init(16, 16).unwrap();
        assert_eq!(packer.occupancy().unwrap(), 0.0);
        assert!(packer.used_rectangles().is_empty());
    }
}

#[test]
fn from_config_initializes_the_bin() {
    let cfg = PackerConfig::builder()
        .with_dimensions(32, 8)
        .strategy(Strategy::Guillotine)
        .allow_rotation(false)
        .build();
    let mut packer = BinPacker::from_config(&cfg).unwrap();
    assert_eq!(packer.bin_size(), Some((32, 8)));
    let r = packer.insert_one(4, 16, Heuristic::BottomLeft).unwrap();
    assert!(r.is_empty(), "rotation is disabled");

    let bad = PackerConfig::builder().with_dimensions(0, 8).build();
    assert!(matches!(
        BinPacker::from_config(&bad),
        Err(BinPackError::InvalidDimension { .. })
    ));
}
