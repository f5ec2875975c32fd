use binpack_core::config::Heuristic;
use binpack_core::packer::{BinPack, MaxRectsBinPack};

#[test]
fn maxrects_rotates_when_only_rotated_fits() {
    for heuristic in Heuristic::ALL {
        let mut p = MaxRectsBinPack::with_size(16, 12).unwrap();
        let f = p.insert_one(8, 14, heuristic).unwrap();
        assert!(!f.is_empty(), "{heuristic}: rotated fit should succeed");
        assert!(f.rotated, "should rotate because only rotated fits");
        assert_eq!(f.width, 14);
        assert_eq!(f.height, 8);
    }
}

#[test]
fn maxrects_without_rotation_reports_no_fit() {
    let mut p = MaxRectsBinPack::with_size(16, 12)
        .unwrap()
        .with_rotation(false);
    let f = p.insert_one(8, 14, Heuristic::BestAreaFit).unwrap();
    assert!(f.is_empty());
    assert_eq!(p.occupancy().unwrap(), 0.0);
}
