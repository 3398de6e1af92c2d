use hashnms::{
    BoxSet, ChainConfig, HashGridConfig, HashNmsError, MultiHashChain, OwnedBoxSet, Rect,
    SingleHashStage,
};

#[test]
fn box_set_rejects_mismatched_lengths() {
    let boxes = [Rect::new(0.0, 0.0, 1.0, 1.0); 3];
    let err = BoxSet::new(&boxes, &[0.1, 0.2]).err().unwrap();
    assert_eq!(err, HashNmsError::LengthMismatch { boxes: 3, scores: 2 });

    let err = OwnedBoxSet::new(boxes.to_vec(), vec![]).err().unwrap();
    assert_eq!(err, HashNmsError::LengthMismatch { boxes: 3, scores: 0 });
}

#[test]
fn nms_slices_surfaces_length_mismatch() {
    let boxes = [Rect::new(0.0, 0.0, 1.0, 1.0)];
    let err = hashnms::nms_slices(&boxes, &[], 0.5).err().unwrap();
    assert_eq!(err, HashNmsError::LengthMismatch { boxes: 1, scores: 0 });
}

#[test]
fn empty_sets_are_valid() {
    let set = BoxSet::new(&[], &[]).unwrap();
    assert!(set.is_empty());
    assert!(hashnms::nms(set, 0.5).unwrap().is_empty());
    let stage = SingleHashStage::new(1.0, 1.0, 0.5, 0.5, 0.5).unwrap();
    assert!(stage.apply(set).is_empty());
}

#[test]
fn grid_accessors_return_construction_values() {
    let grid = HashGridConfig::new(1.5, 2.5, 0.7, 0.25, 0.75).unwrap();
    assert_eq!(grid.w0(), 1.5);
    assert_eq!(grid.h0(), 2.5);
    assert_eq!(grid.alpha(), 0.7);
    assert_eq!(grid.bx(), 0.25);
    assert_eq!(grid.by(), 0.75);

    let stage = SingleHashStage::from_grid(grid).with_parallel(true);
    assert_eq!(stage.grid(), &grid);
    assert!(stage.parallel());
}

#[test]
fn chain_config_defaults_and_errors() {
    let cfg = ChainConfig::default();
    assert_eq!(cfg.num_stages, 4);
    assert_eq!(cfg.alpha, 0.7);
    assert!(!cfg.parallel);

    let chain = MultiHashChain::new(cfg.clone()).unwrap();
    assert_eq!(chain.config(), &cfg);
    assert!(!chain.is_empty());

    let err = MultiHashChain::new(ChainConfig {
        num_stages: 0,
        ..cfg.clone()
    })
    .err()
    .unwrap();
    assert_eq!(err, HashNmsError::InvalidStageCount);

    let err = MultiHashChain::new(ChainConfig { alpha: 0.0, ..cfg })
        .err()
        .unwrap();
    assert_eq!(err, HashNmsError::InvalidInput("alpha must be finite and > 0"));
}

#[test]
fn errors_render_readable_messages() {
    assert_eq!(
        HashNmsError::LengthMismatch { boxes: 4, scores: 3 }.to_string(),
        "length mismatch: 4 boxes but 3 scores"
    );
    assert_eq!(
        HashNmsError::InvalidInput("w0 must be finite and > 0").to_string(),
        "invalid input: w0 must be finite and > 0"
    );
}
