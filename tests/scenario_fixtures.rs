//! Table-driven scenarios loaded from `tests/data/scenarios.json`.

use hashnms::{nms, BoxSet, MultiHashChain, Rect};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Fixtures {
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    boxes: Vec<[f32; 4]>,
    scores: Vec<f32>,
    iou_threshold: f32,
    num_stages: usize,
    alpha: f32,
    expected_nms: Vec<usize>,
    expected_chain: Vec<usize>,
}

fn load_fixtures() -> Fixtures {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/scenarios.json");
    let text = fs::read_to_string(&path).expect("read scenarios.json");
    serde_json::from_str(&text).expect("parse scenarios.json")
}

#[test]
fn fixtures_match_expected_keep_indices() {
    let fixtures = load_fixtures();
    assert!(!fixtures.cases.is_empty());

    for case in &fixtures.cases {
        let boxes: Vec<Rect> = case.boxes.iter().copied().map(Rect::from).collect();
        let set = BoxSet::new(&boxes, &case.scores).unwrap();

        let exact = nms(set, case.iou_threshold).unwrap();
        assert_eq!(exact, case.expected_nms, "nms mismatch in {}", case.case_id);

        let chain = MultiHashChain::with_stages(case.num_stages, case.alpha).unwrap();
        assert_eq!(
            chain.apply(set),
            case.expected_chain,
            "chain mismatch in {}",
            case.case_id
        );
    }
}
