//! Integration tests for the Converter API

use float_cmp::assert_approx_eq;

use beamline::{
    BeamlineError, Converter,
    attribute::Attribute,
    config::{AppConfig, DriftConfig, ExportConfig, SplitConfig},
    element::{Element, ElementKind},
    family::Family,
    lattice::Lattice,
    registry::Dialect,
    transform::split::{DipoleCuts, SplitPlan},
};

const FODO: &str = r#"
    QF: QUADRUPOLE, L = 0.5, K1 = 1.2;
    QD: QUADRUPOLE, L = 0.5, K1 = -1.2;
    B: SBEND, L = 2.0, ANGLE = 0.2;
    BPM: MONITOR;

    FODO: SEQUENCE, L = 8.0;
    QF, at = 0.5;
    B, at = 2.5;
    BPM, at = 3.75;
    QD, at = 4.5;
    B, at = 6.5;
    ENDSEQUENCE;
"#;

#[test]
fn test_converter_api_exists() {
    let _converter = Converter::default();
    let _converter = Converter::new(AppConfig::default());
}

#[test]
fn test_madx_round_trip() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).expect("Failed to parse");

    let text = converter
        .serialize(&lattice, Dialect::Madx)
        .expect("Failed to export");
    let reparsed = converter.parse(&text).expect("Failed to reparse export");

    assert_eq!(reparsed, lattice);
}

#[test]
fn test_marker_sequence_export() {
    let lattice = Lattice::new(
        Some("FODO".to_string()),
        8.0,
        vec![Element::new("TESTMARKER", ElementKind::new(Family::Marker)).with_at(2.0)],
    )
    .unwrap();

    let text = Converter::default()
        .serialize(&lattice, Dialect::Madx)
        .unwrap();

    assert_eq!(
        text,
        "TESTMARKER      : MARKER      ;\nFODO: SEQUENCE, L=8.0;\nTESTMARKER , at =     2.000000;\nENDSEQUENCE;"
    );
}

#[test]
fn test_every_dialect_exports() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).unwrap();

    let elegant = converter.serialize(&lattice, Dialect::Elegant).unwrap();
    assert!(elegant.contains("B               : CSBEND      , L="));
    assert!(elegant.ends_with("FODO: LINE=(QF, B, BPM, QD, B)"));

    let tracy = converter.serialize(&lattice, Dialect::Tracy).unwrap();
    assert!(tracy.contains("QD: Quadrupole, L = 0.5, K = -1.2, N = 10, Method = 4;\n"));
    assert!(tracy.contains("FODO: QF, B, BPM, QD, B;"));
    assert!(tracy.ends_with("ring: FODO;\ncell: ring, symmetry=1;\nend;"));
}

#[test]
fn test_tracy_integration_steps_from_config() {
    let config = AppConfig::new(
        ExportConfig::new(20, 80),
        SplitConfig::default(),
        DriftConfig::default(),
    );
    let converter = Converter::new(config);
    let lattice = converter.parse(FODO).unwrap();

    let tracy = converter.serialize(&lattice, Dialect::Tracy).unwrap();

    assert!(tracy.contains("N = 20, Method = 4;"));
}

#[test]
fn test_edit_scripts() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).unwrap();
    let monitors: Vec<Element> = lattice.filter_family(Family::Monitor).cloned().collect();

    let install = converter.install_script("FODO", &monitors).unwrap();
    assert!(install.contains("INSTALL, ELEMENT = BPM             , AT =     3.750000;\n"));

    let remove = converter.remove_script("FODO", &monitors);
    assert!(remove.contains("REMOVE, ELEMENT = BPM             ;\n"));

    let markers = converter.start_end_markers("FODO", lattice.length());
    assert!(markers.contains("AT =     8.000000;"));
}

#[test]
fn test_split_dipoles_subset() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).unwrap();
    let dipoles: Vec<Element> = lattice.filter_family(Family::Sbend).cloned().collect();
    let plan = SplitPlan::new(Some(0.1_f64.to_degrees()))
        .with_dipole("B", DipoleCuts::from_angles(vec![5.0]));

    let rows = converter.split_dipoles(&dipoles, &plan).unwrap();

    // Two placements, each with three pieces and two markers.
    assert_eq!(rows.len(), 10);
    let pieces = rows.iter().filter(|row| row.family() == Some(Family::Sbend));
    let angle: f64 = pieces.filter_map(|p| p.number(Attribute::Angle)).sum();
    assert_approx_eq!(f64, angle, 0.4, epsilon = 1e-9);
}

#[test]
fn test_split_then_export() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).unwrap();
    let plan = SplitPlan::new(None).with_dipole("B", DipoleCuts::from_angles(vec![5.0]));

    let split = converter.split_lattice(&lattice, &plan).unwrap();

    assert_eq!(split.length(), lattice.length());
    assert_eq!(split.len(), lattice.len() + 2 * 4);
    let text = converter.serialize(&split, Dialect::Madx).unwrap();
    let reparsed = converter.parse(&text).unwrap();
    assert_eq!(reparsed.len(), split.len());
    assert!(reparsed.find("B_P1M").is_some());
}

#[test]
fn test_add_drifts_closes_the_lattice() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).unwrap();

    let filled = converter.add_drifts(&lattice).unwrap();

    let total: f64 = filled.elements().iter().map(Element::length).sum();
    assert_approx_eq!(f64, total, 8.0, epsilon = 1e-9);
    assert_eq!(filled.filter_family(Family::Drift).count(), 6);
}

#[test]
fn test_placement_listing_with_drifts_reparses() {
    let converter = Converter::default();
    let lattice = converter
        .parse("FODO: SEQUENCE, L=8;\nQF, at=2.000;\nENDSEQUENCE;")
        .unwrap();
    let filled = converter.add_drifts(&lattice).unwrap();

    let text = converter.serialize(&filled, Dialect::Madx).unwrap();
    let reparsed = converter.parse(&text).unwrap();

    let names: Vec<&str> = reparsed.elements().iter().map(Element::name).collect();
    assert_eq!(names, ["D1", "QF", "D2"]);
    let centers: Vec<Option<f64>> = reparsed.elements().iter().map(Element::center).collect();
    assert_eq!(centers, [Some(1.0), Some(2.0), Some(5.0)]);
}

#[test]
fn test_compare_after_split() {
    let converter = Converter::default();
    let lattice = converter.parse(FODO).unwrap();
    let plan = SplitPlan::new(None).with_dipole("B", DipoleCuts::default());
    let split = converter.split_lattice(&lattice, &plan).unwrap();

    let comparison = converter.compare(&lattice, &split);

    let unmatched: Vec<&str> = comparison
        .unmatched()
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    assert!(unmatched.is_empty(), "dipole centres become markers: {unmatched:?}");
    assert!(comparison.matches().iter().any(|m| m.left == "B" && m.right == "B_P1M"));
}

#[test]
fn test_parse_error_keeps_source() {
    let source = "QF: QUADRUPOLE, L = 0.5";
    let err = Converter::default().parse(source).unwrap_err();

    match err {
        BeamlineError::Parse { src, .. } => assert_eq!(src, source),
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_file_wrappers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fodo.seq");
    let output = dir.path().join("fodo.lte");
    let converter = Converter::default();

    converter.write(&input, FODO).unwrap();
    let lattice = converter.parse_file(&input).unwrap();
    let text = converter.serialize(&lattice, Dialect::Elegant).unwrap();
    converter.write(&output, &text).unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), text);
}

#[test]
fn test_missing_file() {
    let err = Converter::default()
        .parse_file("/nonexistent/lattice.seq")
        .unwrap_err();
    assert!(matches!(err, BeamlineError::Io(_)));
}
