use beamline_core::{attribute::Attribute, element::ElementKind, family::Family, value::Value};
use beamline_parser::{error::ErrorCode, parse};

fn error_codes(source: &str) -> Vec<Option<ErrorCode>> {
    let err = parse(source).expect_err("Expected parsing to fail");
    err.diagnostics().iter().map(|d| d.code()).collect()
}

#[test]
fn test_definition_without_sequence() {
    let lattice = parse("testmarker : MARKER;").expect("Failed to parse");

    assert_eq!(lattice.name(), None);
    assert_eq!(lattice.length(), 0.0);
    assert_eq!(lattice.len(), 1);

    let row = &lattice.elements()[0];
    assert_eq!(row.name(), "TESTMARKER");
    assert_eq!(row.family(), Some(Family::Marker));
    assert_eq!(row.pos(), None);
}

#[test]
fn test_sequence_without_definitions() {
    let lattice = parse("FODO: SEQUENCE, L=8;\nQF, at=2.000;\nENDSEQUENCE;").expect("Failed to parse");

    assert_eq!(lattice.name(), Some("FODO"));
    assert_eq!(lattice.length(), 8.0);
    assert_eq!(lattice.len(), 1);

    let row = &lattice.elements()[0];
    assert_eq!(row.name(), "QF");
    assert_eq!(row.pos(), Some(2.0));
    assert_eq!(row.at(), Some(2.0));
    assert_eq!(row.kind(), &ElementKind::External);
}

#[test]
fn test_fodo_cell() {
    let source = r#"
        ! A simple FODO cell
        QF: QUADRUPOLE, L = 0.5, K1 := 1.2;
        QD: QUADRUPOLE, L = 0.5, K1 := -1.2;
        B1: SBEND, L = 2.0, ANGLE = 0.2, E1 = 0.1, E2 = 0.1;
        BPM: MONITOR;

        FODO: SEQUENCE, L = 10.0;
        QF, at = 0.25;
        B1, at = 2.5;
        BPM, at = 4.0;
        QD, at = 5.25;
        B1, at = 7.5;
        ENDSEQUENCE;

        USE, SEQUENCE = FODO;
    "#;

    let lattice = parse(source).expect("Failed to parse");

    assert_eq!(lattice.name(), Some("FODO"));
    assert_eq!(lattice.len(), 5);

    let names: Vec<_> = lattice.elements().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["QF", "B1", "BPM", "QD", "B1"]);

    let qd = lattice.find("QD").expect("QD is placed");
    assert_eq!(qd.family(), Some(Family::Quadrupole));
    assert_eq!(qd.number(Attribute::K1), Some(-1.2));
    assert_eq!(qd.length(), 0.5);

    assert_eq!(lattice.filter_family(Family::Sbend).count(), 2);
    assert_eq!(lattice.definitions().len(), 4);
}

#[test]
fn test_refer_entry_and_exit() {
    let source = r#"
        Q: QUADRUPOLE, L = 1.0;
        ENTRYSEQ: SEQUENCE, L = 4.0, REFER = ENTRY;
        Q, at = 1.0;
        ENDSEQUENCE;
    "#;
    let lattice = parse(source).expect("Failed to parse");
    let row = &lattice.elements()[0];
    assert_eq!(row.at(), Some(1.0));
    assert_eq!(row.pos(), Some(1.5));

    let lattice = parse(&source.replace("REFER = ENTRY", "REFER = EXIT")).expect("Failed to parse");
    let row = &lattice.elements()[0];
    assert_eq!(row.at(), Some(1.0));
    assert_eq!(row.pos(), Some(0.5));
}

#[test]
fn test_last_definition_wins() {
    let source = r#"
        QF: QUADRUPOLE, L = 0.5, K1 = 1.0;
        QF: QUADRUPOLE, L = 0.4, K1 = 2.0;
        CELL: SEQUENCE, L = 2.0;
        QF, at = 1.0;
        ENDSEQUENCE;
    "#;
    let lattice = parse(source).expect("Failed to parse");

    let qf = &lattice.elements()[0];
    assert_eq!(qf.number(Attribute::L), Some(0.4));
    assert_eq!(qf.number(Attribute::K1), Some(2.0));
}

#[test]
fn test_inheritance_and_inline_definitions() {
    let source = r#"
        QBASE: QUADRUPOLE, L = 0.5;
        QF: QBASE, K1 = 1.1;
        CELL: SEQUENCE, L = 4.0;
        QF, at = 1.0;
        QD: QBASE, K1 = -1.1, at = 3.0;
        ENDSEQUENCE;
    "#;
    let lattice = parse(source).expect("Failed to parse");

    let qf = lattice.find("QF").expect("QF is placed");
    assert_eq!(qf.family(), Some(Family::Quadrupole));
    assert_eq!(qf.length(), 0.5);
    assert_eq!(qf.number(Attribute::K1), Some(1.1));

    let qd = lattice.find("QD").expect("QD is placed");
    assert_eq!(qd.number(Attribute::K1), Some(-1.1));
    assert_eq!(qd.pos(), Some(3.0));
}

#[test]
fn test_names_are_case_insensitive_values_keep_case() {
    let source = r#"
        cav: rfcavity, l = 0.3, volt = 1.5, lag := phase0 / 360;
        ring: sequence, l = 1.0;
        Cav, at = 0.5;
        endsequence;
    "#;
    let lattice = parse(source).expect("Failed to parse");

    assert_eq!(lattice.name(), Some("RING"));
    let cav = &lattice.elements()[0];
    assert_eq!(cav.name(), "CAV");
    assert_eq!(
        cav.get(Attribute::Lag),
        Some(&Value::Text("phase0 / 360".to_string()))
    );
}

#[test]
fn test_assignments_are_ignored() {
    let source = r#"
        lq = 0.5;
        kf := 1.2;
        QF: QUADRUPOLE, L := lq, K1 := kf;
    "#;
    let lattice = parse(source).expect("Failed to parse");

    let qf = &lattice.elements()[0];
    assert_eq!(qf.get(Attribute::L), Some(&Value::Text("lq".to_string())));
}

#[test]
fn test_undefined_elements_are_all_reported() {
    let source = r#"
        QF: QUADRUPOLE, L = 0.5;
        CELL: SEQUENCE, L = 4.0;
        QF, at = 1.0;
        QD, at = 2.0;
        BPM, at = 3.0;
        ENDSEQUENCE;
    "#;
    assert_eq!(error_codes(source), vec![Some(ErrorCode::E200); 2]);
}

#[test]
fn test_multiple_sequences() {
    let source = r#"
        A: SEQUENCE, L = 1.0;
        ENDSEQUENCE;
        B: SEQUENCE, L = 1.0;
        ENDSEQUENCE;
    "#;
    assert_eq!(error_codes(source), vec![Some(ErrorCode::E201)]);
}

#[test]
fn test_unknown_family() {
    let source = r#"
        W: WIGGLER, L = 1.0;
        CELL: SEQUENCE, L = 4.0;
        W, at = 1.0;
        ENDSEQUENCE;
    "#;
    // The failed definition is not reported again as undefined.
    assert_eq!(error_codes(source), vec![Some(ErrorCode::E300)]);
}

#[test]
fn test_attribute_not_allowed() {
    assert_eq!(
        error_codes("M: MARKER, L = 1.0;"),
        vec![Some(ErrorCode::E301)]
    );
    assert_eq!(
        error_codes("Q: QUADRUPOLE, K9 = 1.0;"),
        vec![Some(ErrorCode::E301)]
    );
}

#[test]
fn test_invalid_values() {
    let source = r#"
        Q: QUADRUPOLE, L = 0.5;
        CELL: SEQUENCE, L = 4.0, REFER = MIDDLE;
        Q, at = pos0;
        ENDSEQUENCE;
    "#;
    assert_eq!(error_codes(source), vec![Some(ErrorCode::E302); 2]);
}

#[test]
fn test_negative_length() {
    let source = r#"
        B: SBEND, L = -2.0, ANGLE = 0.2;
        D: DRIFT, L = -0.5;
        CELL: SEQUENCE, L = 4.0;
        B, at = 1.0;
        D, at = 3.0;
        ENDSEQUENCE;
    "#;
    // Both definitions fail; their placements are not reported again.
    assert_eq!(error_codes(source), vec![Some(ErrorCode::E302); 2]);

    let lattice = parse("M: MONITOR, L = 0.0;").expect("Failed to parse");
    assert_eq!(lattice.elements()[0].length(), 0.0);
}

#[test]
fn test_syntax_errors() {
    assert_eq!(error_codes("Q: QUADRUPOLE, L = 0.5"), vec![Some(ErrorCode::E101)]);
    assert_eq!(error_codes("Q: QUADRUPOLE L = 0.5;"), vec![Some(ErrorCode::E100)]);
    assert_eq!(error_codes("Q: \"QUADRUPOLE;"), vec![Some(ErrorCode::E001)]);
}
