//! MADX `SEQEDIT` scripts.
//!
//! Scripts edit an already loaded sequence: they select it with `USE`, open
//! a `SEQEDIT` block and flatten it before and after the edits. Rows are
//! installed or removed in table order, which is the order MADX applies
//! them in.

use std::fmt::Write as _;

use log::debug;

use beamline_core::element::Element;

use super::Error;

const START_MARKER: &str = "MSTART";
const END_MARKER: &str = "MEND";

/// Script installing every row of `rows` at its centre position into the
/// sequence `sequence`.
///
/// # Errors
///
/// Returns [`Error::Unplaced`] for a row without a position.
pub fn install_script(sequence: &str, rows: &[Element]) -> Result<String, Error> {
    debug!(sequence, rows = rows.len(); "Writing install script");

    let mut text = open_edit(sequence);
    for element in rows {
        install_line(&mut text, element.name(), super::center(element)?);
    }
    close_edit(&mut text);
    Ok(text)
}

/// Script removing every row of `rows` from the sequence `sequence`.
pub fn remove_script(sequence: &str, rows: &[Element]) -> String {
    debug!(sequence, rows = rows.len(); "Writing remove script");

    let mut text = open_edit(sequence);
    for element in rows {
        let _ = writeln!(text, "REMOVE, ELEMENT = {:16};", element.name());
    }
    close_edit(&mut text);
    text
}

/// Script defining the `MSTART` and `MEND` markers and installing them at
/// the start and the end of the sequence.
pub fn start_end_markers(sequence: &str, length: f64) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{:12}: {:12};", START_MARKER, "MARKER");
    let _ = writeln!(text, "{:12}: {:12};\n", END_MARKER, "MARKER");

    text.push_str(&open_edit(sequence));
    install_line(&mut text, START_MARKER, 0.0);
    install_line(&mut text, END_MARKER, length);
    close_edit(&mut text);
    text
}

fn open_edit(sequence: &str) -> String {
    format!("USE, SEQUENCE={sequence};\nSEQEDIT, SEQUENCE = {sequence};  \nFLATTEN;\n")
}

fn install_line(text: &mut String, name: &str, at: f64) {
    let _ = writeln!(text, "INSTALL, ELEMENT = {name:16}, AT = {at:12.6};");
}

fn close_edit(text: &mut String) {
    text.push_str("FLATTEN;\nENDEDIT;");
}

#[cfg(test)]
mod tests {
    use beamline_core::{element::ElementKind, family::Family};

    use super::*;

    fn marker(name: &str, at: f64) -> Element {
        Element::new(name, ElementKind::new(Family::Marker)).with_at(at)
    }

    #[test]
    fn test_install_script() {
        let rows = [marker("BPM1", 1.5), marker("BPM2", 0.25)];

        let text = install_script("RING", &rows).unwrap();

        assert_eq!(
            text,
            "USE, SEQUENCE=RING;\n\
             SEQEDIT, SEQUENCE = RING;  \n\
             FLATTEN;\n\
             INSTALL, ELEMENT = BPM1            , AT =     1.500000;\n\
             INSTALL, ELEMENT = BPM2            , AT =     0.250000;\n\
             FLATTEN;\n\
             ENDEDIT;"
        );
    }

    #[test]
    fn test_install_requires_positions() {
        let rows = [Element::new("M", ElementKind::new(Family::Marker))];
        assert!(matches!(install_script("RING", &rows), Err(Error::Unplaced { .. })));
    }

    #[test]
    fn test_remove_script() {
        let rows = [marker("BPM1", 1.5)];

        let text = remove_script("RING", &rows);

        assert_eq!(
            text,
            "USE, SEQUENCE=RING;\nSEQEDIT, SEQUENCE = RING;  \nFLATTEN;\nREMOVE, ELEMENT = BPM1            ;\nFLATTEN;\nENDEDIT;"
        );
    }

    #[test]
    fn test_start_end_markers() {
        let text = start_end_markers("RING", 240.0);

        assert!(text.starts_with("MSTART      : MARKER      ;\nMEND        : MARKER      ;\n\nUSE, SEQUENCE=RING;\n"));
        assert!(text.contains("INSTALL, ELEMENT = MSTART          , AT =     0.000000;\n"));
        assert!(text.contains("INSTALL, ELEMENT = MEND            , AT =   240.000000;\n"));
        assert!(text.ends_with("FLATTEN;\nENDEDIT;"));
    }
}
