//! Rendering of [`BeamlineError`] through miette.
//!
//! A parse failure becomes one [`Report`] per diagnostic, each carrying the
//! source text for snippets. Every other failure becomes a single report
//! whose code names the conversion stage and whose help, where one exists,
//! says what to change on the command line or in the split plan.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity, SourceCode, SourceSpan};

use beamline::{BeamlineError, export, transform};
use beamline_parser::error::Diagnostic;

/// One renderable failure.
#[derive(Debug)]
pub enum Report<'a> {
    /// A parser diagnostic over the lattice source.
    Parse { diag: &'a Diagnostic, src: &'a str },
    /// A failure after parsing, or before it for I/O.
    Stage(&'a BeamlineError),
}

/// Splits `err` into the reports to render, in order.
pub fn reports(err: &BeamlineError) -> Vec<Report<'_>> {
    match err {
        BeamlineError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Report::Parse { diag, src })
            .collect(),
        _ => vec![Report::Stage(err)],
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Parse { diag, .. } => f.write_str(diag.message()),
            Report::Stage(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Report::Parse { .. } => None,
            Report::Stage(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Parse { diag, .. } => diag
                .code()
                .map(|code| Box::new(code) as Box<dyn fmt::Display>),
            Report::Stage(err) => Some(Box::new(stage(err))),
        }
    }

    fn severity(&self) -> Option<Severity> {
        match self {
            Report::Parse { diag, .. } if diag.severity().is_warning() => Some(Severity::Warning),
            _ => Some(Severity::Error),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Parse { diag, .. } => diag
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
            Report::Stage(err) => stage_help(err).map(|help| Box::new(help) as Box<dyn fmt::Display>),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Report::Parse { src, .. } => Some(src as &dyn SourceCode),
            Report::Stage(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Report::Parse { diag, .. } = self else {
            return None;
        };
        if diag.labels().is_empty() {
            return None;
        }

        Some(Box::new(diag.labels().iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

fn stage(err: &BeamlineError) -> &'static str {
    match err {
        BeamlineError::Io(_) => "beamline::io",
        BeamlineError::Parse { .. } => "beamline::parse",
        BeamlineError::Lattice(_) => "beamline::lattice",
        BeamlineError::Export(_) => "beamline::export",
        BeamlineError::Transform(_) => "beamline::transform",
    }
}

fn stage_help(err: &BeamlineError) -> Option<&'static str> {
    match err {
        BeamlineError::Export(export::Error::UnnamedLattice) => {
            Some("the source has no SEQUENCE block; name the target with `--sequence`")
        }
        BeamlineError::Export(export::Error::NonNumeric { .. }) => {
            Some("only MADX output keeps expressions; replace the value with a number")
        }
        BeamlineError::Export(export::Error::Unplaced { .. }) => {
            Some("sequence output needs every row placed with `at`")
        }
        BeamlineError::Transform(transform::Error::NotABend { .. }) => {
            Some("only SBEND and RBEND rows can be named in a split plan")
        }
        BeamlineError::Transform(
            transform::Error::CutOutOfRange { .. } | transform::Error::HalfAngleMismatch { .. },
        ) => Some("split plan angles are in degrees, measured from the magnet entrance"),
        _ => None,
    }
}
