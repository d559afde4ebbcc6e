//! CLI logic for the Beamline lattice converter.
//!
//! This module reads a MADX sequence file, applies the requested transforms
//! and writes the lattice in the requested format.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Target};

use log::info;

use beamline::{
    BeamlineError, Converter, element::Element, export, lattice::Lattice, registry::Dialect,
};

/// Run the Beamline CLI application
///
/// Parses the input file, splits dipoles if a plan is given, inserts drifts
/// if requested, and writes the result to the output file or standard
/// output.
///
/// # Errors
///
/// Returns `BeamlineError` for:
/// - File I/O errors
/// - Configuration or split plan loading errors
/// - Parsing errors
/// - Transform errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), BeamlineError> {
    info!(
        input_path = args.input,
        target:? = args.to;
        "Processing lattice"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let converter = Converter::new(app_config);

    let mut lattice = converter.parse_file(&args.input)?;
    if let Some(path) = &args.split {
        let plan = config::load_split_plan(path)?;
        lattice = converter.split_lattice(&lattice, &plan)?;
    }
    if args.add_drifts {
        lattice = converter.add_drifts(&lattice)?;
    }

    let text = render(&converter, &lattice, args)?;

    match &args.output {
        Some(path) => {
            converter.write(path, &text)?;
            info!(output_file = path; "Lattice exported successfully");
        }
        None => println!("{text}"),
    }

    Ok(())
}

fn render(converter: &Converter, lattice: &Lattice, args: &Args) -> Result<String, BeamlineError> {
    let dialect = match args.to {
        Target::Madx => Dialect::Madx,
        Target::Elegant => Dialect::Elegant,
        Target::Tracy => Dialect::Tracy,
        Target::Install | Target::Remove | Target::Markers => {
            return edit_script(converter, lattice, args);
        }
    };
    converter.serialize(lattice, dialect)
}

fn edit_script(
    converter: &Converter,
    lattice: &Lattice,
    args: &Args,
) -> Result<String, BeamlineError> {
    let sequence = args
        .sequence
        .as_deref()
        .or(lattice.name())
        .ok_or(export::Error::UnnamedLattice)?;

    let rows: Vec<Element> = lattice
        .elements()
        .iter()
        .filter(|element| args.family.is_none() || element.family() == args.family)
        .cloned()
        .collect();

    Ok(match args.to {
        Target::Install => converter.install_script(sequence, &rows)?,
        Target::Remove => converter.remove_script(sequence, &rows),
        _ => converter.start_end_markers(sequence, lattice.length()),
    })
}
