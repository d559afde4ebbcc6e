//! Beamline - conversion of accelerator lattices between simulation codes.
//!
//! Reads MADX sequence files into a lattice table, optionally transforms the
//! table, and writes it back as MADX, Elegant or Tracy input or as MADX
//! `SEQEDIT` scripts.

pub mod config;

mod error;
pub mod export;
pub mod transform;

pub use beamline_core::{attribute, element, family, lattice, registry, value};

pub use error::BeamlineError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use beamline_core::{
    element::Element,
    lattice::Lattice,
    registry::{Dialect, Registry},
};

use config::AppConfig;
use export::{
    Exporter, elegant::ElegantExporter, madx::MadxExporter, seqedit, tracy::TracyExporter,
};
use transform::{compare::PositionComparison, split::SplitPlan};

/// Entry point for parsing, transforming and exporting lattices.
///
/// # Examples
///
/// ```
/// use beamline::{Converter, registry::Dialect};
///
/// let source = "
///     QF: QUADRUPOLE, L = 0.5, K1 = 1.2;
///     FODO: SEQUENCE, L = 4.0;
///     QF, at = 1.0;
///     ENDSEQUENCE;
/// ";
///
/// let converter = Converter::default();
/// let lattice = converter.parse(source).expect("Failed to parse");
/// let elegant = converter
///     .serialize(&lattice, Dialect::Elegant)
///     .expect("Failed to export");
/// assert!(elegant.ends_with("FODO: LINE=(QF)"));
/// ```
pub struct Converter {
    config: AppConfig,
    registry: &'static Registry,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Converter {
    /// Create a converter with the given configuration and the built-in
    /// dialect registry.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            registry: Registry::global(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse MADX source text into a lattice.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Parse`] carrying the diagnostics and the
    /// source text.
    pub fn parse(&self, source: &str) -> Result<Lattice, BeamlineError> {
        info!("Parsing lattice");

        let lattice = beamline_parser::parse(source)
            .map_err(|err| BeamlineError::new_parse_error(err, source))?;

        debug!(name:? = lattice.name(), rows = lattice.len(); "Lattice parsed successfully");
        trace!(lattice:?; "Parsed lattice");

        Ok(lattice)
    }

    /// Read and parse a MADX file.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Io`] if the file cannot be read, otherwise as
    /// [`Converter::parse`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Lattice, BeamlineError> {
        let path = path.as_ref();
        info!(path:? = path; "Reading lattice file");
        let source = fs::read_to_string(path)?;
        self.parse(&source)
    }

    /// Write a lattice in the given dialect.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Export`]; see [`Exporter::export`].
    pub fn serialize(&self, lattice: &Lattice, dialect: Dialect) -> Result<String, BeamlineError> {
        info!(dialect:?; "Exporting lattice");

        let text = match dialect {
            Dialect::Madx => MadxExporter::new(self.registry).export(lattice)?,
            Dialect::Elegant => ElegantExporter::new(self.registry).export(lattice)?,
            Dialect::Tracy => {
                TracyExporter::new(self.registry, self.config.export()).export(lattice)?
            }
        };

        debug!(bytes = text.len(); "Lattice exported");
        Ok(text)
    }

    /// MADX script installing `rows` into the sequence `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Export`] for a row without a position.
    pub fn install_script(
        &self,
        sequence: &str,
        rows: &[Element],
    ) -> Result<String, BeamlineError> {
        Ok(seqedit::install_script(sequence, rows)?)
    }

    /// MADX script removing `rows` from the sequence `sequence`.
    pub fn remove_script(&self, sequence: &str, rows: &[Element]) -> String {
        seqedit::remove_script(sequence, rows)
    }

    /// MADX script adding `MSTART` and `MEND` markers to the ends of the
    /// sequence `sequence` of length `length`.
    pub fn start_end_markers(&self, sequence: &str, length: f64) -> String {
        seqedit::start_end_markers(sequence, length)
    }

    /// Split the dipoles `rows` per `plan`; see
    /// [`transform::split::split_dipoles`].
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Transform`] for an invalid dipole or plan.
    pub fn split_dipoles(
        &self,
        rows: &[Element],
        plan: &SplitPlan,
    ) -> Result<Vec<Element>, BeamlineError> {
        Ok(transform::split::split_dipoles(
            rows,
            plan,
            plan.half_bend_angle(),
            self.config.split(),
        )?)
    }

    /// Replace the dipoles named in `plan` by their pieces; see
    /// [`transform::split::split_lattice`].
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Transform`] for an invalid dipole or plan.
    pub fn split_lattice(
        &self,
        lattice: &Lattice,
        plan: &SplitPlan,
    ) -> Result<Lattice, BeamlineError> {
        info!(rows = lattice.len(); "Splitting dipoles");
        Ok(transform::split::split_lattice(
            lattice,
            plan,
            plan.half_bend_angle(),
            self.config.split(),
        )?)
    }

    /// Fill the gaps of `lattice` with drifts; see
    /// [`transform::drift::add_drifts`].
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Transform`] for a row without a position.
    pub fn add_drifts(&self, lattice: &Lattice) -> Result<Lattice, BeamlineError> {
        info!(rows = lattice.len(); "Adding drifts");
        Ok(transform::drift::add_drifts(lattice, self.config.drift())?)
    }

    /// Match the elements of two lattices by centre position.
    pub fn compare(&self, a: &Lattice, b: &Lattice) -> PositionComparison {
        transform::compare::compare_center_positions(a, b)
    }

    /// Write `text` to `path`, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Io`] if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>, text: &str) -> Result<(), BeamlineError> {
        let path = path.as_ref();
        fs::write(path, text)?;
        info!(path:? = path; "Output written");
        Ok(())
    }
}
