//! Diagnostic chart output port trait.

use std::path::Path;

use crate::domain::bias_model::DiagnosticRow;
use crate::domain::error::BiasError;

/// Port for rendering the price vs. rank diagnostic.
pub trait ChartPort {
    fn write(
        &self,
        rows: &[DiagnosticRow],
        title: &str,
        output_path: &Path,
    ) -> Result<(), BiasError>;
}
