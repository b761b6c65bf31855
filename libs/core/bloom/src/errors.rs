// [libs/core/bloom/src/errors.rs]
use thiserror::Error;

/// Errores posibles al construir el filtro de Bloom de un documento.
#[derive(Error, Debug)]
pub enum BloomError {
    /// Fallo al leer la fuente de términos subyacente.
    #[error("failed to read term source: {0}")]
    TermSource(#[from] cobs_core_termsource::TermSourceError),
}
