// [libs/index/src/errors.rs]
use thiserror::Error;

/// Errores posibles al construir o abrir un índice COBS.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Fallo de E/S al leer o escribir un archivo de índice o un slab temporal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// El encabezado no es un índice COBS válido (magia ausente, tag
    /// desconocido, o versión no soportada).
    #[error("malformed index header: {0}")]
    Format(String),

    /// Violación de una precondición de `fetch_rows` (rango fuera de la
    /// fila, `begin` no alineado a página en un índice compacto, ...).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Los documentos pasados al constructor clásico no comparten el mismo
    /// `signature_size` (la entrada debe venir ya dimensionada de forma
    /// uniforme).
    #[error("documents passed to the classic writer have non-uniform signature widths")]
    NonUniformSignatureWidth,

    /// Fallo al construir el filtro de Bloom de un documento durante la
    /// construcción de un índice compacto.
    #[error(transparent)]
    Bloom(#[from] cobs_core_bloom::BloomError),
}
