// [libs/search/src/errors.rs]
use thiserror::Error;

/// Errores posibles al ejecutar una consulta contra uno o más índices COBS.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Fallo al pedir filas de un índice (corrupción, precondición violada).
    #[error(transparent)]
    Index(#[from] cobs_index::IndexError),
}
