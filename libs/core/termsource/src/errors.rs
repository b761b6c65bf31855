// [libs/core/termsource/src/errors.rs]
use thiserror::Error;

/// Errores posibles al leer un documento como fuente de q-gramas.
#[derive(Error, Debug)]
pub enum TermSourceError {
    /// Fallo de E/S al abrir o leer el archivo de origen.
    #[error("I/O error reading term source: {0}")]
    Io(#[from] std::io::Error),

    /// El archivo no comienza con un marcador FASTA válido (`>` o `;`).
    #[error("not a FASTA file: expected '>' or ';' as first byte")]
    NotFasta,

    /// El índice de sub-documento solicitado no existe en este archivo.
    #[error("sub-document index {0} out of range")]
    SubDocumentOutOfRange(usize),
}
