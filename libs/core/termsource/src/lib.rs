// [libs/core/termsource/src/lib.rs]
#![deny(missing_docs)]

//! # APARATO: TERM SOURCE STRATUM (V1.0)
//! CLASIFICACIÓN: BOUNDARY ADAPTER (ESTRATO L1)
//! RESPONSABILIDAD: ABSTRACCIÓN DE DOCUMENTOS COMO FLUJOS DE Q-GRAMAS
//!
//! Un documento es, para el resto del motor, cualquier cosa que pueda
//! producir un flujo de ventanas de bytes de tamaño fijo (`process_terms`)
//! y que sepa de antemano cuántas de esas ventanas va a producir
//! (`num_terms`). Los lectores concretos (texto plano, FASTA/FASTQ) son
//! adaptadores de esta interfaz; análisis de formatos más exóticos
//! (Cortex, comprimidos) quedan fuera de este estrato.

/// Definiciones de error para fallos de lectura de documentos.
pub mod errors;
/// Lector de documentos FASTA (uno o varios sub-documentos por archivo).
pub mod fasta;
/// Lector de texto plano (un único documento por archivo).
pub mod plain_text;
/// La interfaz `TermSource` y el tipo `Document` que la porta.
pub mod term_source;

pub use crate::errors::TermSourceError;
pub use crate::fasta::FastaSource;
pub use crate::plain_text::PlainTextSource;
pub use crate::term_source::{Document, TermSource};

/// Preludio de tipos de alta frecuencia para los estratos de construcción.
pub mod prelude {
    pub use crate::errors::TermSourceError;
    pub use crate::fasta::FastaSource;
    pub use crate::plain_text::PlainTextSource;
    pub use crate::term_source::{Document, TermSource};
}
