// [libs/index/src/lib.rs]
#![deny(missing_docs)]

//! # APARATO: INDEX STRATUM (V1.0)
//! CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L2)
//! RESPONSABILIDAD: CONSTRUCCIÓN Y ACCESO DE SÓLO-LECTURA A ÍNDICES COBS
//!
//! Cubre los tres formatos sobre los que el resto del motor opera: el
//! encabezado tipado auto-delimitado (`header`), el escritor de índice
//! clásico por transposición en lotes y merge por pares (`classic_writer`),
//! el escritor de índice compacto por partición de cardinalidad
//! (`compact_writer`), y el acceso de sólo-lectura mapeado o cargado
//! (`index_file`).

/// Escritor de índices clásicos: transposición en lotes + merge por pares.
pub mod classic_writer;
/// Escritor de índices compactos: partición por cardinalidad.
pub mod compact_writer;
/// Errores de construcción y apertura de índices.
pub mod errors;
/// Encabezado tipado, auto-delimitado, de un índice COBS.
pub mod header;
/// Apertura de índices (mmap o carga completa) y el contrato de fetch por fila.
pub mod index_file;

pub use crate::classic_writer::{combine_classic_indices, write_classic_index, BuildOptions};
pub use crate::compact_writer::{combine_compact_groups, write_compact_index, CompactDocumentInput};
pub use crate::errors::IndexError;
pub use crate::header::{ClassicHeader, CompactHeader, IndexHeader};
pub use crate::index_file::IndexFile;

/// Preludio de tipos de alta frecuencia para los estratos de construcción y búsqueda.
pub mod prelude {
    pub use crate::classic_writer::{combine_classic_indices, write_classic_index, BuildOptions};
    pub use crate::compact_writer::{combine_compact_groups, write_compact_index, CompactDocumentInput};
    pub use crate::errors::IndexError;
    pub use crate::header::{ClassicHeader, CompactHeader, IndexHeader};
    pub use crate::index_file::IndexFile;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_stratum_visibility() {
        let _index_file = std::any::TypeId::of::<IndexFile>();
        let _error = std::any::TypeId::of::<IndexError>();
        let _header = std::any::TypeId::of::<IndexHeader>();
    }
}
