// [libs/search/src/lib.rs]
#![deny(missing_docs)]

//! # APARATO: SEARCH STRATUM (V1.0)
//! CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L3)
//! RESPONSABILIDAD: CONSULTA DE K-MERS CONTRA ÍNDICES COBS YA ABIERTOS
//!
//! Une los estratos inferiores en una sola operación: k-meriza una
//! consulta, expande cada k-mer en sus `num_hashes` posiciones de hash,
//! pide las filas correspondientes a un [`cobs_index::IndexFile`] en un
//! solo batch, AND-ea y acumula puntaje por documento, y retorna los
//! documentos que superan un umbral, ordenados y truncados a `top_k`.

/// Errores posibles al ejecutar una consulta.
pub mod errors;
/// El motor de consulta (`SearchEngine`) y su operación `search`.
pub mod engine;
/// El tipo de resultado de una consulta (`SearchResult`).
pub mod result;
/// AND de filas y acumulación de puntaje por barrido de bits.
pub(crate) mod scoring;

pub use crate::engine::SearchEngine;
pub use crate::errors::SearchError;
pub use crate::result::SearchResult;

/// Preludio de tipos de alta frecuencia para los consumidores del motor de consulta.
pub mod prelude {
    pub use crate::engine::SearchEngine;
    pub use crate::errors::SearchError;
    pub use crate::result::SearchResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_stratum_visibility() {
        let _engine = std::any::TypeId::of::<SearchEngine>();
        let _error = std::any::TypeId::of::<SearchError>();
        let _result = std::any::TypeId::of::<SearchResult>();
    }
}
