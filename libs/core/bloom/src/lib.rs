// [libs/core/bloom/src/lib.rs]
#![deny(missing_docs)]

//! # APARATO: PROBABILISTIC FILTER STRATUM (V2.0 — COBS)
//! CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
//! RESPONSABILIDAD: DIMENSIONAMIENTO Y CONSTRUCCIÓN DE FILTROS DE BLOOM POR DOCUMENTO
//!
//! Generaliza el envoltorio de Bloom del workspace (antes especializado en
//! hashes160 de Bitcoin de ancho fijo) a filtros de ancho variable sobre
//! k-mers genómicos: el ancho (`signature_size`) se calcula por documento a
//! partir de su cardinalidad y de la tasa de falsos positivos deseada, en
//! vez de ser una constante global.

/// Errores de construcción de filtros de Bloom.
pub mod errors;
/// Construcción de un filtro de Bloom de un único documento.
pub mod builder;
/// Fórmula de dimensionamiento de `signature_size`.
pub mod signature;

pub use crate::builder::{build_bloom_filter, BloomFilter};
pub use crate::errors::BloomError;
pub use crate::signature::signature_size_for_fpr;

/// Preludio de tipos de alta frecuencia para los estratos de construcción.
pub mod prelude {
    pub use crate::builder::{build_bloom_filter, BloomFilter};
    pub use crate::errors::BloomError;
    pub use crate::signature::signature_size_for_fpr;
}
