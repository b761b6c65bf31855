// [libs/core/kmer/src/lib.rs]
#![deny(missing_docs)]

//! # APARATO: GENOMIC KMER STRATUM (V1.0)
//! CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
//! RESPONSABILIDAD: CANONICALIZACIÓN DE K-MERS Y EXPANSIÓN MULTI-HASH
//!
//! Provee los dos bloques deterministas sobre los que se construye el
//! resto del motor COBS: la canonicalización de k-mers de ADN (mínimo
//! lexicográfico entre un k-mer y su complemento inverso) y el hasher
//! que expande un k-mer canónico en `num_hashes` posiciones de bit
//! independientes.

/// Canonicalización de k-mers (forward vs. complemento inverso).
pub mod canonical;
/// Expansión multi-hash determinista vía SipHash-1-3.
pub mod hasher;

pub use crate::canonical::{canonicalize, CanonicalResult};
pub use crate::hasher::Hasher;

/// Preludio de tipos de alta frecuencia para los estratos superiores.
pub mod prelude {
    pub use crate::canonical::{canonicalize, CanonicalResult};
    pub use crate::hasher::Hasher;
}
