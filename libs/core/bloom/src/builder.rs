// [libs/core/bloom/src/builder.rs]
/*!
 * APARATO: CONSTRUCTOR DE FILTRO DE BLOOM POR DOCUMENTO (V1.0)
 * RESPONSABILIDAD: MATERIALIZACIÓN DE UN BITSET A PARTIR DE UN FLUJO DE TÉRMINOS
 *
 * Para cada término del documento: canonicaliza (si corresponde), calcula
 * `num_hashes` posiciones de bit, y enciende esos bits en un bitset
 * recién inicializado en cero de `signature_size` bits. Un fallo de
 * canonicalización (carácter no-ACGT) no aborta la construcción — el
 * término se hashea igual, espejando el comportamiento de la fuente
 * original (spec §4.3).
 */

use crate::errors::BloomError;
use cobs_core_kmer::{canonicalize, Hasher};
use cobs_core_termsource::TermSource;
use tracing::debug;

/// Bitset empaquetado de `signature_size` bits que representa la firma de
/// Bloom de un único documento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Número de bits lógicos representados (puede no ser múltiplo de 8).
    signature_size: u64,
    /// Almacenamiento empaquetado, `ceil(signature_size / 8)` bytes.
    bytes: Vec<u8>,
}

impl BloomFilter {
    /// Asigna un filtro vacío (todos los bits en cero) de `signature_size`
    /// bits.
    #[must_use]
    pub fn zeroed(signature_size: u64) -> Self {
        let byte_len = signature_size.div_ceil(8) as usize;
        Self {
            signature_size,
            bytes: vec![0u8; byte_len],
        }
    }

    /// Número de bits lógicos en esta firma.
    #[must_use]
    pub fn signature_size(&self) -> u64 {
        self.signature_size
    }

    /// Vista de sólo lectura sobre el almacenamiento empaquetado.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Enciende el bit `index mod signature_size`.
    #[inline]
    pub fn set_bit(&mut self, index: u64) {
        let bit = index % self.signature_size;
        let byte_index = (bit / 8) as usize;
        let bit_offset = (bit % 8) as u8;
        self.bytes[byte_index] |= 1 << bit_offset;
    }

    /// Consulta si el bit `index mod signature_size` está encendido.
    #[inline]
    #[must_use]
    pub fn test_bit(&self, index: u64) -> bool {
        let bit = index % self.signature_size;
        let byte_index = (bit / 8) as usize;
        let bit_offset = (bit % 8) as u8;
        (self.bytes[byte_index] >> bit_offset) & 1 == 1
    }

    /// Verifica que los `num_hashes` bits de un término ya insertado sigan
    /// todos encendidos (usado por las pruebas de no-falso-negativo).
    #[must_use]
    pub fn contains_all(&self, hashes: &[u64]) -> bool {
        hashes.iter().all(|&h| self.test_bit(h))
    }
}

/// Construye el filtro de Bloom de un documento completo.
///
/// `canonicalize_terms` controla si cada k-mer se canonicaliza antes de
/// hashear; si está activo y un término contiene bases no-ACGT, el
/// término se hashea de todos modos (el fallo de canonicalización sólo se
/// registra vía `tracing::debug!`, no aborta la construcción — spec §4.3 /
/// §4.7).
#[tracing::instrument(skip(source), fields(term_size, signature_size, num_hashes))]
pub fn build_bloom_filter<S: TermSource>(
    source: &S,
    term_size: usize,
    canonicalize_terms: bool,
    signature_size: u64,
    num_hashes: u64,
) -> Result<BloomFilter, BloomError> {
    let mut filter = BloomFilter::zeroed(signature_size);
    let hasher = Hasher::new(num_hashes);

    let mut owned_canonical = Vec::with_capacity(term_size);
    source.process_terms(term_size, &mut |term| {
        let bytes: &[u8] = if canonicalize_terms {
            let result = canonicalize(term);
            if !result.good {
                debug!(term = ?String::from_utf8_lossy(term), "non-ACGT byte in term; hashing anyway");
            }
            owned_canonical.clear();
            owned_canonical.extend_from_slice(&result.bytes);
            &owned_canonical
        } else {
            term
        };

        hasher.hash_each(bytes, |h| filter.set_bit(h));
    })?;

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobs_core_termsource::PlainTextSource;
    use proptest::prelude::*;

    #[test]
    fn every_inserted_term_is_present_no_false_negatives() {
        let source = PlainTextSource::from_bytes(*b"ACGTACGTTTGG");
        let filter = build_bloom_filter(&source, 4, true, 256, 4).unwrap();

        let hasher = Hasher::new(4);
        let mut all_present = true;
        source
            .process_terms(4, &mut |term| {
                let canonical = canonicalize(term).bytes;
                let hashes = hasher.hash_all(&canonical);
                all_present &= filter.contains_all(&hashes);
            })
            .unwrap();
        assert!(all_present);
    }

    #[test]
    fn byte_length_matches_signature_size() {
        let source = PlainTextSource::from_bytes(*b"ACGTACGT");
        let filter = build_bloom_filter(&source, 4, false, 17, 2).unwrap();
        assert_eq!(filter.as_bytes().len(), 3); // ceil(17/8)
    }

    #[test]
    fn deterministic_given_same_inputs() {
        let source = PlainTextSource::from_bytes(*b"ACGTACGTACGT");
        let a = build_bloom_filter(&source, 4, true, 128, 3).unwrap();
        let b = build_bloom_filter(&source, 4, true, 128, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_acgt_terms_are_still_hashed_not_rejected() {
        let source = PlainTextSource::from_bytes(*b"NCGTACGT");
        // Should not error and should still set bits.
        let filter = build_bloom_filter(&source, 4, true, 256, 4).unwrap();
        assert!(filter.as_bytes().iter().any(|&b| b != 0));
    }

    proptest! {
        #[test]
        fn no_false_negatives_for_any_sequence(seq in "[ACGT]{8,96}", term_size in 1usize..8, num_hashes in 1u64..6) {
            let source = PlainTextSource::from_bytes(seq.into_bytes());
            prop_assume!(source.num_terms(term_size).unwrap() > 0);
            let filter = build_bloom_filter(&source, term_size, true, 512, num_hashes).unwrap();

            let hasher = Hasher::new(num_hashes);
            let mut all_present = true;
            source
                .process_terms(term_size, &mut |term| {
                    let canonical = canonicalize(term).bytes;
                    let hashes = hasher.hash_all(&canonical);
                    all_present &= filter.contains_all(&hashes);
                })
                .unwrap();
            prop_assert!(all_present);
        }
    }
}
