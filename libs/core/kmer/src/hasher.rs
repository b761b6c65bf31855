// [libs/core/kmer/src/hasher.rs]
/*!
 * APARATO: EXPANSOR MULTI-HASH (V1.0)
 * RESPONSABILIDAD: PROYECCIÓN DE UN K-MER CANÓNICO EN H POSICIONES DE BIT
 *
 * Reutiliza SipHash-1-3 (ya presente en el stack de shard-routing del
 * workspace) como mezclador general. Cada una de las `num_hashes` salidas
 * usa una clave SipHash distinta (`seed = 0..num_hashes`), de modo que las
 * H posiciones de bit de un mismo k-mer sean independientes entre sí.
 */

use siphasher::sip::SipHasher13;
use std::hash::Hasher as _;

/// Expande un k-mer canónico en `num_hashes` valores de 64 bits
/// independientes.
///
/// El contrato de compatibilidad binaria es: los bytes hasheados deben ser
/// siempre los del k-mer *canónico*, nunca la hebra original sin procesar
/// (spec §4.1). La función es total: no hay modo de fallo.
pub struct Hasher {
    num_hashes: u64,
}

impl Hasher {
    /// Construye un expansor para `num_hashes` funciones de hash.
    #[must_use]
    pub fn new(num_hashes: u64) -> Self {
        Self { num_hashes }
    }

    /// Número de hashes que este expansor produce por k-mer.
    #[must_use]
    pub fn num_hashes(&self) -> u64 {
        self.num_hashes
    }

    /// Calcula las `num_hashes` posiciones de hash de `canonical_kmer`,
    /// invocando `sink` una vez por posición en orden `0..num_hashes`.
    pub fn hash_each(&self, canonical_kmer: &[u8], mut sink: impl FnMut(u64)) {
        for seed in 0..self.num_hashes {
            sink(Self::hash_with_seed(canonical_kmer, seed));
        }
    }

    /// Calcula las `num_hashes` posiciones de hash y las retorna como un
    /// vector nuevo. Conveniencia sobre [`Hasher::hash_each`] para los
    /// llamadores que de todos modos necesitan materializar el slice.
    #[must_use]
    pub fn hash_all(&self, canonical_kmer: &[u8]) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.num_hashes as usize);
        self.hash_each(canonical_kmer, |h| out.push(h));
        out
    }

    #[inline]
    fn hash_with_seed(bytes: &[u8], seed: u64) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(0, seed);
        hasher.write(bytes);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_hash_count() {
        let hasher = Hasher::new(4);
        let hashes = hasher.hash_all(b"ACGTACGT");
        assert_eq!(hashes.len(), 4);
    }

    #[test]
    fn is_deterministic() {
        let hasher = Hasher::new(3);
        assert_eq!(hasher.hash_all(b"GATTACA"), hasher.hash_all(b"GATTACA"));
    }

    #[test]
    fn distinct_seeds_usually_produce_distinct_hashes() {
        let hasher = Hasher::new(8);
        let hashes = hasher.hash_all(b"GATTACAGATTACA");
        let unique: std::collections::HashSet<_> = hashes.iter().collect();
        assert_eq!(unique.len(), hashes.len());
    }

    #[test]
    fn different_kmers_usually_hash_differently() {
        let hasher = Hasher::new(1);
        assert_ne!(hasher.hash_all(b"AAAA"), hasher.hash_all(b"TTTT"));
    }
}
