// [libs/core/bloom/src/signature.rs]
/*!
 * APARATO: FÓRMULA DE DIMENSIONAMIENTO DE SIGNATURE_SIZE (V1.0)
 *
 * signature_size = ceil(-h * n / ln(1 - f^(1/h))), redondeado hacia arriba
 * al siguiente múltiplo de 8 (spec §3 — "Signature-size rule").
 */

/// Calcula `signature_size` (en bits, múltiplo de 8) para `num_hashes`
/// funciones de hash, `num_inserted_items` elementos insertados, y una
/// tasa de falsos positivos deseada `target_fpr` en `(0, 1)`.
///
/// Degenera con elegancia en los bordes: `num_inserted_items == 0` produce
/// el signature_size mínimo (8 bits), y `target_fpr` fuera de `(0, 1)` se
/// satura al valor válido más cercano para no producir NaN/infinito.
#[must_use]
pub fn signature_size_for_fpr(num_hashes: u64, num_inserted_items: u64, target_fpr: f64) -> u64 {
    if num_inserted_items == 0 {
        return 8;
    }

    let f = target_fpr.clamp(1e-12, 1.0 - 1e-12);
    let h = num_hashes.max(1) as f64;
    let n = num_inserted_items as f64;

    let denominator = (1.0 - f.powf(1.0 / h)).ln();
    let raw_bits = (-h * n / denominator).ceil() as u64;

    round_up_to_multiple_of_8(raw_bits.max(1))
}

#[inline]
fn round_up_to_multiple_of_8(bits: u64) -> u64 {
    (bits + 7) & !7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_always_a_multiple_of_eight() {
        for n in [1u64, 7, 8, 9, 1000, 1_000_000] {
            let size = signature_size_for_fpr(3, n, 0.01);
            assert_eq!(size % 8, 0);
        }
    }

    #[test]
    fn empty_document_gets_minimum_size() {
        assert_eq!(signature_size_for_fpr(3, 0, 0.01), 8);
    }

    #[test]
    fn larger_cardinality_needs_more_bits() {
        let small = signature_size_for_fpr(3, 100, 0.01);
        let large = signature_size_for_fpr(3, 100_000, 0.01);
        assert!(large > small);
    }

    #[test]
    fn tighter_fpr_needs_more_bits() {
        let loose = signature_size_for_fpr(3, 10_000, 0.1);
        let tight = signature_size_for_fpr(3, 10_000, 0.0001);
        assert!(tight > loose);
    }

    #[test]
    fn degenerate_fpr_inputs_do_not_panic_or_produce_nan() {
        let size = signature_size_for_fpr(3, 1000, 0.0);
        assert!(size > 0);
        let size = signature_size_for_fpr(3, 1000, 1.0);
        assert!(size > 0);
    }
}
