// [libs/core/termsource/src/plain_text.rs]
/*!
 * APARATO: LECTOR DE TEXTO PLANO (V1.0)
 * RESPONSABILIDAD: VENTANA DESLIZANTE DE Q-GRAMAS SOBRE UN ARCHIVO PLANO
 *
 * Lee el archivo completo en memoria una vez (los documentos de k-mer son
 * habitualmente del orden de unos pocos MB) y expone una ventana deslizante
 * de `term_size` bytes. No hace ninguna interpretación del contenido: cada
 * byte del archivo es parte de exactamente `term_size` q-gramas (salvo los
 * bordes).
 */

use crate::errors::TermSourceError;
use crate::term_source::TermSource;
use std::path::Path;

/// Fuente de q-gramas respaldada por un archivo de texto plano sin
/// estructura (un único "documento" por archivo).
pub struct PlainTextSource {
    data: Vec<u8>,
}

impl PlainTextSource {
    /// Carga el archivo completo en memoria.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TermSourceError> {
        let data = std::fs::read(path)?;
        Ok(Self { data })
    }

    /// Construye la fuente directamente desde bytes ya en memoria (para
    /// pruebas y para consultas inline, donde no hay archivo de por medio).
    #[must_use]
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Tamaño en bytes del documento subyacente.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` si el documento subyacente está vacío.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes crudos del documento, para consumidores que necesitan algo más
    /// que una ventana de q-gramas (p. ej. generación de consultas sintéticas).
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl TermSource for PlainTextSource {
    fn num_terms(&self, term_size: usize) -> Result<u64, TermSourceError> {
        if term_size == 0 || self.data.len() < term_size {
            return Ok(0);
        }
        Ok((self.data.len() - term_size + 1) as u64)
    }

    fn process_terms(
        &self,
        term_size: usize,
        sink: &mut dyn FnMut(&[u8]),
    ) -> Result<(), TermSourceError> {
        if term_size == 0 || self.data.len() < term_size {
            return Ok(());
        }
        for start in 0..=(self.data.len() - term_size) {
            sink(&self.data[start..start + term_size]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_overlapping_windows() {
        let source = PlainTextSource::from_bytes(*b"ACGTACGT");
        assert_eq!(source.num_terms(4).unwrap(), 5);
    }

    #[test]
    fn short_document_has_zero_terms() {
        let source = PlainTextSource::from_bytes(*b"AC");
        assert_eq!(source.num_terms(4).unwrap(), 0);
    }

    #[test]
    fn process_terms_visits_every_window_in_order() {
        let source = PlainTextSource::from_bytes(*b"ACGTT");
        let mut seen = Vec::new();
        source
            .process_terms(3, &mut |term| seen.push(term.to_vec()))
            .unwrap();
        assert_eq!(
            seen,
            vec![b"ACG".to_vec(), b"CGT".to_vec(), b"GTT".to_vec()]
        );
    }
}
