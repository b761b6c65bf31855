// [libs/core/termsource/src/fasta.rs]
/*!
 * APARATO: LECTOR FASTA (V1.0)
 * RESPONSABILIDAD: PARTICIONAMIENTO DE UN ARCHIVO MULTI-FASTA EN SUB-DOCUMENTOS
 *
 * Un archivo FASTA puede contener muchos registros (`>nombre` seguido de
 * líneas de secuencia). Cada registro es, para el resto del motor, un
 * documento independiente. `FastaSource::records` hace una sola pasada
 * para extraer (nombre, secuencia-concatenada-sin-saltos-de-línea) por
 * registro; cada registro resultante implementa `TermSource` de forma
 * independiente.
 */

use crate::errors::TermSourceError;
use crate::term_source::TermSource;
use std::path::Path;

/// Un único registro FASTA (`>nombre` + secuencia concatenada), utilizable
/// como fuente de q-gramas independiente.
pub struct FastaSource {
    name: String,
    sequence: Vec<u8>,
}

impl FastaSource {
    /// Nombre del registro (texto de la línea `>`, sin el `>`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Secuencia cruda del registro (sin saltos de línea), para
    /// consumidores que necesitan algo más que una ventana de q-gramas.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.sequence
    }

    /// Lee un archivo FASTA completo y retorna un vector con un
    /// `FastaSource` por registro, en el orden en que aparecen.
    pub fn records(path: impl AsRef<Path>) -> Result<Vec<FastaSource>, TermSourceError> {
        let text = std::fs::read_to_string(path.as_ref())?;

        let mut first_meaningful = None;
        for line in text.lines() {
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            first_meaningful = Some(line);
            break;
        }
        match first_meaningful {
            Some(line) if line.starts_with('>') || line.starts_with(';') => {}
            _ => return Err(TermSourceError::NotFasta),
        }

        let mut records = Vec::new();
        let mut current_name: Option<String> = None;
        let mut current_sequence = Vec::new();

        for line in text.lines() {
            if line.starts_with(';') {
                continue;
            }
            if let Some(header) = line.strip_prefix('>') {
                if let Some(name) = current_name.take() {
                    records.push(FastaSource {
                        name,
                        sequence: std::mem::take(&mut current_sequence),
                    });
                }
                current_name = Some(header.trim().to_string());
            } else if current_name.is_some() {
                current_sequence.extend(line.trim_end_matches('\r').bytes());
            }
        }
        if let Some(name) = current_name.take() {
            records.push(FastaSource {
                name,
                sequence: current_sequence,
            });
        }

        Ok(records)
    }
}

impl TermSource for FastaSource {
    fn num_terms(&self, term_size: usize) -> Result<u64, TermSourceError> {
        if term_size == 0 || self.sequence.len() < term_size {
            return Ok(0);
        }
        Ok((self.sequence.len() - term_size + 1) as u64)
    }

    fn process_terms(
        &self,
        term_size: usize,
        sink: &mut dyn FnMut(&[u8]),
    ) -> Result<(), TermSourceError> {
        if term_size == 0 || self.sequence.len() < term_size {
            return Ok(());
        }
        for start in 0..=(self.sequence.len() - term_size) {
            sink(&self.sequence[start..start + term_size]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn splits_multi_record_file_into_independent_sources() {
        let file = write_fixture(">doc1\nACGT\nACGT\n>doc2\nTTTT\n");
        let records = FastaSource::records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "doc1");
        assert_eq!(records[0].num_terms(4).unwrap(), 5);
        assert_eq!(records[1].name(), "doc2");
        assert_eq!(records[1].num_terms(4).unwrap(), 1);
    }

    #[test]
    fn rejects_file_without_fasta_marker() {
        let file = write_fixture("not a fasta file\n");
        assert!(matches!(
            FastaSource::records(file.path()),
            Err(TermSourceError::NotFasta)
        ));
    }

    #[test]
    fn ignores_comment_lines() {
        let file = write_fixture("; a comment\n>doc1\nACGTACGT\n");
        let records = FastaSource::records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].num_terms(4).unwrap(), 5);
    }
}
