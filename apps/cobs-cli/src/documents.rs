// [apps/cobs-cli/src/documents.rs]
/*!
 * APARATO: CARGA DE COLECCIONES DE DOCUMENTOS (V1.0)
 * RESPONSABILIDAD: RESOLVER `path` (ARCHIVO O DIRECTORIO) EN FUENTES NOMBRADAS
 *
 * Los comandos de construcción, volcado y generación de consultas comparten
 * la misma noción de "colección": un único archivo o un directorio de
 * archivos, cada uno interpretado como texto plano (un documento por
 * archivo) o como FASTA (uno o más documentos por archivo).
 */

use std::path::Path;

use anyhow::{Context, Result};
use cobs_core_termsource::{FastaSource, PlainTextSource, TermSource};

use crate::cli::FileType;

/// Un documento nombrado, listo para alimentar al constructor de Bloom o al
/// motor de consulta.
pub struct NamedDocument {
    /// Nombre lógico que aparecerá en el índice y en los resultados.
    pub name: String,
    /// Fuente de q-gramas respaldando este documento.
    pub source: Box<dyn TermSource>,
}

/// Carga todos los documentos bajo `path` según `file_type`.
///
/// Si `path` es un directorio, sus archivos se visitan en orden
/// lexicográfico de nombre de archivo; un archivo FASTA con varios
/// registros produce un documento por registro.
pub fn load_documents(path: &Path, file_type: FileType) -> Result<Vec<NamedDocument>> {
    let mut files = collect_files(path)?;
    files.sort();

    let mut documents = Vec::new();
    for file in files {
        match file_type {
            FileType::PlainText => {
                let source = PlainTextSource::open(&file).with_context(|| format!("reading {}", file.display()))?;
                let name = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                documents.push(NamedDocument {
                    name,
                    source: Box::new(source),
                });
            }
            FileType::Fasta => {
                let records = FastaSource::records(&file).with_context(|| format!("reading {}", file.display()))?;
                for record in records {
                    documents.push(NamedDocument {
                        name: record.name().to_string(),
                        source: Box::new(record),
                    });
                }
            }
        }
    }
    Ok(documents)
}

/// Igual que [`load_documents`], pero conservando acceso a la secuencia
/// cruda de cada documento (necesario para muestrear subcadenas reales al
/// generar consultas sintéticas).
pub struct NamedSequence {
    /// Nombre lógico del documento.
    pub name: String,
    /// Bytes crudos de la secuencia.
    pub bytes: Vec<u8>,
}

/// Carga todos los documentos bajo `path` conservando sus bytes crudos.
pub fn load_sequences(path: &Path, file_type: FileType) -> Result<Vec<NamedSequence>> {
    let mut files = collect_files(path)?;
    files.sort();

    let mut sequences = Vec::new();
    for file in files {
        match file_type {
            FileType::PlainText => {
                let source = PlainTextSource::open(&file).with_context(|| format!("reading {}", file.display()))?;
                let name = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                sequences.push(NamedSequence {
                    name,
                    bytes: source.bytes().to_vec(),
                });
            }
            FileType::Fasta => {
                let records = FastaSource::records(&file).with_context(|| format!("reading {}", file.display()))?;
                for record in records {
                    sequences.push(NamedSequence {
                        name: record.name().to_string(),
                        bytes: record.bytes().to_vec(),
                    });
                }
            }
        }
    }
    Ok(sequences)
}

fn collect_files(path: &Path) -> Result<Vec<std::path::PathBuf>> {
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path).with_context(|| format!("listing {}", path.display()))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}
