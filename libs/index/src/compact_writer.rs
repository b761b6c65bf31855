// [libs/index/src/compact_writer.rs]
/*!
 * APARATO: CONSTRUCTOR DE ÍNDICE COMPACTO (V1.0)
 * RESPONSABILIDAD: PARTICIONADO POR CARDINALIDAD Y CONCATENACIÓN DE SLABS
 *
 * spec §4.5: los documentos se ordenan por número de términos ascendente,
 * se agrupan de a `page_size_docs`, y cada grupo recibe su propio
 * `signature_size_p` dimensionado a partir del *máximo* conteo de términos
 * del grupo. Cada grupo se transpone como un slab clásico independiente —
 * reutilizando `classic_writer::transpose_batch` — y los slabs se
 * concatenan verticalmente detrás de un único encabezado compacto. El
 * último grupo, si es corto, se transpone igual pero con `virtual_width`
 * fijado al tamaño de página completo, rellenando las columnas que faltan
 * con ceros (spec: "padded documents never match").
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cobs_core_bloom::{build_bloom_filter, signature_size_for_fpr, BloomFilter};
use cobs_core_termsource::TermSource;
use tracing::info;

use crate::classic_writer::{transpose_batch, BuildOptions};
use crate::errors::IndexError;
use crate::header::{CompactHeader, IndexHeader};

/// Un documento a indexar en un índice compacto: su nombre, la fuente de
/// términos que lo respalda, y su cardinalidad ya conocida (usada para
/// ordenar y dimensionar particiones sin tener que recontar).
pub struct CompactDocumentInput<S: TermSource> {
    /// Nombre lógico del documento.
    pub name: String,
    /// Fuente de q-gramas que respalda este documento.
    pub source: S,
    /// Número de q-gramas de tamaño `term_size` que produce.
    pub num_terms: u64,
}

/// Construye un índice compacto a partir de una lista de documentos con
/// cardinalidad conocida.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip(documents), fields(num_documents = documents.len()))]
pub fn write_compact_index<S: TermSource>(
    mut documents: Vec<CompactDocumentInput<S>>,
    term_size: u32,
    canonicalize: bool,
    num_hashes: u64,
    target_fpr: f64,
    page_size_docs: u64,
    out_path: &Path,
    options: &BuildOptions,
) -> Result<(), IndexError> {
    documents.sort_by_key(|d| d.num_terms);

    let document_names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
    let page_size_docs = page_size_docs.max(1);

    if documents.is_empty() {
        let header = IndexHeader::Compact(CompactHeader {
            term_size,
            canonicalize,
            num_hashes,
            page_size_docs,
            partition_signature_sizes: Vec::new(),
            document_names,
        });
        return crate::classic_writer::finalize(out_path, &header, None);
    }

    let mut partition_signature_sizes = Vec::new();
    let mut group_payload_paths: Vec<PathBuf> = Vec::new();

    let mut start = 0usize;
    while start < documents.len() {
        let end = (start + page_size_docs as usize).min(documents.len());
        let group = &documents[start..end];

        let max_terms = group.iter().map(|d| d.num_terms).max().unwrap_or(0);
        let signature_size_p = signature_size_for_fpr(num_hashes, max_terms, target_fpr);
        partition_signature_sizes.push(signature_size_p);

        info!(
            group_index = partition_signature_sizes.len() - 1,
            group_len = group.len(),
            signature_size_p,
            "building compact partition"
        );

        let filters: Result<Vec<(String, BloomFilter)>, IndexError> = group
            .iter()
            .map(|d| {
                let filter = build_bloom_filter(&d.source, term_size as usize, canonicalize, signature_size_p, num_hashes)?;
                Ok((d.name.clone(), filter))
            })
            .collect();
        let filters = filters?;

        let path = transpose_batch(&filters, page_size_docs, signature_size_p, options)?;
        group_payload_paths.push(path);

        start = end;
    }

    let header = IndexHeader::Compact(CompactHeader {
        term_size,
        canonicalize,
        num_hashes,
        page_size_docs,
        partition_signature_sizes,
        document_names,
    });

    finalize_compact(out_path, &header, &group_payload_paths)?;

    if !options.keep_temporary {
        for path in &group_payload_paths {
            let _ = std::fs::remove_file(path);
        }
    }
    Ok(())
}

/// Combina slabs de grupo ya construidos por separado (p. ej. por
/// `compact-construct-combine`) en un único archivo compacto, sin
/// reconstruir ningún filtro.
pub fn combine_compact_groups(
    term_size: u32,
    canonicalize: bool,
    num_hashes: u64,
    page_size_docs: u64,
    partition_signature_sizes: Vec<u64>,
    document_names: Vec<String>,
    group_payload_paths: &[PathBuf],
    out_path: &Path,
) -> Result<(), IndexError> {
    let header = IndexHeader::Compact(CompactHeader {
        term_size,
        canonicalize,
        num_hashes,
        page_size_docs,
        partition_signature_sizes,
        document_names,
    });
    finalize_compact(out_path, &header, group_payload_paths)
}

fn finalize_compact(out_path: &Path, header: &IndexHeader, group_payload_paths: &[PathBuf]) -> Result<(), IndexError> {
    let parent = out_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new().tempfile_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        header.write_to(&mut writer)?;
        for path in group_payload_paths {
            let mut payload = File::open(path)?;
            std::io::copy(&mut payload, &mut writer)?;
        }
        writer.flush()?;
    }
    tmp.persist(out_path).map_err(|e| IndexError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobs_core_termsource::PlainTextSource;

    fn doc(name: &str, bases: &[u8], term_size: u32) -> CompactDocumentInput<PlainTextSource> {
        let source = PlainTextSource::from_bytes(bases.to_vec());
        let num_terms = source.num_terms(term_size as usize).unwrap();
        CompactDocumentInput {
            name: name.to_string(),
            source,
            num_terms,
        }
    }

    #[test]
    fn empty_document_list_produces_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("index.cobs");
        write_compact_index::<PlainTextSource>(vec![], 4, true, 2, 0.01, 4, &out_path, &BuildOptions::default()).unwrap();

        let mut f = File::open(&out_path).unwrap();
        let header = crate::header::IndexHeader::read_from(&mut f).unwrap();
        match header {
            crate::header::IndexHeader::Compact(h) => assert_eq!(h.num_documents(), 0),
            _ => panic!("expected compact header"),
        }
    }

    #[test]
    fn short_last_partition_is_recorded_with_real_names_only() {
        let documents = vec![
            doc("a", b"ACGTACGT", 4),
            doc("b", b"ACGTACGTACGT", 4),
            doc("c", b"ACGT", 4),
        ];
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("index.cobs");
        write_compact_index(documents, 4, true, 2, 0.01, 2, &out_path, &BuildOptions::default()).unwrap();

        let mut f = File::open(&out_path).unwrap();
        let header = crate::header::IndexHeader::read_from(&mut f).unwrap();
        match header {
            crate::header::IndexHeader::Compact(h) => {
                assert_eq!(h.num_documents(), 3);
                assert_eq!(h.num_partitions(), 2);
            }
            _ => panic!("expected compact header"),
        }
    }

    #[test]
    fn documents_are_sorted_by_cardinality_ascending() {
        let documents = vec![
            doc("big", b"ACGTACGTACGTACGT", 4),
            doc("small", b"ACGT", 4),
        ];
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("index.cobs");
        write_compact_index(documents, 4, true, 1, 0.01, 4, &out_path, &BuildOptions::default()).unwrap();

        let mut f = File::open(&out_path).unwrap();
        let header = crate::header::IndexHeader::read_from(&mut f).unwrap();
        match header {
            crate::header::IndexHeader::Compact(h) => assert_eq!(h.document_names, vec!["small", "big"]),
            _ => panic!("expected compact header"),
        }
    }
}
