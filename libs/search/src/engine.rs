// [libs/search/src/engine.rs]
/*!
 * APARATO: MOTOR DE CONSULTA COBS (V1.0)
 * RESPONSABILIDAD: ORQUESTACIÓN DE K-MERIZACIÓN, FETCH, AND Y RANKING
 *
 * Por cada índice abierto, en orden: k-meriza la consulta, canonicaliza y
 * hashea cada k-mer, pide en una sola llamada todas las filas `M·H` al
 * índice, AND-ea las `H` filas de cada k-mer, acumula el puntaje saturante
 * por documento, filtra por umbral, ordena y trunca a `top_k` (spec §4.7).
 * Los resultados de cada índice se concatenan en el orden en que el
 * llamador los abrió — no hay re-ranking entre índices.
 */

use cobs_core_kmer::{canonicalize, Hasher};
use cobs_core_parallel::Timer;
use cobs_index::{IndexFile, IndexHeader};

use crate::errors::SearchError;
use crate::result::SearchResult;
use crate::scoring::{accumulate_row, and_rows_into};

/// Orquesta consultas contra una colección de índices COBS ya abiertos.
///
/// Sin estado entre consultas salvo el `Timer`; los índices se abren una
/// sola vez y se reutilizan para muchas búsquedas (spec §4.7, "State machine").
pub struct SearchEngine {
    indices: Vec<IndexFile>,
    timer: Timer,
}

impl SearchEngine {
    /// Envuelve una lista ya abierta de índices. El orden de la lista es el
    /// orden en que sus resultados se concatenan en cada consulta.
    #[must_use]
    pub fn new(indices: Vec<IndexFile>) -> Self {
        Self {
            indices,
            timer: Timer::new(),
        }
    }

    /// Acceso de sólo lectura al acumulador de fases de la última consulta.
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Ejecuta una consulta contra todos los índices abiertos.
    ///
    /// `threshold` es la fracción mínima de k-mers de la consulta que un
    /// documento debe contener (`[0, 1]`); `top_k` trunca el resultado de
    /// *cada* índice a ese tamaño, `0` significa "sin límite".
    #[tracing::instrument(skip(self, query), fields(query_len = query.len(), num_indices = self.indices.len()))]
    pub fn search(&mut self, query: &[u8], threshold: f64, top_k: usize) -> Result<Vec<SearchResult>, SearchError> {
        self.timer.start("search");
        let mut results = Vec::new();
        for index in &self.indices {
            let mut per_index = search_one_index(index, query, threshold, top_k)?;
            results.append(&mut per_index);
        }
        self.timer.stop();
        Ok(results)
    }
}

fn search_one_index(index: &IndexFile, query: &[u8], threshold: f64, top_k: usize) -> Result<Vec<SearchResult>, SearchError> {
    let term_size = index.term_size() as usize;
    let num_hashes = index.num_hashes();
    let num_documents = index.num_documents() as usize;

    if term_size == 0 || query.len() < term_size {
        return Ok(Vec::new());
    }

    let num_kmers = query.len() - term_size + 1;
    let hasher = Hasher::new(num_hashes);

    let mut all_hashes = Vec::with_capacity(num_kmers * num_hashes as usize);
    let mut scratch = Vec::with_capacity(term_size);
    for start in 0..num_kmers {
        let kmer = &query[start..start + term_size];
        let bytes: &[u8] = if index.canonicalize() {
            let canonical = canonicalize(kmer);
            scratch.clear();
            scratch.extend_from_slice(&canonical.bytes);
            &scratch
        } else {
            kmer
        };
        hasher.hash_each(bytes, |h| all_hashes.push(h));
    }

    let total_row_bytes = index.total_row_bytes() as usize;
    let mut buffer = vec![0u8; num_kmers * num_hashes as usize * total_row_bytes];
    index.fetch_rows(&all_hashes, &mut buffer, 0, total_row_bytes as u64, total_row_bytes as u64)?;

    let segments = row_segments(index.header());

    let mut scores = vec![0u16; num_documents];
    let mut accumulator = vec![0u8; total_row_bytes];
    for kmer_index in 0..num_kmers {
        let kmer_rows_start = kmer_index * num_hashes as usize * total_row_bytes;
        accumulator.copy_from_slice(&buffer[kmer_rows_start..kmer_rows_start + total_row_bytes]);
        for h in 1..num_hashes as usize {
            let row_start = kmer_rows_start + h * total_row_bytes;
            and_rows_into(&mut accumulator, &buffer[row_start..row_start + total_row_bytes]);
        }

        for &(segment_start, segment_len, global_doc_offset) in &segments {
            accumulate_row(&accumulator[segment_start..segment_start + segment_len], global_doc_offset, &mut scores);
        }
    }

    let min_score = (threshold * num_kmers as f64).ceil() as u32;
    let mut candidates: Vec<(usize, u32)> = scores
        .iter()
        .enumerate()
        .filter_map(|(doc_index, &score)| {
            let score = score as u32;
            (score >= min_score).then_some((doc_index, score))
        })
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    if top_k > 0 {
        candidates.truncate(top_k);
    }

    let document_names = index.document_names();
    Ok(candidates
        .into_iter()
        .map(|(doc_index, score)| SearchResult {
            document_name: document_names[doc_index].clone(),
            score,
        })
        .collect())
}

/// Calcula, para el layout de `header`, los segmentos `(inicio, longitud,
/// desplazamiento global de documento)` dentro de la fila concatenada que
/// [`IndexFile::total_row_bytes`] describe: uno solo para un índice
/// clásico, uno por partición para uno compacto.
fn row_segments(header: &IndexHeader) -> Vec<(usize, usize, usize)> {
    match header {
        IndexHeader::Classic(h) => vec![(0, h.row_bytes() as usize, 0)],
        IndexHeader::Compact(h) => {
            let page_row_bytes = h.page_row_bytes() as usize;
            let page_size_docs = h.page_size_docs as usize;
            (0..h.num_partitions() as usize)
                .map(|p| (p * page_row_bytes, page_row_bytes, p * page_size_docs))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobs_core_bloom::{build_bloom_filter, BloomFilter};
    use cobs_core_termsource::PlainTextSource;
    use cobs_index::{write_classic_index, BuildOptions, CompactDocumentInput};
    use proptest::prelude::*;

    fn classic_index_over(documents: &[(&str, &[u8])], term_size: u32, num_hashes: u64) -> IndexFile {
        let signature_size = 256;
        let built: Vec<(String, BloomFilter)> = documents
            .iter()
            .map(|(name, bases)| {
                let source = PlainTextSource::from_bytes(bases.to_vec());
                let filter = build_bloom_filter(&source, term_size as usize, true, signature_size, num_hashes).unwrap();
                (name.to_string(), filter)
            })
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.cobs");
        write_classic_index(&built, term_size, true, num_hashes, &path, &BuildOptions::default()).unwrap();
        std::mem::forget(dir);
        IndexFile::open(&path, false).unwrap()
    }

    #[test]
    fn kmer_present_only_in_one_document_scores_there() {
        let index = classic_index_over(
            &[("doc1", b"AAAAACGTGAAAA"), ("doc2", b"TTTTTTTTTTTTT"), ("doc3", b"GGGGGGGGGGGGG")],
            5,
            1,
        );
        let mut engine = SearchEngine::new(vec![index]);
        let results = engine.search(b"ACGTG", 0.0, 0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_name, "doc1");
        assert_eq!(results[0].score, 1);
    }

    #[test]
    fn identical_documents_tie_break_by_ascending_index() {
        let index = classic_index_over(&[("doc0", b"ACGTACGT"), ("doc1", b"ACGTACGT")], 4, 2);
        let mut engine = SearchEngine::new(vec![index]);
        let results = engine.search(b"ACGTACGT", 0.0, 0).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document_name, "doc0");
        assert_eq!(results[1].document_name, "doc1");
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn query_shorter_than_k_yields_empty_result() {
        let index = classic_index_over(&[("doc0", b"ACGTACGT")], 8, 1);
        let mut engine = SearchEngine::new(vec![index]);
        let results = engine.search(b"ACG", 0.0, 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn threshold_one_requires_every_query_kmer_to_match() {
        let index = classic_index_over(&[("doc0", b"ACGTACGTACGT")], 4, 1);
        let mut engine = SearchEngine::new(vec![index]);
        let results = engine.search(b"ACGT", 1.0, 0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 1);
    }

    #[test]
    fn top_k_truncates_per_index_results() {
        let index = classic_index_over(
            &[("doc0", b"AAAAA"), ("doc1", b"AAAAA"), ("doc2", b"AAAAA")],
            5,
            1,
        );
        let mut engine = SearchEngine::new(vec![index]);
        let results = engine.search(b"AAAAA", 0.0, 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn compact_and_classic_agree_on_the_same_query() {
        let term_size = 4u32;
        let num_hashes = 2u64;
        let docs = [("small", b"ACGT".as_slice()), ("big", b"ACGTACGTACGT".as_slice()), ("other", b"TTTTAAAACCCC".as_slice())];

        let classic_built: Vec<(String, BloomFilter)> = docs
            .iter()
            .map(|(name, bases)| {
                let source = PlainTextSource::from_bytes(bases.to_vec());
                let filter = build_bloom_filter(&source, term_size as usize, true, 256, num_hashes).unwrap();
                (name.to_string(), filter)
            })
            .collect();
        let classic_dir = tempfile::tempdir().unwrap();
        let classic_path = classic_dir.path().join("classic.cobs");
        write_classic_index(&classic_built, term_size, true, num_hashes, &classic_path, &BuildOptions::default()).unwrap();

        let compact_documents: Vec<_> = docs
            .iter()
            .map(|(name, bases)| {
                let source = PlainTextSource::from_bytes(bases.to_vec());
                let num_terms = {
                    use cobs_core_termsource::TermSource;
                    source.num_terms(term_size as usize).unwrap()
                };
                CompactDocumentInput {
                    name: name.to_string(),
                    source,
                    num_terms,
                }
            })
            .collect();
        let compact_dir = tempfile::tempdir().unwrap();
        let compact_path = compact_dir.path().join("compact.cobs");
        cobs_index::write_compact_index(compact_documents, term_size, true, num_hashes, 0.01, 2, &compact_path, &BuildOptions::default()).unwrap();

        let mut classic_engine = SearchEngine::new(vec![IndexFile::open(&classic_path, false).unwrap()]);
        let mut compact_engine = SearchEngine::new(vec![IndexFile::open(&compact_path, false).unwrap()]);

        let mut classic_results = classic_engine.search(b"ACGTACGT", 0.0, 0).unwrap();
        let mut compact_results = compact_engine.search(b"ACGTACGT", 0.0, 0).unwrap();
        classic_results.sort_by(|a, b| a.document_name.cmp(&b.document_name));
        compact_results.sort_by(|a, b| a.document_name.cmp(&b.document_name));
        assert_eq!(classic_results, compact_results);
    }

    proptest! {
        #[test]
        fn raising_the_threshold_never_admits_more_documents(
            docs in proptest::collection::vec("[ACGT]{16,40}", 2..5),
            query_len in 4usize..16,
            threshold_a in 0.0f64..1.0,
            threshold_b in 0.0f64..1.0,
        ) {
            let names: Vec<String> = (0..docs.len()).map(|i| format!("doc{i}")).collect();
            let named: Vec<(&str, &[u8])> = names.iter().zip(docs.iter()).map(|(n, d)| (n.as_str(), d.as_bytes())).collect();
            let index = classic_index_over(&named, 4, 2);

            let query_len = query_len.min(docs[0].len());
            let query = &docs[0].as_bytes()[..query_len];

            let mut engine = SearchEngine::new(vec![index]);
            let low = threshold_a.min(threshold_b);
            let high = threshold_a.max(threshold_b);
            let results_low = engine.search(query, low, 0).unwrap();
            let results_high = engine.search(query, high, 0).unwrap();
            prop_assert!(results_high.len() <= results_low.len());
        }

        #[test]
        fn top_k_never_returns_more_than_requested(
            docs in proptest::collection::vec("[ACGT]{16,40}", 1..6),
            top_k in 1usize..4,
        ) {
            let names: Vec<String> = (0..docs.len()).map(|i| format!("doc{i}")).collect();
            let named: Vec<(&str, &[u8])> = names.iter().zip(docs.iter()).map(|(n, d)| (n.as_str(), d.as_bytes())).collect();
            let index = classic_index_over(&named, 4, 2);

            let query = &docs[0].as_bytes()[..4];
            let mut engine = SearchEngine::new(vec![index]);
            let results = engine.search(query, 0.0, top_k).unwrap();
            prop_assert!(results.len() <= top_k);
        }
    }
}
