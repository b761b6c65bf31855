// [apps/cobs-cli/src/commands/generate.rs]
/*!
 * APARATO: COMANDO `generate-queries` (V1.0)
 * RESPONSABILIDAD: CONSULTAS SINTÉTICAS POSITIVAS Y NEGATIVAS A PARTIR DE UNA COLECCIÓN
 *
 * Positivas: subcadenas reales, tomadas de documentos reales de la
 * colección — por construcción, comparten al menos un k-mer con su
 * documento de origen. Negativas: secuencias ACGT aleatorias; con
 * `--true-negative` se verifica contra el conjunto de k-mers canónicos de
 * toda la colección, regenerando hasta obtener una secuencia que no
 * comparta ninguno.
 */

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cobs_core_kmer::canonicalize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::cli::FileType;
use crate::documents::load_sequences;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Manifiesto que acompaña el FASTA de salida, con los parámetros que lo
/// produjeron — para que una corrida sea reproducible sin re-leer los
/// argumentos de línea de comandos originales.
#[derive(Serialize)]
struct QueryManifest {
    source: String,
    term_size: usize,
    num_positive: usize,
    num_negative: usize,
    true_negative: bool,
    query_length: usize,
    seed: Option<u64>,
}

/// `generate-queries`.
#[allow(clippy::too_many_arguments)]
pub fn run(
    path: &Path,
    file_type: FileType,
    term_size: usize,
    num_positive: usize,
    num_negative: usize,
    true_negative: bool,
    query_length: usize,
    seed: Option<u64>,
    output: &Path,
) -> Result<()> {
    let sequences = load_sequences(path, file_type)?;
    let usable: Vec<&crate::documents::NamedSequence> = sequences.iter().filter(|s| s.bytes.len() >= query_length).collect();
    if num_positive > 0 && usable.is_empty() {
        bail!("no source sequence is long enough to sample a {query_length}-base positive query");
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let known_kmers: Option<HashSet<Vec<u8>>> = true_negative.then(|| collect_canonical_kmers(&sequences, term_size));

    let mut out = std::fs::File::create(output).with_context(|| format!("creating {}", output.display()))?;

    for i in 0..num_positive {
        let source = usable[rng.gen_range(0..usable.len())];
        let start = rng.gen_range(0..=source.bytes.len() - query_length);
        let sampled = &source.bytes[start..start + query_length];
        writeln!(out, ">positive_{i}\n{}", String::from_utf8_lossy(sampled))?;
    }

    for i in 0..num_negative {
        let sequence = loop {
            let candidate: Vec<u8> = (0..query_length).map(|_| BASES[rng.gen_range(0..4)]).collect();
            match &known_kmers {
                Some(known) if contains_known_kmer(&candidate, term_size, known) => continue,
                _ => break candidate,
            }
        };
        writeln!(out, ">negative_{i}\n{}", String::from_utf8_lossy(&sequence))?;
    }

    let manifest = QueryManifest {
        source: path.display().to_string(),
        term_size,
        num_positive,
        num_negative,
        true_negative,
        query_length,
        seed,
    };
    let manifest_path = output.with_extension("manifest.json");
    let manifest_json = serde_json::to_string_pretty(&manifest).expect("manifest serializes");
    std::fs::write(&manifest_path, manifest_json).with_context(|| format!("writing {}", manifest_path.display()))?;

    Ok(())
}

fn collect_canonical_kmers(sequences: &[crate::documents::NamedSequence], term_size: usize) -> HashSet<Vec<u8>> {
    let mut known = HashSet::new();
    for sequence in sequences {
        if term_size == 0 || sequence.bytes.len() < term_size {
            continue;
        }
        for start in 0..=(sequence.bytes.len() - term_size) {
            let canonical = canonicalize(&sequence.bytes[start..start + term_size]);
            known.insert(canonical.bytes);
        }
    }
    known
}

fn contains_known_kmer(candidate: &[u8], term_size: usize, known: &HashSet<Vec<u8>>) -> bool {
    if term_size == 0 || candidate.len() < term_size {
        return false;
    }
    (0..=(candidate.len() - term_size)).any(|start| {
        let canonical = canonicalize(&candidate[start..start + term_size]);
        known.contains(&canonical.bytes)
    })
}
