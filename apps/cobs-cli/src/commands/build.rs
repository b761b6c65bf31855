// [apps/cobs-cli/src/commands/build.rs]
/*!
 * APARATO: COMANDOS DE CONSTRUCCIÓN DE ÍNDICE (V1.0)
 * RESPONSABILIDAD: `classic-construct(-random)`, `compact-construct(-combine)`, `classic-combine`
 *
 * Cada comando resuelve sus flags en un `BuildOptions` y delega el trabajo
 * pesado a `cobs-index`; esta capa sólo hace I/O de colección, validación de
 * "clobber"/"continue", y el cálculo de `signature_size` cuando no se pasa
 * explícitamente.
 */

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cobs_core_bloom::{build_bloom_filter, signature_size_for_fpr, BloomFilter};
use cobs_core_termsource::TermSource;
use cobs_index::{
    combine_classic_indices, compact_writer::combine_compact_groups, write_classic_index, write_compact_index,
    BuildOptions, ClassicHeader, CompactDocumentInput, IndexHeader,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::cli::FileType;
use crate::documents::load_documents;

fn build_options(ram_mib: u64, threads: usize, keep_temporary: bool, tmp_path: Option<PathBuf>) -> BuildOptions {
    BuildOptions {
        ram_budget_bytes: ram_mib * (1 << 20),
        num_threads: threads.max(1),
        keep_temporary,
        tmp_dir: tmp_path,
    }
}

/// `out_file` ya existe: decide si seguir, según `clobber`/`continue_`.
///
/// Retorna `Ok(true)` si la construcción debe saltarse por completo
/// (`--continue`).
fn resolve_existing_output(out_file: &Path, clobber: bool, continue_: bool) -> Result<bool> {
    if !out_file.exists() {
        return Ok(false);
    }
    if continue_ {
        info!(path = %out_file.display(), "output already exists; --continue requested, skipping build");
        return Ok(true);
    }
    if !clobber {
        bail!("{} already exists (pass --clobber to overwrite, or --continue to skip)", out_file.display());
    }
    Ok(false)
}

/// `classic-construct`.
#[allow(clippy::too_many_arguments)]
pub fn classic_construct(
    input: &Path,
    out_file: &Path,
    file_type: FileType,
    term_size: usize,
    num_hashes: u64,
    false_positive_rate: f64,
    signature_size: Option<u64>,
    ram_mib: u64,
    threads: usize,
    clobber: bool,
    continue_: bool,
    keep_temporary: bool,
    canonicalize_terms: bool,
    tmp_path: Option<PathBuf>,
) -> Result<()> {
    if resolve_existing_output(out_file, clobber, continue_)? {
        return Ok(());
    }

    let documents = load_documents(input, file_type)?;
    let max_terms = documents
        .iter()
        .map(|d| d.source.num_terms(term_size))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .max()
        .unwrap_or(0);
    let signature_size = signature_size.unwrap_or_else(|| signature_size_for_fpr(num_hashes, max_terms, false_positive_rate));

    info!(num_documents = documents.len(), signature_size, "building Bloom filters");
    let filters: Vec<(String, BloomFilter)> = documents
        .into_iter()
        .map(|d| {
            let filter = build_bloom_filter(&d.source, term_size, canonicalize_terms, signature_size, num_hashes)?;
            Ok((d.name, filter))
        })
        .collect::<Result<Vec<_>, cobs_core_bloom::BloomError>>()?;

    let options = build_options(ram_mib, threads, keep_temporary, tmp_path);
    write_classic_index(&filters, term_size as u32, canonicalize_terms, num_hashes, out_file, &options)
        .context("writing classic index")
}

/// `classic-construct-random`: firmas aleatorias, sin documentos reales.
pub fn classic_construct_random(out: &Path, signature_size: u64, num_documents: u64, fill_rate: f64, num_hashes: u64, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let num_bits_per_doc = ((signature_size as f64) * fill_rate.clamp(0.0, 1.0)) as u64;
    let filters: Vec<(String, BloomFilter)> = (0..num_documents)
        .map(|i| {
            let mut filter = BloomFilter::zeroed(signature_size);
            for _ in 0..num_bits_per_doc {
                filter.set_bit(rng.gen_range(0..signature_size));
            }
            (format!("random_doc_{i}"), filter)
        })
        .collect();

    write_classic_index(&filters, 0, false, num_hashes, out, &BuildOptions::default()).context("writing synthetic classic index")
}

/// `compact-construct`.
#[allow(clippy::too_many_arguments)]
pub fn compact_construct(
    input: &Path,
    out_file: &Path,
    file_type: FileType,
    term_size: usize,
    num_hashes: u64,
    false_positive_rate: f64,
    page_size: u64,
    ram_mib: u64,
    threads: usize,
    clobber: bool,
    continue_: bool,
    keep_temporary: bool,
    canonicalize_terms: bool,
    tmp_path: Option<PathBuf>,
) -> Result<()> {
    if resolve_existing_output(out_file, clobber, continue_)? {
        return Ok(());
    }

    let documents = load_documents(input, file_type)?;
    let inputs = documents
        .into_iter()
        .map(|d| {
            let num_terms = d.source.num_terms(term_size)?;
            Ok(CompactDocumentInput {
                name: d.name,
                source: d.source,
                num_terms,
            })
        })
        .collect::<Result<Vec<_>, cobs_core_termsource::TermSourceError>>()?;

    let options = build_options(ram_mib, threads, keep_temporary, tmp_path);
    write_compact_index(inputs, term_size as u32, canonicalize_terms, num_hashes, false_positive_rate, page_size, out_file, &options)
        .context("writing compact index")
}

/// `compact-construct-combine`: combina particiones clásicas ya construidas
/// (p. ej. por invocaciones independientes de `classic-construct`, una por
/// partición) en un único índice compacto, sin reconstruir ningún filtro.
pub fn compact_construct_combine(in_dir: &Path, out_file: &Path, page_size: u64) -> Result<()> {
    let mut partition_files: Vec<PathBuf> = std::fs::read_dir(in_dir)
        .with_context(|| format!("listing {}", in_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    partition_files.sort();

    if partition_files.is_empty() {
        bail!("{} contains no partition files", in_dir.display());
    }

    let mut document_names = Vec::new();
    let mut partition_signature_sizes = Vec::new();
    let mut group_payload_paths = Vec::new();
    let mut common: Option<(u32, bool, u64)> = None;

    for path in &partition_files {
        let mut file = std::fs::File::open(path)?;
        let header = IndexHeader::read_from(&mut file)?;
        let header: ClassicHeader = match header {
            IndexHeader::Classic(h) => h,
            IndexHeader::Compact(_) => bail!("{} is a compact index, expected classic partitions", path.display()),
        };
        let fields = (header.term_size, header.canonicalize, header.num_hashes);
        match &common {
            None => common = Some(fields),
            Some(expected) if *expected != fields => bail!("{} has incompatible header fields", path.display()),
            _ => {}
        }
        document_names.extend(header.document_names);
        partition_signature_sizes.push(header.signature_size);

        let mut payload_file = tempfile::NamedTempFile::new_in(in_dir)?;
        std::io::copy(&mut file, payload_file.as_file_mut())?;
        group_payload_paths.push(payload_file.into_temp_path().keep()?);
    }

    let (term_size, canonicalize_terms, num_hashes) = common.expect("checked non-empty above");
    combine_compact_groups(term_size, canonicalize_terms, num_hashes, page_size, partition_signature_sizes, document_names, &group_payload_paths, out_file)
        .context("combining compact partitions")?;

    for path in &group_payload_paths {
        let _ = std::fs::remove_file(path);
    }
    Ok(())
}

/// `classic-combine`: fusiona índices clásicos parciales (documentos
/// disjuntos, mismo `signature_size`) en uno solo.
pub fn classic_combine(in_dir: &Path, out_dir: &Path, out_file: &Path, ram_mib: u64, threads: usize) -> Result<()> {
    let mut partials: Vec<PathBuf> = std::fs::read_dir(in_dir)
        .with_context(|| format!("listing {}", in_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    partials.sort();

    if partials.is_empty() {
        bail!("{} contains no partial indices", in_dir.display());
    }

    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let options = build_options(ram_mib, threads, false, Some(out_dir.to_path_buf()));
    combine_classic_indices(&partials, out_file, &options).context("combining classic partials")
}
