// [libs/index/src/classic_writer.rs]
/*!
 * APARATO: CONSTRUCTOR DE ÍNDICE CLÁSICO (V1.0)
 * RESPONSABILIDAD: TRANSPOSICIÓN POR LOTES Y MERGE POR PARES EN UN SLAB BIT-SLICED
 *
 * Estrategia de spec §4.4: se procesan los documentos en lotes que caben en
 * el presupuesto de RAM, cada lote se transpone a un slab parcial (filas
 * bit-sliced sólo sobre ese lote); los slabs parciales se fusionan de a
 * pares por concatenación horizontal de filas hasta que queda uno solo. El
 * archivo final se escribe en una ruta temporal y se renombra — la
 * atomicidad que spec §3 exige para que la sola presencia del archivo
 * implique build completo.
 */

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cobs_core_bloom::BloomFilter;
use cobs_core_parallel::parallel_for;
use tracing::{debug, info};

use crate::errors::IndexError;
use crate::header::{ClassicHeader, IndexHeader};

/// Parámetros de recursos para una construcción clásica o para un grupo de
/// la construcción compacta que reutiliza este mismo motor de transposición.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Presupuesto de RAM para un lote de transposición, en bytes.
    pub ram_budget_bytes: u64,
    /// Número de hilos para `parallel_for`.
    pub num_threads: usize,
    /// Si es `false`, los slabs parciales y de merge se borran al terminar.
    pub keep_temporary: bool,
    /// Directorio donde crear archivos temporales; `None` usa el del sistema.
    pub tmp_dir: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ram_budget_bytes: 1 << 30,
            num_threads: num_cpus::get(),
            keep_temporary: false,
            tmp_dir: None,
        }
    }
}

/// Construye un índice clásico a partir de filtros de Bloom ya dimensionados
/// de forma uniforme, uno por documento, en el orden en que deben aparecer
/// como columnas del índice.
#[tracing::instrument(skip(documents, options), fields(num_documents = documents.len()))]
pub fn write_classic_index(
    documents: &[(String, BloomFilter)],
    term_size: u32,
    canonicalize: bool,
    num_hashes: u64,
    out_path: &Path,
    options: &BuildOptions,
) -> Result<(), IndexError> {
    let num_documents = documents.len() as u64;
    let document_names: Vec<String> = documents.iter().map(|(name, _)| name.clone()).collect();

    let signature_size = match documents.first() {
        Some((_, filter)) => filter.signature_size(),
        None => 8,
    };
    for (_, filter) in documents {
        if filter.signature_size() != signature_size {
            return Err(IndexError::NonUniformSignatureWidth);
        }
    }

    let header = IndexHeader::Classic(ClassicHeader {
        term_size,
        canonicalize,
        num_hashes,
        signature_size,
        document_names,
    });

    if num_documents == 0 {
        return finalize(out_path, &header, None);
    }

    info!(num_documents, signature_size, "building classic index");

    let row_bytes_full = num_documents.div_ceil(8).max(1);
    let batch_docs = (options.ram_budget_bytes / row_bytes_full).clamp(1, num_documents);

    let mut partials: Vec<(PathBuf, u64)> = Vec::new();
    let mut start = 0u64;
    while start < num_documents {
        let end = (start + batch_docs).min(num_documents);
        let batch = &documents[start as usize..end as usize];
        let path = transpose_batch(batch, batch.len() as u64, signature_size, options)?;
        partials.push((path, end - start));
        start = end;
    }

    while partials.len() > 1 {
        debug!(remaining = partials.len(), "merging classic partials");
        let mut next_round = Vec::with_capacity(partials.len().div_ceil(2));
        let mut iter = partials.into_iter();
        while let Some((path_a, len_a)) = iter.next() {
            match iter.next() {
                Some((path_b, len_b)) => {
                    let merged = merge_pair(&path_a, len_a, &path_b, len_b, signature_size, options)?;
                    if !options.keep_temporary {
                        let _ = std::fs::remove_file(&path_a);
                        let _ = std::fs::remove_file(&path_b);
                    }
                    next_round.push((merged, len_a + len_b));
                }
                None => next_round.push((path_a, len_a)),
            }
        }
        partials = next_round;
    }

    let (payload_path, final_len) = partials.into_iter().next().expect("non-empty document list produced at least one partial");
    debug_assert_eq!(final_len, num_documents);

    finalize(out_path, &header, Some(&payload_path))?;
    if !options.keep_temporary {
        let _ = std::fs::remove_file(&payload_path);
    }
    Ok(())
}

/// Transpone un lote de filtros en un slab parcial: `signature_size` filas
/// de `⌈virtual_width/8⌉` bytes. Las columnas en `[batch.len(), virtual_width)`
/// quedan en cero — usado por el constructor compacto para rellenar el
/// último grupo corto de una partición sin alterar el ancho de fila.
pub(crate) fn transpose_batch(
    batch: &[(String, BloomFilter)],
    virtual_width: u64,
    signature_size: u64,
    options: &BuildOptions,
) -> Result<PathBuf, IndexError> {
    let row_bytes = virtual_width.div_ceil(8);
    let file = new_temp_file(options)?;
    file.set_len(signature_size * row_bytes)?;

    let first_error: Mutex<Option<std::io::Error>> = Mutex::new(None);
    parallel_for(0, signature_size, options.num_threads, |row_index| {
        let mut row = vec![0u8; row_bytes as usize];
        for (doc_index, (_, filter)) in batch.iter().enumerate() {
            if filter.test_bit(row_index) {
                row[doc_index / 8] |= 1 << (doc_index % 8);
            }
        }
        if let Err(e) = file.write_at(&row, row_index * row_bytes) {
            let mut slot = first_error.lock().unwrap();
            if slot.is_none() {
                *slot = Some(e);
            }
        }
    });
    if let Some(e) = first_error.into_inner().unwrap() {
        return Err(IndexError::Io(e));
    }

    file.into_temp_path().keep().map_err(|e| IndexError::Io(e.error))
}

/// Fusiona dos slabs parciales por concatenación horizontal de filas
/// correspondientes: la fila `i` del slab A seguida de la fila `i` del slab
/// B, para cada `i` en `0..signature_size`.
fn merge_pair(
    path_a: &Path,
    len_a: u64,
    path_b: &Path,
    len_b: u64,
    signature_size: u64,
    options: &BuildOptions,
) -> Result<PathBuf, IndexError> {
    let row_bytes_a = len_a.div_ceil(8);
    let row_bytes_b = len_b.div_ceil(8);
    let row_bytes_out = row_bytes_a + row_bytes_b;

    let file_a = File::open(path_a)?;
    let file_b = File::open(path_b)?;
    let out = new_temp_file(options)?;
    out.set_len(signature_size * row_bytes_out)?;

    let first_error: Mutex<Option<std::io::Error>> = Mutex::new(None);
    parallel_for(0, signature_size, options.num_threads, |row_index| {
        let merge_row = || -> std::io::Result<()> {
            let mut buf = vec![0u8; row_bytes_out as usize];
            file_a.read_exact_at(&mut buf[..row_bytes_a as usize], row_index * row_bytes_a)?;
            file_b.read_exact_at(&mut buf[row_bytes_a as usize..], row_index * row_bytes_b)?;
            out.write_at(&buf, row_index * row_bytes_out)?;
            Ok(())
        };
        if let Err(e) = merge_row() {
            let mut slot = first_error.lock().unwrap();
            if slot.is_none() {
                *slot = Some(e);
            }
        }
    });
    if let Some(e) = first_error.into_inner().unwrap() {
        return Err(IndexError::Io(e));
    }

    out.into_temp_path().keep().map_err(|e| IndexError::Io(e.error))
}

fn new_temp_file(options: &BuildOptions) -> Result<tempfile::NamedTempFile, IndexError> {
    let builder = tempfile::Builder::new();
    let file = match &options.tmp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    Ok(file)
}

/// Combina varios índices clásicos parciales (mismos `term_size`,
/// `canonicalize`, `num_hashes` y `signature_size`, cada uno sobre un
/// subconjunto disjunto de documentos) en un único índice, por
/// concatenación horizontal de filas — la generalización a N archivos de
/// [`merge_pair`], operando sobre archivos ya completos (con encabezado)
/// en vez de slabs crudos.
pub fn combine_classic_indices(partial_paths: &[PathBuf], out_path: &Path, options: &BuildOptions) -> Result<(), IndexError> {
    if partial_paths.is_empty() {
        return Err(IndexError::Precondition("combine_classic_indices requires at least one partial".into()));
    }

    struct Partial {
        file: File,
        payload_offset: u64,
        row_bytes: u64,
    }

    let mut document_names = Vec::new();
    let mut partials = Vec::with_capacity(partial_paths.len());
    let mut common: Option<(u32, bool, u64, u64)> = None;

    for path in partial_paths {
        let mut file = File::open(path)?;
        let header = IndexHeader::read_from(&mut file)?;
        let header = match header {
            IndexHeader::Classic(h) => h,
            IndexHeader::Compact(_) => return Err(IndexError::Format(format!("{} is a compact index, not classic", path.display()))),
        };
        let payload_offset = file.stream_position()?;
        let fields = (header.term_size, header.canonicalize, header.num_hashes, header.signature_size);
        match &common {
            None => common = Some(fields),
            Some(expected) if *expected != fields => {
                return Err(IndexError::Format(format!("{} has incompatible header fields for a combine", path.display())));
            }
            _ => {}
        }
        document_names.extend(header.document_names);
        partials.push(Partial {
            file,
            payload_offset,
            row_bytes: header.row_bytes(),
        });
    }

    let (term_size, canonicalize, num_hashes, signature_size) = common.expect("checked non-empty above");
    let total_row_bytes: u64 = partials.iter().map(|p| p.row_bytes).sum();

    let out = new_temp_file(options)?;
    out.set_len(signature_size * total_row_bytes)?;

    let first_error: Mutex<Option<std::io::Error>> = Mutex::new(None);
    parallel_for(0, signature_size, options.num_threads, |row_index| {
        let merge_row = || -> std::io::Result<()> {
            let mut buf = vec![0u8; total_row_bytes as usize];
            let mut cursor = 0usize;
            for partial in &partials {
                let row_bytes = partial.row_bytes as usize;
                partial.file.read_exact_at(&mut buf[cursor..cursor + row_bytes], partial.payload_offset + row_index * partial.row_bytes)?;
                cursor += row_bytes;
            }
            out.write_at(&buf, row_index * total_row_bytes)?;
            Ok(())
        };
        if let Err(e) = merge_row() {
            let mut slot = first_error.lock().unwrap();
            if slot.is_none() {
                *slot = Some(e);
            }
        }
    });
    if let Some(e) = first_error.into_inner().unwrap() {
        return Err(IndexError::Io(e));
    }

    let payload_path = out.into_temp_path().keep().map_err(|e| IndexError::Io(e.error))?;

    let header = IndexHeader::Classic(ClassicHeader {
        term_size,
        canonicalize,
        num_hashes,
        signature_size,
        document_names,
    });
    finalize(out_path, &header, Some(&payload_path))?;
    if !options.keep_temporary {
        let _ = std::fs::remove_file(&payload_path);
    }
    Ok(())
}

/// Escribe el encabezado seguido del payload (si lo hay) en una ruta
/// temporal junto a `out_path`, luego renombra atómicamente.
pub(crate) fn finalize(out_path: &Path, header: &IndexHeader, payload_path: Option<&Path>) -> Result<(), IndexError> {
    let parent = out_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new().tempfile_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        header.write_to(&mut writer)?;
        if let Some(payload_path) = payload_path {
            let mut payload = File::open(payload_path)?;
            std::io::copy(&mut payload, &mut writer)?;
        }
        writer.flush()?;
    }
    tmp.persist(out_path).map_err(|e| IndexError::Io(e.error))?;
    Ok(())
}
