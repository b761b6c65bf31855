// [apps/cobs-cli/src/commands/query.rs]
/*!
 * APARATO: COMANDO `query` (V1.0)
 * RESPONSABILIDAD: ABRIR ÍNDICES, LEER CONSULTAS, IMPRIMIR RESULTADOS EN ORDEN DE LLEGADA
 *
 * La entrada es o bien una secuencia inline, o un archivo que puede ser
 * FASTA, FASTQ, o una única secuencia cruda, opcionalmente comprimido con
 * gzip (detectado por los dos bytes de magia `1f 8b`, no por la extensión).
 * El archivo se procesa registro por registro — un único `BufRead` (sobre
 * el archivo crudo o sobre un `GzDecoder` encadenado) se recorre línea por
 * línea, buscando e imprimiendo cada registro apenas está completo, sin
 * materializar nunca la colección entera de registros en memoria. Esto
 * sigue la forma de `examples/original_source/cobs/query/search.hpp`'s
 * lector basado en `kseq_read` (un registro a la vez, impreso a medida que
 * se consume el flujo de consulta).
 */

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cobs_index::IndexFile;
use cobs_search::SearchEngine;
use flate2::read::GzDecoder;

/// `query`: ejecuta una consulta contra uno o más índices abiertos.
#[allow(clippy::too_many_arguments)]
pub fn run(
    index_paths: &[PathBuf],
    file: Option<PathBuf>,
    sequence: Option<String>,
    threshold: f64,
    limit: usize,
    load_complete: bool,
    index_sizes: bool,
) -> Result<()> {
    let indices: Vec<IndexFile> = index_paths
        .iter()
        .map(|path| IndexFile::open(path, load_complete).with_context(|| format!("opening {}", path.display())))
        .collect::<Result<_>>()?;

    if index_sizes {
        for (path, index) in index_paths.iter().zip(&indices) {
            println!("{}\tdocuments={}\trow_bytes={}", path.display(), index.num_documents(), index.total_row_bytes());
        }
        return Ok(());
    }

    let mut engine = SearchEngine::new(indices);

    if let Some(sequence) = sequence.as_deref() {
        let bytes = trim_ascii_whitespace(sequence.as_bytes());
        return search_and_print(&mut engine, "query", bytes, threshold, limit);
    }

    let Some(file) = file.as_deref() else {
        bail!("query requires either a `sequence` argument or `-f <file>`");
    };
    stream_query_file(file, &mut engine, threshold, limit)
}

/// Busca un único registro y emite su resultado de inmediato.
fn search_and_print(engine: &mut SearchEngine, name: &str, bytes: &[u8], threshold: f64, limit: usize) -> Result<()> {
    let results = engine.search(bytes, threshold, limit)?;
    println!("*{name}\t{}", results.len());
    for result in results {
        println!("{}\t{}", result.document_name, result.score);
    }
    Ok(())
}

enum QueryFileFormat {
    Fasta,
    Fastq,
    Raw,
}

/// Abre `path`, detecta gzip por los dos bytes de magia, y devuelve un
/// `BufRead` uniforme: el crudo o un `GzDecoder` ya envuelto en su propio
/// `BufReader` — ninguno de los dos lee el archivo completo por adelantado.
fn open_query_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buffered = BufReader::new(file);
    let is_gzip = {
        let peek = buffered.fill_buf().with_context(|| format!("reading {}", path.display()))?;
        peek.len() >= 2 && peek[0] == 0x1f && peek[1] == 0x8b
    };
    if is_gzip {
        Ok(Box::new(BufReader::new(GzDecoder::new(buffered))))
    } else {
        Ok(Box::new(buffered))
    }
}

/// Determina el formato mirando el primer byte no-blanco del flujo, sin
/// consumir nada más que los bytes de relleno saltados.
fn sniff_format(reader: &mut dyn BufRead) -> Result<QueryFileFormat> {
    loop {
        let buf = reader.fill_buf()?;
        let Some(&byte) = buf.first() else {
            return Ok(QueryFileFormat::Raw);
        };
        match byte {
            b' ' | b'\t' | b'\r' | b'\n' => reader.consume(1),
            b'>' => return Ok(QueryFileFormat::Fasta),
            b'@' => return Ok(QueryFileFormat::Fastq),
            _ => return Ok(QueryFileFormat::Raw),
        }
    }
}

fn stream_query_file(path: &Path, engine: &mut SearchEngine, threshold: f64, limit: usize) -> Result<()> {
    let mut reader = open_query_reader(path)?;
    match sniff_format(reader.as_mut())? {
        QueryFileFormat::Fasta => {
            stream_fasta(reader.as_mut(), |name, seq| search_and_print(engine, name, seq, threshold, limit))
        }
        QueryFileFormat::Fastq => {
            stream_fastq(reader.as_mut(), |name, seq| search_and_print(engine, name, seq, threshold, limit))
        }
        QueryFileFormat::Raw => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).with_context(|| format!("reading {}", path.display()))?;
            search_and_print(engine, "query", trim_ascii_whitespace(&bytes), threshold, limit)
        }
    }
}

/// Recorre un FASTA línea por línea; emite un registro tan pronto como la
/// siguiente cabecera `>` (o el fin de archivo) lo cierra. Sólo mantiene en
/// memoria la secuencia del registro en curso, nunca las anteriores.
fn stream_fasta(reader: &mut dyn BufRead, mut on_record: impl FnMut(&str, &[u8]) -> Result<()>) -> Result<()> {
    let mut line = String::new();
    let mut current_name: Option<String> = None;
    let mut current_seq: Vec<u8> = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if let Some(header) = trimmed.strip_prefix('>') {
            if let Some(name) = current_name.take() {
                on_record(&name, &current_seq)?;
                current_seq.clear();
            }
            current_name = Some(header.trim().to_string());
        } else if current_name.is_some() {
            current_seq.extend(trimmed.bytes());
        }
    }
    if let Some(name) = current_name.take() {
        on_record(&name, &current_seq)?;
    }
    Ok(())
}

/// Recorre un FASTQ en grupos de 4 líneas (cabecera, secuencia, `+`,
/// calidad), emitiendo cada registro apenas sus 4 líneas están completas.
fn stream_fastq(reader: &mut dyn BufRead, mut on_record: impl FnMut(&str, &[u8]) -> Result<()>) -> Result<()> {
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let Some(name) = header.trim_end_matches(['\r', '\n']).strip_prefix('@') else {
            continue;
        };
        let name = name.trim().to_string();

        let mut seq_line = String::new();
        if reader.read_line(&mut seq_line)? == 0 {
            break;
        }
        let seq: Vec<u8> = seq_line.trim_end_matches(['\r', '\n']).bytes().collect();

        let mut plus_line = String::new();
        if reader.read_line(&mut plus_line)? == 0 {
            break;
        }
        let mut quality_line = String::new();
        if reader.read_line(&mut quality_line)? == 0 {
            break;
        }

        on_record(&name, &seq)?;
    }
    Ok(())
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}
