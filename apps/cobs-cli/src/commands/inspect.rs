// [apps/cobs-cli/src/commands/inspect.rs]
/*!
 * APARATO: COMANDOS DE INSPECCIÓN (V1.0)
 * RESPONSABILIDAD: `doc-list`, `doc-dump`, `print-parameters`, `print-kmers`
 *
 * Ninguno de estos comandos produce un índice; todos imprimen a stdout y
 * terminan con éxito salvo fallo de lectura.
 */

use std::path::Path;

use anyhow::Result;
use cobs_core_bloom::signature_size_for_fpr;
use cobs_core_kmer::canonicalize;
use cobs_core_termsource::TermSource;
use serde::Serialize;

use crate::cli::FileType;
use crate::documents::load_documents;

/// `doc-list`: nombre y número de k-mers de cada documento de la colección.
pub fn doc_list(path: &Path, file_type: FileType, term_size: usize) -> Result<()> {
    for document in load_documents(path, file_type)? {
        let num_terms = document.source.num_terms(term_size)?;
        println!("{}\t{num_terms}", document.name);
    }
    Ok(())
}

/// `doc-dump`: todos los k-mers (canónicos salvo `--no-canonicalize`) de la colección.
pub fn doc_dump(path: &Path, file_type: FileType, term_size: usize, canonicalize_terms: bool) -> Result<()> {
    for document in load_documents(path, file_type)? {
        document.source.process_terms(term_size, &mut |term| {
            if canonicalize_terms {
                let canonical = canonicalize(term);
                println!("{}\t{}", document.name, String::from_utf8_lossy(&canonical.bytes));
            } else {
                println!("{}\t{}", document.name, String::from_utf8_lossy(term));
            }
        })?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ParametersReport {
    signature_size: u64,
    signature_bytes: u64,
}

/// `print-parameters`: el `signature_size` que resultaría de estos parámetros.
///
/// Con `json`, emite un único objeto `ParametersReport` vía `serde_json` en
/// vez de las líneas `clave\tvalor` por defecto — para consumo por scripts.
pub fn print_parameters(num_hashes: u64, false_positive_rate: f64, num_terms: u64, json: bool) {
    let signature_size = signature_size_for_fpr(num_hashes, num_terms, false_positive_rate);
    let report = ParametersReport {
        signature_size,
        signature_bytes: signature_size.div_ceil(8),
    };
    if json {
        println!("{}", serde_json::to_string(&report).expect("report serializes"));
    } else {
        println!("signature_size\t{}", report.signature_size);
        println!("signature_bytes\t{}", report.signature_bytes);
    }
}

/// `print-kmers`: los k-mers canónicos de una cadena, en orden.
pub fn print_kmers(query: &str, term_size: usize) {
    let bytes = query.as_bytes();
    if term_size == 0 || bytes.len() < term_size {
        return;
    }
    for start in 0..=(bytes.len() - term_size) {
        let canonical = canonicalize(&bytes[start..start + term_size]);
        println!("{}", String::from_utf8_lossy(&canonical.bytes));
    }
}
