// [apps/cobs-cli/src/cli.rs]
/*!
 * APARATO: DEFINICIÓN DE ARGUMENTOS DE LÍNEA DE COMANDOS (V1.0)
 * RESPONSABILIDAD: UN `Cli` Y UN SUBCOMANDO POR OPERACIÓN DEL MOTOR COBS
 *
 * Sigue la misma convención de flags cortas + largas que el resto del
 * workspace (`apps/census-taker/src/main.rs`) y el estilo de la referencia
 * kraken2-like (`-k`, `-h`, `-T`, `--value-parser` con rangos donde aplica).
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Interfaz de línea de comandos del motor COBS.
#[derive(Parser, Debug)]
#[command(
    name = "cobs",
    author = "Raz Podesta <metaShark Tech>",
    version,
    about = "Índice de firmas bit-sliced (COBS) para búsqueda de membresía aproximada de k-mers."
)]
pub struct Cli {
    /// El subcomando a ejecutar.
    #[command(subcommand)]
    pub command: Command,
}

/// Formato de los documentos de entrada de una colección.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileType {
    /// Un archivo = un documento, sin interpretar su contenido.
    #[default]
    PlainText,
    /// Uno o más registros `>nombre` por archivo, cada uno un documento.
    Fasta,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Enumera una colección de documentos y su número de k-mers.
    DocList {
        /// Archivo o directorio de documentos.
        path: PathBuf,
        /// Formato de los documentos.
        #[arg(long = "file-type", value_enum, default_value_t = FileType::Fasta)]
        file_type: FileType,
        /// Longitud de k-mer.
        #[arg(short = 'k', long = "term-size", default_value_t = 31)]
        term_size: usize,
    },

    /// Imprime todos los k-mers (canónicos por defecto) de una colección.
    DocDump {
        /// Archivo o directorio de documentos.
        path: PathBuf,
        /// Formato de los documentos.
        #[arg(long = "file-type", value_enum, default_value_t = FileType::Fasta)]
        file_type: FileType,
        /// Longitud de k-mer.
        #[arg(short = 'k', long = "term-size", default_value_t = 31)]
        term_size: usize,
        /// No canonicalizar: imprimir la hebra tal cual aparece en el documento.
        #[arg(long = "no-canonicalize")]
        no_canonicalize: bool,
    },

    /// Construye un índice clásico a partir de una colección de documentos.
    ClassicConstruct {
        /// Archivo o directorio de documentos de entrada.
        input: PathBuf,
        /// Ruta del índice de salida.
        out_file: PathBuf,
        /// Formato de los documentos.
        #[arg(long = "file-type", value_enum, default_value_t = FileType::Fasta)]
        file_type: FileType,
        /// Longitud de k-mer.
        #[arg(short = 'k', long = "term-size", default_value_t = 31)]
        term_size: usize,
        /// Número de funciones de hash.
        #[arg(short = 'h', long = "num-hashes", default_value_t = 1)]
        num_hashes: u64,
        /// Tasa de falsos positivos objetivo (ignorada si se pasa `-s`).
        #[arg(short = 'f', long = "false-positive-rate", default_value_t = 0.01)]
        false_positive_rate: f64,
        /// Ancho de firma explícito en bits (ignora `-f` si se especifica).
        #[arg(short = 's', long = "signature-size")]
        signature_size: Option<u64>,
        /// Presupuesto de RAM por lote de transposición, en MiB.
        #[arg(short = 'm', long = "ram-mib", default_value_t = 1024)]
        ram_mib: u64,
        /// Número de hilos.
        #[arg(short = 'T', long = "threads", default_value_t = num_cpus::get())]
        threads: usize,
        /// Sobrescribe `out_file` si ya existe.
        #[arg(short = 'C', long = "clobber")]
        clobber: bool,
        /// Si `out_file` ya existe, no reconstruir: sale con éxito.
        #[arg(long = "continue")]
        continue_: bool,
        /// Conserva los slabs temporales intermedios (diagnóstico).
        #[arg(long = "keep-temporary")]
        keep_temporary: bool,
        /// No canonicalizar k-mers antes de insertarlos.
        #[arg(long = "no-canonicalize")]
        no_canonicalize: bool,
        /// Directorio para archivos temporales (por defecto, el del sistema).
        #[arg(long = "tmp-path")]
        tmp_path: Option<PathBuf>,
    },

    /// Construye un índice clásico sintético (firmas aleatorias, sin documentos reales).
    ClassicConstructRandom {
        /// Ruta del índice de salida.
        out: PathBuf,
        /// Ancho de firma en bits.
        #[arg(short = 's', long = "signature-size", default_value_t = 1 << 16)]
        signature_size: u64,
        /// Número de documentos sintéticos.
        #[arg(short = 'n', long = "num-documents", default_value_t = 1000)]
        num_documents: u64,
        /// Fracción de bits encendidos por documento.
        #[arg(short = 'm', long = "fill-rate", default_value_t = 0.01)]
        fill_rate: f64,
        /// Número de funciones de hash (metadato del encabezado únicamente).
        #[arg(short = 'h', long = "num-hashes", default_value_t = 1)]
        num_hashes: u64,
        /// Semilla determinista del generador aleatorio.
        #[arg(long = "seed")]
        seed: Option<u64>,
    },

    /// Construye un índice compacto (particionado por cardinalidad) a partir de una colección.
    CompactConstruct {
        /// Archivo o directorio de documentos de entrada.
        input: PathBuf,
        /// Ruta del índice de salida.
        out_file: PathBuf,
        /// Formato de los documentos.
        #[arg(long = "file-type", value_enum, default_value_t = FileType::Fasta)]
        file_type: FileType,
        /// Longitud de k-mer.
        #[arg(short = 'k', long = "term-size", default_value_t = 31)]
        term_size: usize,
        /// Número de funciones de hash.
        #[arg(short = 'h', long = "num-hashes", default_value_t = 1)]
        num_hashes: u64,
        /// Tasa de falsos positivos objetivo por partición.
        #[arg(short = 'f', long = "false-positive-rate", default_value_t = 0.01)]
        false_positive_rate: f64,
        /// Documentos por partición.
        #[arg(short = 'p', long = "page-size", default_value_t = 4096)]
        page_size: u64,
        /// Presupuesto de RAM por lote de transposición, en MiB.
        #[arg(short = 'm', long = "ram-mib", default_value_t = 1024)]
        ram_mib: u64,
        /// Número de hilos.
        #[arg(short = 'T', long = "threads", default_value_t = num_cpus::get())]
        threads: usize,
        /// Sobrescribe `out_file` si ya existe.
        #[arg(short = 'C', long = "clobber")]
        clobber: bool,
        /// Si `out_file` ya existe, no reconstruir: sale con éxito.
        #[arg(long = "continue")]
        continue_: bool,
        /// Conserva los slabs temporales intermedios (diagnóstico).
        #[arg(long = "keep-temporary")]
        keep_temporary: bool,
        /// No canonicalizar k-mers antes de insertarlos.
        #[arg(long = "no-canonicalize")]
        no_canonicalize: bool,
        /// Directorio para archivos temporales (por defecto, el del sistema).
        #[arg(long = "tmp-path")]
        tmp_path: Option<PathBuf>,
    },

    /// Combina particiones clásicas ya construidas en un único índice compacto.
    CompactConstructCombine {
        /// Directorio con un índice clásico parcial por partición.
        in_dir: PathBuf,
        /// Ruta del índice compacto de salida.
        out_file: PathBuf,
        /// Documentos por partición (debe coincidir con el usado al construirlas).
        #[arg(short = 'p', long = "page-size")]
        page_size: u64,
    },

    /// Fusiona índices clásicos parciales (documentos disjuntos) en uno solo.
    ClassicCombine {
        /// Directorio con los índices clásicos parciales a fusionar.
        in_dir: PathBuf,
        /// Directorio para archivos temporales de la fusión.
        out_dir: PathBuf,
        /// Ruta del índice fusionado de salida.
        out_file: PathBuf,
        /// Presupuesto de RAM (no usado por la fusión por filas, aceptado por compatibilidad).
        #[arg(short = 'm', long = "ram-mib", default_value_t = 1024)]
        ram_mib: u64,
        /// Número de hilos.
        #[arg(short = 'T', long = "threads", default_value_t = num_cpus::get())]
        threads: usize,
    },

    /// Ejecuta una consulta contra uno o más índices.
    Query {
        /// Rutas de índices a consultar, en el orden en que se reportan sus resultados.
        #[arg(short = 'i', long = "index", required = true)]
        indices: Vec<PathBuf>,
        /// Archivo de consultas (FASTA/FASTQ, opcionalmente gzipeado); si se omite, usar `sequence`.
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
        /// Secuencia de consulta inline (alternativa a `-f`).
        sequence: Option<String>,
        /// Umbral mínimo de k-mers coincidentes, como fracción `[0, 1]`.
        #[arg(short = 't', long = "threshold", default_value_t = 0.0)]
        threshold: f64,
        /// Número máximo de resultados por registro de consulta (`0` = sin límite).
        #[arg(short = 'l', long = "limit", default_value_t = 0)]
        limit: usize,
        /// Carga los índices completos en RAM en vez de mapearlos.
        #[arg(long = "load-complete")]
        load_complete: bool,
        /// Número de hilos (reservado; la consulta actual es de un solo hilo por registro).
        #[arg(short = 'T', long = "threads", default_value_t = num_cpus::get())]
        threads: usize,
        /// Sólo imprime el tamaño de cada índice abierto y termina.
        #[arg(long = "index-sizes")]
        index_sizes: bool,
    },

    /// Reporta el ancho de firma de Bloom para una cardinalidad y tasa de falsos positivos dadas.
    PrintParameters {
        /// Número de funciones de hash.
        #[arg(short = 'h', long = "num-hashes", default_value_t = 1)]
        num_hashes: u64,
        /// Tasa de falsos positivos objetivo.
        #[arg(short = 'f', long = "false-positive-rate", default_value_t = 0.01)]
        false_positive_rate: f64,
        /// Número de términos a insertar.
        #[arg(short = 'n', long = "num-terms")]
        num_terms: u64,
        /// Emite el resultado como un objeto JSON en vez de líneas `clave\tvalor`.
        #[arg(long = "json")]
        json: bool,
    },

    /// Imprime los k-mers canónicos de una cadena.
    PrintKmers {
        /// Secuencia de entrada.
        query: String,
        /// Longitud de k-mer.
        #[arg(short = 'k', long = "term-size", default_value_t = 31)]
        term_size: usize,
    },

    /// Genera consultas positivas y negativas mixtas a partir de una colección.
    GenerateQueries {
        /// Archivo o directorio de documentos de origen.
        path: PathBuf,
        /// Formato de los documentos.
        #[arg(long = "file-type", value_enum, default_value_t = FileType::Fasta)]
        file_type: FileType,
        /// Longitud de k-mer usada para verificar negativos verdaderos.
        #[arg(short = 'k', long = "term-size", default_value_t = 31)]
        term_size: usize,
        /// Número de consultas positivas (subcadenas reales de los documentos).
        #[arg(short = 'p', long = "num-positive", default_value_t = 1000)]
        num_positive: usize,
        /// Número de consultas negativas.
        #[arg(short = 'n', long = "num-negative", default_value_t = 1000)]
        num_negative: usize,
        /// Verifica que cada negativo sea un negativo verdadero (ningún k-mer aparece en la colección).
        #[arg(short = 'N', long = "true-negative")]
        true_negative: bool,
        /// Longitud de cada secuencia de consulta generada.
        #[arg(short = 's', long = "query-length", default_value_t = 150)]
        query_length: usize,
        /// Semilla determinista del generador aleatorio.
        #[arg(long = "seed")]
        seed: Option<u64>,
        /// Archivo FASTA de salida.
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Imprime la versión de `cobs`.
    Version,
}
