// [libs/search/src/result.rs]

/// Un documento emparejado con el número de k-mers de la consulta que
/// contiene, según el umbral y el índice que lo produjo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Nombre del documento tal como aparece en el encabezado del índice.
    pub document_name: String,
    /// Número de k-mers de la consulta cuyos bits están todos presentes en
    /// este documento.
    pub score: u32,
}
