// [libs/core/termsource/src/term_source.rs]
use crate::errors::TermSourceError;
use std::path::{Path, PathBuf};

/// Abstrae un documento como un flujo perezoso de q-gramas de tamaño fijo.
///
/// Cualquier lector de formato concreto (texto plano, FASTA, ...)
/// implementa esta interfaz; el resto del motor (el constructor de Bloom,
/// el motor de búsqueda) sólo conoce `TermSource`.
pub trait TermSource {
    /// Número exacto de q-gramas de tamaño `term_size` que este documento
    /// produce (`0` si el documento es más corto que `term_size`).
    fn num_terms(&self, term_size: usize) -> Result<u64, TermSourceError>;

    /// Invoca `sink` una vez por cada q-grama de tamaño `term_size`, en
    /// orden, pasando una vista prestada sobre los bytes del q-grama.
    fn process_terms(
        &self,
        term_size: usize,
        sink: &mut dyn FnMut(&[u8]),
    ) -> Result<(), TermSourceError>;
}

impl TermSource for Box<dyn TermSource> {
    fn num_terms(&self, term_size: usize) -> Result<u64, TermSourceError> {
        (**self).num_terms(term_size)
    }

    fn process_terms(
        &self,
        term_size: usize,
        sink: &mut dyn FnMut(&[u8]),
    ) -> Result<(), TermSourceError> {
        (**self).process_terms(term_size, sink)
    }
}

/// Un documento nombrado respaldado por una fuente de términos concreta.
pub struct Document<S: TermSource> {
    /// Nombre lógico del documento (el que aparece en los resultados de
    /// búsqueda).
    pub name: String,
    /// Ruta física de origen, conservada para diagnóstico/logging.
    pub path: PathBuf,
    /// Fuente de q-gramas concreta que respalda este documento.
    pub source: S,
}

impl<S: TermSource> Document<S> {
    /// Construye un documento nombrado sobre una fuente ya abierta.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>, source: S) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
