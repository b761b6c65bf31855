// [libs/index/src/header.rs]
/*!
 * APARATO: ENCABEZADO TIPADO DE ÍNDICE (V1.0)
 * RESPONSABILIDAD: FORMATO DE ALAMBRE AUTO-DELIMITADO, LITTLE-ENDIAN
 *
 * Un índice COBS comienza con la magia `COBS`, un byte de `tag` que
 * distingue clásico de compacto, una versión, y los campos comunes
 * (`term_size`, `canonicalize`, `num_hashes`, `num_documents`, nombres de
 * documento) — seguidos por los campos propios de cada layout. Todos los
 * enteros son little-endian de ancho fijo, siguiendo la misma disciplina de
 * codificación binaria que el resto del workspace fija para sus formatos
 * serializados.
 */

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::IndexError;

const MAGIC: &[u8; 4] = b"COBS";
const VERSION: u32 = 1;

const TAG_CLASSIC: u8 = 0;
const TAG_COMPACT: u8 = 1;

/// Encabezado de un índice clásico: una única anchura de fila para todo el
/// archivo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicHeader {
    /// Longitud en bytes de los k-mers indexados.
    pub term_size: u32,
    /// Si los k-mers fueron canonicalizados antes de insertarse.
    pub canonicalize: bool,
    /// Número de funciones de hash por k-mer.
    pub num_hashes: u64,
    /// Ancho de la firma de Bloom compartida por todos los documentos, en bits.
    pub signature_size: u64,
    /// Nombres de documento en el orden de las columnas de bit.
    pub document_names: Vec<String>,
}

impl ClassicHeader {
    /// Número de documentos (columnas) indexados.
    #[must_use]
    pub fn num_documents(&self) -> u64 {
        self.document_names.len() as u64
    }

    /// Ancho en bytes de una fila completa (`⌈N/8⌉`).
    #[must_use]
    pub fn row_bytes(&self) -> u64 {
        self.num_documents().div_ceil(8)
    }

    fn write_to(&self, w: &mut impl Write) -> Result<(), IndexError> {
        w.write_all(MAGIC)?;
        w.write_u8(TAG_CLASSIC)?;
        w.write_u32::<LittleEndian>(VERSION)?;
        w.write_u32::<LittleEndian>(self.term_size)?;
        w.write_u8(self.canonicalize as u8)?;
        w.write_u64::<LittleEndian>(self.num_hashes)?;
        write_document_names(w, &self.document_names)?;
        w.write_u64::<LittleEndian>(self.signature_size)?;
        Ok(())
    }

    fn read_body(r: &mut impl Read, term_size: u32, canonicalize: bool, num_hashes: u64) -> Result<Self, IndexError> {
        let document_names = read_document_names(r)?;
        let signature_size = r.read_u64::<LittleEndian>()?;
        Ok(Self {
            term_size,
            canonicalize,
            num_hashes,
            signature_size,
            document_names,
        })
    }
}

/// Encabezado de un índice compacto: particiones de `page_size_docs`
/// documentos, cada una con su propio `signature_size_p`, pero todas
/// compartiendo el mismo ancho de fila en bytes (`page_row_bytes`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactHeader {
    /// Longitud en bytes de los k-mers indexados.
    pub term_size: u32,
    /// Si los k-mers fueron canonicalizados antes de insertarse.
    pub canonicalize: bool,
    /// Número de funciones de hash por k-mer.
    pub num_hashes: u64,
    /// Documentos por partición (la última puede tener menos documentos
    /// reales, rellenada con columnas en cero).
    pub page_size_docs: u64,
    /// Ancho de firma de Bloom de cada partición, en el mismo orden que las
    /// particiones aparecen en el archivo.
    pub partition_signature_sizes: Vec<u64>,
    /// Nombres de documento reales (sin incluir el relleno de la última
    /// partición), en el orden de las columnas de bit.
    pub document_names: Vec<String>,
}

impl CompactHeader {
    /// Número de documentos reales indexados.
    #[must_use]
    pub fn num_documents(&self) -> u64 {
        self.document_names.len() as u64
    }

    /// Ancho en bytes de una fila dentro de cualquier partición
    /// (`⌈page_size_docs/8⌉`), constante en todo el archivo.
    #[must_use]
    pub fn page_row_bytes(&self) -> u64 {
        self.page_size_docs.div_ceil(8)
    }

    /// Número de particiones.
    #[must_use]
    pub fn num_partitions(&self) -> u64 {
        self.partition_signature_sizes.len() as u64
    }

    /// Desplazamiento en bytes, relativo al comienzo del payload, donde
    /// comienza la partición `p`.
    #[must_use]
    pub fn partition_offset(&self, p: u64) -> u64 {
        let row_bytes = self.page_row_bytes();
        self.partition_signature_sizes[..p as usize]
            .iter()
            .map(|&s| s * row_bytes)
            .sum()
    }

    fn write_to(&self, w: &mut impl Write) -> Result<(), IndexError> {
        w.write_all(MAGIC)?;
        w.write_u8(TAG_COMPACT)?;
        w.write_u32::<LittleEndian>(VERSION)?;
        w.write_u32::<LittleEndian>(self.term_size)?;
        w.write_u8(self.canonicalize as u8)?;
        w.write_u64::<LittleEndian>(self.num_hashes)?;
        write_document_names(w, &self.document_names)?;
        w.write_u64::<LittleEndian>(self.page_size_docs)?;
        w.write_u64::<LittleEndian>(self.partition_signature_sizes.len() as u64)?;
        for &s in &self.partition_signature_sizes {
            w.write_u64::<LittleEndian>(s)?;
        }
        Ok(())
    }

    fn read_body(r: &mut impl Read, term_size: u32, canonicalize: bool, num_hashes: u64) -> Result<Self, IndexError> {
        let document_names = read_document_names(r)?;
        let page_size_docs = r.read_u64::<LittleEndian>()?;
        let num_partitions = r.read_u64::<LittleEndian>()?;
        let mut partition_signature_sizes = Vec::with_capacity(num_partitions as usize);
        for _ in 0..num_partitions {
            partition_signature_sizes.push(r.read_u64::<LittleEndian>()?);
        }
        Ok(Self {
            term_size,
            canonicalize,
            num_hashes,
            page_size_docs,
            partition_signature_sizes,
            document_names,
        })
    }
}

/// Un encabezado ya leído, etiquetado por el layout que describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexHeader {
    /// Índice clásico: una sola anchura de fila para todo el archivo.
    Classic(ClassicHeader),
    /// Índice compacto: particiones de ancho de firma variable.
    Compact(CompactHeader),
}

impl IndexHeader {
    /// Escribe este encabezado (magia, tag, versión y campos) en `w`.
    pub fn write_to(&self, w: &mut impl Write) -> Result<(), IndexError> {
        match self {
            Self::Classic(h) => h.write_to(w),
            Self::Compact(h) => h.write_to(w),
        }
    }

    /// Lee y reconoce un encabezado desde `r`, distinguiendo layout por el
    /// byte de `tag` inmediatamente después de la magia.
    pub fn read_from(r: &mut impl Read) -> Result<Self, IndexError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(IndexError::Format("missing COBS magic bytes".into()));
        }
        let tag = r.read_u8()?;
        let version = r.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(IndexError::Format(format!("unsupported index version {version}")));
        }
        let term_size = r.read_u32::<LittleEndian>()?;
        let canonicalize = r.read_u8()? != 0;
        let num_hashes = r.read_u64::<LittleEndian>()?;

        match tag {
            TAG_CLASSIC => Ok(Self::Classic(ClassicHeader::read_body(r, term_size, canonicalize, num_hashes)?)),
            TAG_COMPACT => Ok(Self::Compact(CompactHeader::read_body(r, term_size, canonicalize, num_hashes)?)),
            other => Err(IndexError::Format(format!("unknown index tag byte {other}"))),
        }
    }
}

fn write_document_names(w: &mut impl Write, names: &[String]) -> Result<(), IndexError> {
    w.write_u64::<LittleEndian>(names.len() as u64)?;
    for name in names {
        let bytes = name.as_bytes();
        w.write_u32::<LittleEndian>(bytes.len() as u32)?;
        w.write_all(bytes)?;
    }
    Ok(())
}

fn read_document_names(r: &mut impl Read) -> Result<Vec<String>, IndexError> {
    let count = r.read_u64::<LittleEndian>()?;
    let mut names = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let len = r.read_u32::<LittleEndian>()?;
        let mut buf = vec![0u8; len as usize];
        r.read_exact(&mut buf)?;
        let name = String::from_utf8(buf).map_err(|e| IndexError::Format(format!("document name is not valid UTF-8: {e}")))?;
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_header_round_trips() {
        let header = IndexHeader::Classic(ClassicHeader {
            term_size: 31,
            canonicalize: true,
            num_hashes: 3,
            signature_size: 256,
            document_names: vec!["doc_a".into(), "doc_b".into()],
        });
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let read_back = IndexHeader::read_from(&mut &buf[..]).unwrap();
        assert_eq!(header, read_back);
    }

    #[test]
    fn compact_header_round_trips() {
        let header = IndexHeader::Compact(CompactHeader {
            term_size: 21,
            canonicalize: false,
            num_hashes: 2,
            page_size_docs: 4,
            partition_signature_sizes: vec![64, 128],
            document_names: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
        });
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let read_back = IndexHeader::read_from(&mut &buf[..]).unwrap();
        assert_eq!(header, read_back);
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = b"XXXX".to_vec();
        assert!(IndexHeader::read_from(&mut &buf[..]).is_err());
    }

    #[test]
    fn classic_header_row_bytes_rounds_up() {
        let header = ClassicHeader {
            term_size: 4,
            canonicalize: false,
            num_hashes: 1,
            signature_size: 8,
            document_names: vec!["a".into(); 9],
        };
        assert_eq!(header.row_bytes(), 2);
    }

    #[test]
    fn compact_partition_offset_accumulates_preceding_rows() {
        let header = CompactHeader {
            term_size: 4,
            canonicalize: false,
            num_hashes: 1,
            page_size_docs: 16,
            partition_signature_sizes: vec![8, 16, 24],
            document_names: vec!["a".into(); 40],
        };
        assert_eq!(header.page_row_bytes(), 2);
        assert_eq!(header.partition_offset(0), 0);
        assert_eq!(header.partition_offset(1), 8 * 2);
        assert_eq!(header.partition_offset(2), 8 * 2 + 16 * 2);
    }
}
