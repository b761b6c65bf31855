// [libs/search/benches/search_bench.rs]
//! Mide el costo de una consulta repetida contra el mismo índice ya
//! abierto — separa el costo de apertura (mmap, una vez) del costo de
//! búsqueda (k-merizar, hashear, fetch, AND, puntuar, rankear, muchas
//! veces), que es la ruta caliente real de un proceso `cobs query` de
//! larga duración sobre muchos registros.

use cobs_core_bloom::build_bloom_filter;
use cobs_core_termsource::PlainTextSource;
use cobs_index::{write_classic_index, BuildOptions, IndexFile};
use cobs_search::SearchEngine;
use criterion::{criterion_group, criterion_main, Criterion};

const TERM_SIZE: u32 = 16;
const NUM_HASHES: u64 = 3;
const SIGNATURE_SIZE: u64 = 4096;

fn build_index(num_documents: usize, bases_per_document: usize) -> IndexFile {
    let documents: Vec<(String, Vec<u8>)> = (0..num_documents)
        .map(|i| {
            let bases: Vec<u8> = (0..bases_per_document)
                .map(|j| [b'A', b'C', b'G', b'T'][(i * 17 + j * 3) % 4])
                .collect();
            (format!("doc{i}"), bases)
        })
        .collect();

    let filters: Vec<(String, _)> = documents
        .iter()
        .map(|(name, bases)| {
            let source = PlainTextSource::from_bytes(bases.clone());
            let filter = build_bloom_filter(&source, TERM_SIZE as usize, true, SIGNATURE_SIZE, NUM_HASHES).unwrap();
            (name.clone(), filter)
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("bench.cobs");
    write_classic_index(&filters, TERM_SIZE, true, NUM_HASHES, &out_path, &BuildOptions::default()).unwrap();
    let index = IndexFile::open(&out_path, true).unwrap();
    std::mem::forget(dir);
    index
}

fn bench_search(c: &mut Criterion) {
    let index = build_index(256, 2048);
    let query = vec![b'A', b'C', b'G', b'T'].repeat(16);
    let mut engine = SearchEngine::new(vec![index]);

    c.bench_function("search_256_docs", |b| {
        b.iter(|| engine.search(&query, 0.5, 10).unwrap());
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
