// [apps/cobs-cli/src/main.rs]
/*!
 * APARATO: SHELL DE LA CLI COBS (V1.0)
 * RESPONSABILIDAD: PARSEO DE ARGUMENTOS, DESPACHO A COMANDOS, TRIAGE DE ERRORES
 *
 * No delega en el `Result` de retorno de `main` para reportar fallos: éste
 * imprimiría `Error: ...`, y el contrato de la CLI es un prefijo
 * `EXCEPTION:` en stderr seguido de salida con código distinto de cero.
 */

mod cli;
mod commands;
mod documents;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(error) = dispatch(cli.command) {
        eprintln!("EXCEPTION: {error:#}");
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::DocList { path, file_type, term_size } => commands::inspect::doc_list(&path, file_type, term_size),

        Command::DocDump { path, file_type, term_size, no_canonicalize } => {
            commands::inspect::doc_dump(&path, file_type, term_size, !no_canonicalize)
        }

        Command::ClassicConstruct {
            input,
            out_file,
            file_type,
            term_size,
            num_hashes,
            false_positive_rate,
            signature_size,
            ram_mib,
            threads,
            clobber,
            continue_,
            keep_temporary,
            no_canonicalize,
            tmp_path,
        } => commands::build::classic_construct(
            &input,
            &out_file,
            file_type,
            term_size,
            num_hashes,
            false_positive_rate,
            signature_size,
            ram_mib,
            threads,
            clobber,
            continue_,
            keep_temporary,
            !no_canonicalize,
            tmp_path,
        ),

        Command::ClassicConstructRandom {
            out,
            signature_size,
            num_documents,
            fill_rate,
            num_hashes,
            seed,
        } => commands::build::classic_construct_random(&out, signature_size, num_documents, fill_rate, num_hashes, seed),

        Command::CompactConstruct {
            input,
            out_file,
            file_type,
            term_size,
            num_hashes,
            false_positive_rate,
            page_size,
            ram_mib,
            threads,
            clobber,
            continue_,
            keep_temporary,
            no_canonicalize,
            tmp_path,
        } => commands::build::compact_construct(
            &input,
            &out_file,
            file_type,
            term_size,
            num_hashes,
            false_positive_rate,
            page_size,
            ram_mib,
            threads,
            clobber,
            continue_,
            keep_temporary,
            !no_canonicalize,
            tmp_path,
        ),

        Command::CompactConstructCombine { in_dir, out_file, page_size } => {
            commands::build::compact_construct_combine(&in_dir, &out_file, page_size)
        }

        Command::ClassicCombine {
            in_dir,
            out_dir,
            out_file,
            ram_mib,
            threads,
        } => commands::build::classic_combine(&in_dir, &out_dir, &out_file, ram_mib, threads),

        Command::Query {
            indices,
            file,
            sequence,
            threshold,
            limit,
            load_complete,
            threads: _,
            index_sizes,
        } => commands::query::run(&indices, file, sequence, threshold, limit, load_complete, index_sizes),

        Command::PrintParameters { num_hashes, false_positive_rate, num_terms, json } => {
            commands::inspect::print_parameters(num_hashes, false_positive_rate, num_terms, json);
            Ok(())
        }

        Command::PrintKmers { query, term_size } => {
            commands::inspect::print_kmers(&query, term_size);
            Ok(())
        }

        Command::GenerateQueries {
            path,
            file_type,
            term_size,
            num_positive,
            num_negative,
            true_negative,
            query_length,
            seed,
            output,
        } => commands::generate::run(&path, file_type, term_size, num_positive, num_negative, true_negative, query_length, seed, &output),

        Command::Version => {
            println!("cobs {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
