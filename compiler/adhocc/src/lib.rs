//! The ADHOC compiler command-line driver.
//!
//! Reads a JSON tree, compiles it with [`adhoc_compiler`], and writes the
//! generated code to stdout or a file. All filesystem access lives here;
//! the pipeline itself is IO-free.

mod args;
mod error;
pub mod ingest;
mod logging;

pub use args::{parse_args, CliArgs, Command, USAGE};
pub use error::CliError;
pub use logging::init_tracing;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use adhoc_compiler::compile_in_place;
use adhoc_ir::render::render_tree;

/// Compile `cli.input`.
///
/// Generated code goes to `cli.output` when set, else to `out`. The tree
/// dump (`--dump-ast`) goes to `diag`, and is written even when compilation
/// fails so the annotations reached so far can be inspected.
#[tracing::instrument(level = "debug", skip_all, fields(input = %cli.input.display()))]
pub fn run(cli: &CliArgs, out: &mut dyn Write, diag: &mut dyn Write) -> Result<(), CliError> {
    let source = fs::read_to_string(&cli.input).map_err(|source| io_error(&cli.input, source))?;
    let records = ingest::parse_records(&source).map_err(|source| CliError::Json {
        path: cli.input.clone(),
        source,
    })?;
    let mut store = ingest::build_store(records, ingest::estimated_node_count())?;

    let output = compile_in_place(&mut store, &cli.config);

    if cli.dump_ast {
        diag.write_all(render_tree(&store).as_bytes())
            .map_err(|source| io_error(Path::new("<stderr>"), source))?;
    }
    if !output.success {
        return Err(CliError::Compile(output.diagnostics));
    }

    match &cli.output {
        Some(path) => fs::write(path, &output.code).map_err(|source| io_error(path, source))?,
        None => out
            .write_all(output.code.as_bytes())
            .map_err(|source| io_error(Path::new("<stdout>"), source))?,
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::Io {
        path: PathBuf::from(path),
        source,
    }
}
