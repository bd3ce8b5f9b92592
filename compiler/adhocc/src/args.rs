//! Command-line arguments.

use std::path::PathBuf;

use adhoc_codegen::Target;
use adhoc_compiler::CompileConfig;

use crate::CliError;

pub const USAGE: &str = "\
Usage: adhocc <tree.json> [options]

Options:
  -t, --target <c|js>   Output language (default: c)
  -e, --exec            Emit an entry point that runs the root action
  -m, --module <name>   Namespace for executable JavaScript
  -o, --output <path>   Write generated code to <path> instead of stdout
      --dump-ast        Print the annotated tree to stderr
      --trace-tree      Show log spans as a tree (with RUST_LOG set)
  -h, --help            Show this message
";

/// A parsed invocation.
#[derive(Clone, Debug)]
pub enum Command {
    Help,
    Compile(CliArgs),
}

#[derive(Clone, Debug)]
pub struct CliArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: CompileConfig,
    pub dump_ast: bool,
    pub trace_tree: bool,
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut input = None;
    let mut output = None;
    let mut config = CompileConfig::default();
    let mut dump_ast = false;
    let mut trace_tree = false;

    while let Some(arg) = args.next() {
        // `--flag=value` and `--flag value` are both accepted.
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| CliError::Usage(format!("{name} requires a value")))
        };
        match flag.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-t" | "--target" => {
                let text = value("--target")?;
                config.target = text
                    .parse::<Target>()
                    .map_err(|e| CliError::Usage(e.to_string()))?;
            }
            "-o" | "--output" => output = Some(PathBuf::from(value("--output")?)),
            "-m" | "--module" => config.module_name = Some(value("--module")?),
            "-e" | "--exec" => config.executable = true,
            "--dump-ast" => dump_ast = true,
            "--trace-tree" => trace_tree = true,
            _ if flag.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown option `{flag}`")));
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => return Err(CliError::Usage(format!("unexpected argument `{arg}`"))),
        }
    }

    let Some(input) = input else {
        return Err(CliError::Usage("missing input file".to_string()));
    };
    Ok(Command::Compile(CliArgs {
        input,
        output,
        config,
        dump_ast,
        trace_tree,
    }))
}
