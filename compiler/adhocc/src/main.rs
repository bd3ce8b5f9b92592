//! ADHOC compiler CLI.

use std::io;

use adhocc::{init_tracing, parse_args, run, Command, USAGE};

fn main() {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            eprint!("{USAGE}");
            std::process::exit(e.exit_code());
        }
    };
    let cli = match command {
        Command::Help => {
            print!("{USAGE}");
            return;
        }
        Command::Compile(cli) => cli,
    };

    init_tracing(cli.trace_tree);

    let stdout = io::stdout();
    let stderr = io::stderr();
    if let Err(e) = run(&cli, &mut stdout.lock(), &mut stderr.lock()) {
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
}
