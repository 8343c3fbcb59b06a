use std::{env, io, process};

use miniscript_lang::MiniScript;

const USAGE: &str = "Usage: miniscript [script]

Runs the Mini Script file, or starts an interactive prompt when no script
is given. Type 'exit' to leave the prompt.

Options:
  -h, --help    Print this message and exit";

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut miniscript = MiniScript::new(&mut stdout);

    match args.len() {
        n if n > 2 => {
            eprintln!("{USAGE}");
            process::exit(64);
        },
        2 if args[1] == "-h" || args[1] == "--help" => println!("{USAGE}"),
        2 => {
            let code = miniscript.run_file(&args[1]);
            drop(miniscript);
            process::exit(code);
        },
        _ => miniscript.run_prompt(),
    };
}
