use std::path::PathBuf;

use clap::Parser as ClapParser;
use log::error;

use y_interpreter::ast_dot;
use y_interpreter::error::YError;
use y_interpreter::interpreter::Interpreter;
use y_interpreter::lexer::Lexer;
use y_interpreter::parser::Parser;

#[derive(ClapParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Y source file to run.
    file: PathBuf,

    /// Dump the token stream and, on failure, the activation-record stack.
    #[arg(short, long)]
    debug: bool,

    /// Render the parsed AST to a Graphviz .dot file.
    #[arg(short, long)]
    ast: bool,

    /// Output path for the .dot file. Only consulted with `--ast`.
    #[arg(short = 'o', long, default_value = "astree.dot")]
    ast_file: PathBuf,
}

fn main() {
    let args = Cli::parse();

    let level = if args.debug { log::Level::Debug } else { log::Level::Warn };
    simple_logger::init_with_level(level).expect("failed to initialize logger");

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Cli) -> Result<(), YError> {
    let source = std::fs::read_to_string(&args.file)
        .unwrap_or_else(|e| panic!("could not read file '{}': {e}", args.file.display()));

    let tokens = Lexer::new(&source).run()?;
    if args.debug {
        for token in &tokens {
            log::debug!("{token:?}");
        }
    }

    let ast = Parser::new(tokens).parse()?;

    if args.ast {
        let dot = ast_dot::render(&ast);
        std::fs::write(&args.ast_file, dot)
            .unwrap_or_else(|e| panic!("could not write '{}': {e}", args.ast_file.display()));
    }

    let mut interpreter = Interpreter::new(args.debug);
    interpreter.run(&ast)?;

    Ok(())
}
