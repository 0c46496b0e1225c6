//! Lucite C front end CLI.

use lucitec::commands::{lex_file, parse_file};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let code = match args[1].as_str() {
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: lucite parse <file.c>");
                std::process::exit(1);
            }
            parse_file(&args[2])
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: lucite lex <file.c>");
                std::process::exit(1);
            }
            lex_file(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-v" => {
            println!("Lucite C front end {}", env!("CARGO_PKG_VERSION"));
            0
        }
        command => {
            // A bare .c path parses directly.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("c"))
            {
                parse_file(command)
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                1
            }
        }
    };
    std::process::exit(code);
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("LUCITE_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("Lucite C front end");
    println!();
    println!("Usage: lucite <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <file.c>    Parse a preprocessed C file and dump the AST");
    println!("  lex <file.c>      Tokenize a file and print the token stream");
    println!("  help              Show this help message");
    println!("  version           Show version information");
    println!();
    println!("Environment:");
    println!("  LUCITE_LOG=<filter>   Enable tracing output (e.g. debug, lucite_parse=trace)");
    println!();
    println!("Examples:");
    println!("  lucite parse main.c");
    println!("  lucite lex main.c");
}
