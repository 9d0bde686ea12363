//! Jmm compiler CLI
//!
//! Usage:
//!   jmmc input.jmm                      # print Jasmin to stdout
//!   jmmc input.jmm --emit ollir        # print the OLLIR instead
//!   jmmc input.jmm -o -r 4             # optimise, allocate ≤4 registers
//!   jmmc input.jmm --json              # machine-readable reports

use std::env;
use std::process;

use jmm_compiler::{compile_file, Compilation, Config};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which artifact goes to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Ast,
    Ollir,
    Jasmin,
}

/// Command-line arguments
#[derive(Debug)]
struct Args {
    input_file: Option<String>,
    optimize: bool,
    register_allocation: i32,
    emit: Emit,
    json: bool,
    show_help: bool,
    show_version: bool,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Args {
            input_file: None,
            optimize: false,
            register_allocation: -1,
            emit: Emit::Jasmin,
            json: false,
            show_help: false,
            show_version: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => parsed.show_help = true,
                "-v" | "--version" => parsed.show_version = true,
                "-o" | "--optimize" => parsed.optimize = true,
                "--json" => parsed.json = true,
                "-r" | "--registers" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| "-r needs a number".to_string())?;
                    parsed.register_allocation = value
                        .parse()
                        .map_err(|_| format!("invalid register count '{}'", value))?;
                }
                "--emit" => {
                    i += 1;
                    parsed.emit = match args.get(i).map(String::as_str) {
                        Some("ast") => Emit::Ast,
                        Some("ollir") => Emit::Ollir,
                        Some("jasmin") => Emit::Jasmin,
                        other => {
                            return Err(format!(
                                "--emit takes ast, ollir or jasmin, got '{}'",
                                other.unwrap_or("")
                            ))
                        }
                    };
                }
                file if !file.starts_with('-') => {
                    parsed.input_file = Some(file.to_string());
                }
                unknown => return Err(format!("unknown option '{}'", unknown)),
            }
            i += 1;
        }
        Ok(parsed)
    }
}

fn print_usage() {
    eprintln!("Usage: jmmc <input.jmm> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --optimize        run constant propagation and folding");
    eprintln!("  -r, --registers <n>   register allocation: -1 off, 0 minimise, n ceiling");
    eprintln!("  --emit <artifact>     ast | ollir | jasmin (default jasmin)");
    eprintln!("  --json                print reports as JSON");
    eprintln!("  -h, --help            show this help");
    eprintln!("  -v, --version         show the version");
}

fn print_reports(result: &Compilation, json: bool) {
    if json {
        match serde_json::to_string_pretty(&result.reports) {
            Ok(text) => eprintln!("{}", text),
            Err(e) => eprintln!("could not serialize reports: {}", e),
        }
        return;
    }
    for report in &result.reports {
        eprintln!("{}", report);
    }
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("jmmc: {}", message);
            print_usage();
            process::exit(2);
        }
    };

    if args.show_help {
        print_usage();
        return;
    }
    if args.show_version {
        println!("jmmc {}", VERSION);
        return;
    }

    let Some(input_file) = args.input_file else {
        eprintln!("jmmc: no input file");
        print_usage();
        process::exit(2);
    };

    let config = Config {
        optimize: args.optimize,
        register_allocation: args.register_allocation,
    };

    let result = match compile_file(&input_file, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("jmmc: {}", e);
            process::exit(1);
        }
    };

    if !result.succeeded() {
        print_reports(&result, args.json);
        process::exit(1);
    }

    match args.emit {
        Emit::Ast => match serde_json::to_string_pretty(&result.ast) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("jmmc: could not serialize AST: {}", e);
                process::exit(1);
            }
        },
        Emit::Ollir => {
            if let Some(ollir) = &result.ollir {
                print!("{}", ollir);
            }
        }
        Emit::Jasmin => {
            if let Some(jasmin) = &result.jasmin {
                print!("{}", jasmin);
            }
        }
    }
}
