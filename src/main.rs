use clamb::common::error::FatalError;
use clamb::common::logging::{self, Verbosity};
use clamb::runtime::{stdout_writer, Mode, Runtime};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = "\
Usage: clamb [options] [input-file ...]

  -h       Print this help and exit
  -u       Disable output buffering
  -p       Parse and translate only; print the combinator graph and exit
  -v       Print version and exit
  -v0      Quiet (default)
  -v1      Print reduction/timing/stack-depth summary after evaluation
  -v2      Log each garbage collection to stderr
";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut runtime = Runtime::new();

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" => {
                print!("{}", HELP);
                std::process::exit(0);
            }
            "-v" => {
                println!("clamb {}", VERSION);
                std::process::exit(0);
            }
            "-u" => runtime.unbuffered = true,
            "-p" => runtime.mode = Mode::PrintOnly,
            "-v0" => runtime.verbosity = Verbosity::Quiet,
            "-v1" => runtime.verbosity = Verbosity::Stats,
            "-v2" => runtime.verbosity = Verbosity::Trace,
            arg if arg.starts_with('-') && arg.len() > 1 => {
                eprintln!("clamb: {}", FatalError::UnknownOption(arg.to_string()));
                std::process::exit(1);
            }
            _ => runtime.input_files.push(arg.clone()),
        }
    }

    logging::init(runtime.verbosity);

    let mut out = stdout_writer(runtime.unbuffered);
    match runtime.run(&mut out) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("clamb: {}", e);
            std::process::exit(1);
        }
    }
}
