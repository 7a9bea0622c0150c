use clap::Parser;
use std::path::PathBuf;

use gammac::{Driver, Output, Status};

/// Compile enum, union and struct declarations into C++ headers and sources
#[derive(Parser)]
#[clap(author, version, about)]
#[clap(after_help = AFTER_HELP)]
struct Cli {
    /// Print each input followed by its generated source and header, instead
    /// of writing files
    #[clap(short = 'd', long = "debug")]
    debug: bool,
    /// Directory to write generated files to
    #[clap(long = "out-dir", name = "DIR", default_value = "out")]
    out_dir: PathBuf,
    /// Source files to compile, or `-` to read from stdin
    #[clap(name = "FILE", required = true)]
    files: Vec<PathOrStdin>,
}

const AFTER_HELP: &str = "\
Examples:

  $ gammac game.gm
  $ gammac --out-dir generated src/*.gm
  $ gammac --debug - < game.gm
";

#[derive(Clone, Debug)]
enum PathOrStdin {
    StdIn,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(src: &str) -> Result<PathOrStdin, std::convert::Infallible> {
        match src {
            "-" => Ok(PathOrStdin::StdIn),
            _ => Ok(PathOrStdin::Path(PathBuf::from(src))),
        }
    }
}

fn compile_file(driver: &mut Driver, file: PathOrStdin) -> Status {
    match file {
        PathOrStdin::StdIn => match driver.load_source("stdin".to_owned(), std::io::stdin()) {
            Some(file_id) => driver.compile_and_emit(file_id),
            None => Status::Error,
        },
        PathOrStdin::Path(path) => driver.compile_paths([path]),
    }
}

fn main() -> ! {
    let cli = Cli::parse();

    let mut driver = Driver::new();
    driver.install_panic_hook();
    driver.set_output(if cli.debug {
        Output::Debug
    } else {
        Output::Directory(cli.out_dir)
    });

    let mut status = Status::Ok;
    for file in cli.files {
        status = status.merge(compile_file(&mut driver, file));
    }

    std::process::exit(status.exit_code());
}
