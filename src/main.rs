use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use plainshow::backends::{self, Backends, Options};
use plainshow::error::{Error, Result};
use tracing::{error, info, level_filters};

#[derive(Debug, Parser)]
#[command(version, about)]
/// Show plain text slides.
struct Args {
    #[arg(required = true)]
    /// The slide files, shown one after the other.
    slide_paths: Vec<PathBuf>,
    #[arg(short = 'l', long = "log-level", default_value = "INFO")]
    /// The log level to be used.
    log_level: String,
    #[arg(long = "log-dir", default_value = "/tmp")]
    /// Where the hourly log files go.
    log_dir: PathBuf,
    #[arg(short = 'b', long = "backend")]
    /// The backend to be used: sdl or crossterm.
    backend: Option<String>,
    #[arg(long = "font")]
    /// A TrueType/OpenType font for the text slides.
    font: Option<PathBuf>,
    #[arg(short = 'f', long = "fullscreen")]
    /// Start in fullscreen.
    fullscreen: bool,
    #[arg(long = "width", default_value_t = 1024)]
    width: u32,
    #[arg(long = "height", default_value_t = 768)]
    height: u32,
}

fn run(args: Args) -> Result<usize> {
    let slides = plainshow::parser::parse_files(&args.slide_paths)?;
    info!("{} slides loaded", slides.len());

    let which = match args.backend {
        Some(name) => Backends::try_from(name)?,
        None => Backends::preferred()
            .ok_or_else(|| Error::UnsupportedBackend("none built".to_owned()))?,
    };
    info!("Using backend {:?}", which);

    let options = Options {
        font: args.font,
        fullscreen: args.fullscreen,
        width: args.width,
        height: args.height,
    };
    backends::get_backend(which, options).present(slides)
}

#[doc(hidden)]
fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match level_filters::LevelFilter::from_str(&args.log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("plainshow: invalid log level `{}`: {e}", args.log_level);
            return ExitCode::FAILURE;
        }
    };

    // Init logger.
    let file_appender =
        tracing_appender::rolling::hourly(&args.log_dir, "plainshow.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(non_blocking)
        .init();

    match run(args) {
        Ok(last) => {
            info!("Stopped on slide {}", last);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("plainshow: {e}");
            ExitCode::FAILURE
        }
    }
}
