//! makehist CLI

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, ValueEnum};
use makehist::{Config, Error, ErrorKind, Histogram, Normalization, DEFAULT_BINS};

#[derive(Parser, Debug)]
#[command(name = "makehist")]
#[command(about = "Make a histogram from input data in text files.")]
#[command(version)]
#[command(override_usage = "makehist [options] -f <files>...")]
#[command(after_help = RANGE_AND_FILES_HELP)]
struct Cli {
    /// Consider numerical values >= x1, e.g. -1.0. Default: all values considered
    #[arg(long = "x1", value_name = "x1", allow_negative_numbers = true, hide = true)]
    x1: Option<f64>,

    /// Consider numerical values <= x2, e.g. 12.1. Default: all values considered
    #[arg(long = "x2", value_name = "x2", allow_negative_numbers = true, hide = true)]
    x2: Option<f64>,

    /// Do not normalize.
    #[arg(long = "nn", hide = true)]
    no_normalize: bool,

    /// Column containing data. First column is denoted 0, etc.
    #[arg(short = 'c', value_name = "col", default_value_t = 0, allow_negative_numbers = true)]
    column: i64,

    /// Number of bins.
    #[arg(short = 'N', value_name = "Nbins", default_value_t = DEFAULT_BINS)]
    bins: usize,

    /// Bin width. Not needed if number of bins has been specified.
    #[arg(short = 'd', value_name = "binw", allow_negative_numbers = true)]
    width: Option<f64>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Data files. Given with -f, which uses the rest of the line.
    #[arg(value_name = "files", last = true, hide = true)]
    files: Vec<PathBuf>,
}

/// Help for the flags clap only sees after [legacy_args] has respelled them.
const RANGE_AND_FILES_HELP: &str = "\
Range and input:
  -x1 <x1>       Consider numerical values >= x1, e.g. -1.0. Default: all values considered
  -x2 <x2>       Consider numerical values <= x2, e.g. 12.1. Default: all values considered
  -nn            Do not normalize.
  -f <files>...  Data files. Uses the rest of the line.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Three whitespace-separated columns per bin.
    Text,
    /// A JSON document (requires the `serde` feature).
    Json,
}

impl Cli {
    fn config(&self) -> Result<Config, Error> {
        let mut b = Config::builder()
            .normalize(!self.no_normalize)
            .column(self.column)
            .bins(self.bins)
            .files(self.files.iter().cloned());
        if let Some(x1) = self.x1 {
            b = b.lower(x1);
        }
        if let Some(x2) = self.x2 {
            b = b.upper(x2);
        }
        if let Some(binw) = self.width {
            b = b.width(binw);
        }
        b.build()
    }
}

/// Translate the traditional flag spelling into one clap understands.
///
/// `-x1`, `-x2` and `-nn` become long flags and `-f` becomes `--`, so that
/// every argument after it is taken as a file name verbatim.
fn legacy_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut files = false;
    for arg in args {
        if files {
            out.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-x1") => out.push("--x1".into()),
            Some("-x2") => out.push("--x2".into()),
            Some("-nn") => out.push("--nn".into()),
            Some("-f") | Some("--") => {
                out.push("--".into());
                files = true;
            }
            _ => out.push(arg),
        }
    }
    out
}

fn report(e: &Error) {
    match e.kind() {
        ErrorKind::EmptyDataset => println!("There are no data lines to process. Exiting."),
        ErrorKind::FileOpen => eprintln!("Error: {}.", e),
        ErrorKind::Line => eprintln!("Warning: {}. Line skipped.", e),
        ErrorKind::Domain => eprintln!("Error: {}. Debug program. Exiting.", e),
        ErrorKind::Config | ErrorKind::Io => eprintln!("Error: {}. Exiting.", e),
    }
}

fn emit(hist: &Histogram, format: Format) -> Result<(), Error> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Text => makehist::emit::write_rows(hist, &mut out),
        #[cfg(feature = "serde")]
        Format::Json => {
            use std::io::Write;
            writeln!(out, "{}", hist.to_json()?)?;
            Ok(())
        }
        #[cfg(not(feature = "serde"))]
        Format::Json => Err(Error::Encode("json output requires the serde feature".to_string())),
    }
}

fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();
    if argv.len() < 2 {
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse_from(legacy_args(argv)) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let data = makehist::load(&config);
    data.failures().iter().chain(data.rejected()).for_each(report);
    tracing::info!(
        samples = data.len(),
        comments = data.comment_lines(),
        blanks = data.blank_lines(),
        rejected = data.rejected().len(),
        "input read"
    );

    let hist = match makehist::build(&config, data.samples()) {
        Ok(hist) => hist,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    if let Normalization::NearZero(_) = hist.normalization() {
        eprintln!("Warning: Normalization factor smaller than machine accuracy. Not using normalization.");
    }

    match emit(&hist, cli.format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
