use clap::{Parser, Subcommand};
use ctread::extract::Extractor;
use ctread::listing::Lister;
use ctread::reader::RecordStream;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ctread", about = "Read DOMAIN/OS cartridge-tape backup images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tape contents into a directory tree
    #[command(alias = "x")]
    Extract {
        /// Tape image files, drained in order onto one record stream
        #[arg(required = true)]
        tapes: Vec<PathBuf>,
        /// Extraction root for the reconstructed tree
        #[arg(short = 'C', long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// List tape contents without writing anything
    List {
        #[arg(required = true)]
        tapes: Vec<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("ctread: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Extract { tapes, output_dir } => {
            let stream = RecordStream::spawn(tapes);
            let mut extractor = Extractor::new(output_dir);
            for record in stream.records() {
                extractor.handle(record)?;
            }
            stream.join()?;
        }
        Commands::List { tapes } => {
            let stream = RecordStream::spawn(tapes);
            let stdout = std::io::stdout();
            let mut lister = Lister::new(stdout.lock());
            for record in stream.records() {
                lister.handle(record)?;
            }
            stream.join()?;
        }
    }
    Ok(())
}
