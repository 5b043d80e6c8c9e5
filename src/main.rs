//! Main bundler executable, to be used as cli tool. For help run this command
//! with `-h`.

#![warn(missing_docs)]

use anyhow::{Error, bail};
use clap::Parser;
use coverage_bundler::bundle;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// Report directory containing the root index.html.
    #[arg(long, short)]
    source: PathBuf,

    /// Output HTML file name. Defaults to `<source>/index.html` when
    /// `--overwrite` is set.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Overwrite original index and delete the per-page source files after
    /// they have been bundled.
    #[arg(long, short = 'x')]
    overwrite: bool,
}

fn main() -> Result<(), Error> {
    simple_logger::init().unwrap();

    let arguments = Arguments::parse();

    let output = match arguments.output {
        Some(output) => output,
        None if arguments.overwrite => arguments.source.join(bundle::ROOT_PAGE),
        None => bail!("no output defined"),
    };

    bundle::run(&bundle::Options {
        source: arguments.source,
        output,
        overwrite: arguments.overwrite,
    })?;

    Ok(())
}
