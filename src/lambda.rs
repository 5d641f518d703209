use std::{
    io::{self, Write},
    path::Path,
};

use thiserror::Error;
use tracing::info;

use reducer::Reducer;
use term::{Link, Term};

mod parser_lc;
mod reader;
pub mod reducer;
mod term;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Read(#[from] reader::ReadError),
    #[error("failed parsing input: {0}")]
    Parse(#[from] parser_lc::ParseError),
    #[error("io error: {0}")]
    IO(#[from] io::Error),
}

pub fn run_file(path: &Path, reducer: &Reducer, out: &mut impl Write) -> Result<(), RunError> {
    let src = reader::read_source(path)?;
    run(&src, reducer, out)?;
    Ok(())
}

/// Parses `src` and reduces it to normal form, writing the parsed term, every
/// application about to be contracted, and the normal form to `out`.
pub fn run(src: &[u8], reducer: &Reducer, out: &mut impl Write) -> Result<Link, RunError> {
    let term = parser_lc::parse(src)?;
    writeln!(out, "{term}")?;

    let mut steps = 0usize;
    let normal = reducer.normalize(term, &mut |step: &Term| {
        steps += 1;
        writeln!(out, "{step}")
    })?;
    writeln!(out, "{normal}")?;

    info!(steps, "reached normal form");
    Ok(normal)
}
