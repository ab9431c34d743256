//! Errors reported while loading graph and candidate-set files.

use derive_more::Display;
use std::path::PathBuf;

#[derive(Debug, Display)]
pub enum Error {
    #[display(fmt = "input file {:?} not found", _0)]
    InputNotFound(PathBuf),
    #[display(fmt = "malformed input {:?}: {}", _0, _1)]
    InputMalformed(PathBuf, String),
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
