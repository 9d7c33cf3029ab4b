//! Crate-level error aggregating every module's error type.
use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::convert::ConvertError;
use crate::extract::record::FieldSinkError;
use crate::resolver::expr::EvalError;
use crate::resolver::ResolveError;
use crate::sheet::reference::ReferenceError;
use crate::sheet::source::SourceError;

#[derive(Error, Debug)]
pub enum SheetShiftError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Reference(#[from] ReferenceError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Eval(#[from] EvalError),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{0}")]
    FieldSink(#[from] FieldSinkError),
}
