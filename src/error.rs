//! Fatal, process-terminating errors (spec.md §7: I/O failures are fatal;
//! everything else is a per-line error code, not a `Result`).

use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug)]
pub enum IoContext {
    ReadSource,
    WriteProvisionalListing,
    WriteFinalListing,
    WriteHex,
}

impl IoContext {
    fn description(&self) -> &'static str {
        match self {
            IoContext::ReadSource => "Reading source file",
            IoContext::WriteProvisionalListing => "Writing provisional listing",
            IoContext::WriteFinalListing => "Writing final listing",
            IoContext::WriteHex => "Writing HEX file",
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error, IoContext, PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err, context, path) => {
                write!(f, "{} \"{}\" failed: {}", context.description(), path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {}
