//! Error taxonomy for pair-corpus loading. The search engine itself never
//! fails; every mistake that can happen, happens here, while turning a text
//! file into a [`crate::corpus::PairCorpus`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read pair file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("pair file parsed successfully but contained zero pairs")]
    Empty,
}
