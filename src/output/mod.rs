//! Output file writing module

pub mod writer;

pub use writer::DownloadWriter;
