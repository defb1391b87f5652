//! UCI-style `.names`/`.data` loading for bonsai decision trees.

mod data_reader;
mod error;
mod names_reader;
mod reader;

pub use data_reader::DataReader;
pub use error::IoError;
pub use names_reader::NamesReader;
pub use reader::DatasetReader;
