mod error;
mod iter;
mod sequence;

pub use error::SequenceError;
pub use iter::{Entries, Keys, PositionalIter, Project, Values};
pub use sequence::{OrderedSequence, STRING_TAG};
