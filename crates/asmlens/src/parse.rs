//! Parsing: line grouping, block-graph construction, label resolution, and
//! source-location enrichment.

pub mod labels;
pub mod source;
pub mod types;

pub(crate) mod builder;

pub use source::{NullSourceReader, SourceFile, SourceFileTable, SourceLineReader};
pub use types::{
    AsmBlock, AsmBlockKind, AsmEdge, AsmEdgeKind, AsmLine, AsmLineKind, AsmLineRef,
};
