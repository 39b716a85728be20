//! Chess game records to training batches.
//!
//! Raw input (`RES:`/`CHECKMATE:`/`FEN:` text blocks, or `;`-delimited
//! `FEN`/`RES` rows) is extracted into [`RawRecord`]s, decoded into 8×8
//! [`Board`]s with a one-hot outcome, and drawn in random batches by a
//! [`BatchSampler`]. [`BoardEncoder`] flattens boards into 64 signed piece
//! magnitudes for the training loop.

pub mod chess;

pub use chess::logging::init_logging;
pub use chess::*;
