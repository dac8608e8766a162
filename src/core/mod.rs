/*!
# Core Module

Shared building blocks for the MCS analyzer: source positions, error types
and file reading helpers.
*/

pub mod errors;
pub mod fs_utils;
pub mod position;

pub use errors::SchemaError;
pub use fs_utils::{decode_mcs_bytes, read_mcs_file};
pub use position::{Point, Position, Range};
