//! On-disk asset formats produced by the baker.

pub mod file_formats;
