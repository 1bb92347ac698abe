//! IO functionality for exchanging preference tables and assignments with other programs.

pub mod simple;
