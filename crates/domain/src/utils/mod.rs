//! Pure string utilities

pub mod time_range;
