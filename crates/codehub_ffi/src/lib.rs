//! Flutter bridge surface for CodeHub core.

pub mod api;
