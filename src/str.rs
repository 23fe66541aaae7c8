mod fmt;
mod parse;
mod parse_hex;

pub(crate) use fmt::{append_float, format_float};
pub(crate) use parse::parse_float;
