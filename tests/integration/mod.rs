//! Integration tests, one file per area of the external API.

mod atoms;
mod gc;
mod objects_and_arrays;
mod parse;
mod path;
mod print;
