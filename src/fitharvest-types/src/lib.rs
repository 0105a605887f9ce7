#[macro_use]
extern crate serde;

mod sample;
pub use sample::Sample;
