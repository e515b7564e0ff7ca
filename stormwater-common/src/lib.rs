pub mod configs;
pub mod structures;
pub mod utils;
