pub mod labeling;
pub mod splitters;
