pub mod bitboard;
pub mod board;
pub mod hash;
#[cfg(feature = "cli")]
pub mod logger;
pub mod moves;
pub mod search;
pub mod square;
pub mod utils;

/// Force initialization of every process-wide table (Zobrist keys and the
/// magic attack tables). Both are lazily built behind once-guards, so
/// calling this is optional; it just moves the cost to a predictable
/// point before the first search.
pub fn initialize_tables() {
    let _ = hash::zobrist::zobrist_keys();
    let _ = moves::magic::loader::load_magic_tables();
}
