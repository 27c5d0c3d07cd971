use super::attacks::{
    bishop_attacks_per_square, bishop_blocker_mask, blocker_subsets, rook_attacks_per_square,
    rook_blocker_mask,
};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{SeedableRng, rngs::StdRng};

/// Seed for the magic-number search. Fixed so the tables are identical on
/// every run; the random trial is an implementation detail, not a source
/// of nondeterminism.
#[derive(Debug, Clone, Copy)]
pub enum MagicTableSeed {
    Fixed(u64),
}

/// Build one square's entry: mask, shift, found magic and the fully
/// populated attack table.
fn build_entry(
    square: usize,
    mask: u64,
    reference: impl Fn(usize, u64) -> u64,
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let blockers = blocker_subsets(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| reference(square, b)).collect();

    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)
        .map_err(|e| format!("square {}: {}", square, e))?;

    let mut table = vec![0u64; 1usize << bits];
    for (&blocker, &attack) in blockers.iter().zip(&attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        table[index] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

/// Generate both slider tables. `tick` fires after each completed square
/// (128 total) so callers can report progress.
pub fn generate_magic_tables_with_progress(
    seed: MagicTableSeed,
    mut tick: impl FnMut(u32),
) -> Result<MagicTables, String> {
    let MagicTableSeed::Fixed(seed) = seed;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut done = 0u32;

    let mut rook_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let entry = build_entry(square, rook_blocker_mask(square), rook_attacks_per_square, &mut rng)?;
        debug_assert!(entry.table.len() <= 4096);
        rook_entries.push(entry);
        done += 1;
        tick(done);
    }

    let mut bishop_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let entry =
            build_entry(square, bishop_blocker_mask(square), bishop_attacks_per_square, &mut rng)?;
        debug_assert!(entry.table.len() <= 512);
        bishop_entries.push(entry);
        done += 1;
        tick(done);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    generate_magic_tables_with_progress(seed, |_| {})
}
