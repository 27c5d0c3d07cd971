use rand::RngCore;

const MAX_ATTEMPTS: u32 = 1_000_000;

/// A sparse random 64-bit candidate. AND-ing three draws keeps the bit
/// count low, which empirically makes collision-free multipliers far more
/// likely.
#[inline(always)]
pub fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Check whether `magic` hashes every blocker subset without a harmful
/// collision. Two subsets may share a slot only if they produce the same
/// attack set. `scratch` is reused across attempts; `u64::MAX` marks an
/// unused slot (no slider attack set can fill the whole board).
pub fn is_magic_candidate_valid(
    blockers: &[u64],
    attacks: &[u64],
    magic: u64,
    shift: u32,
    scratch: &mut Vec<u64>,
) -> bool {
    let size = 1usize << (64 - shift);
    scratch.clear();
    scratch.resize(size, u64::MAX);

    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if scratch[index] == u64::MAX {
            scratch[index] = attack;
        } else if scratch[index] != attack {
            return false;
        }
    }
    true
}

/// Random-trial search for a magic multiplier covering every blocker
/// subset of one square.
pub fn find_magic_number_for_square<R: RngCore>(
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> Result<u64, String> {
    let mut scratch = Vec::new();
    for _ in 0..MAX_ATTEMPTS {
        let magic = random_sparse_u64(rng);
        if is_magic_candidate_valid(blockers, attacks, magic, shift, &mut scratch) {
            return Ok(magic);
        }
    }
    Err(format!(
        "no valid magic number found after {} attempts",
        MAX_ATTEMPTS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::attacks::{
        blocker_subsets, rook_attacks_per_square, rook_blocker_mask,
    };
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn sparse_candidates_have_few_bits_on_average() {
        let mut rng = StdRng::seed_from_u64(7);
        let total: u32 = (0..256).map(|_| random_sparse_u64(&mut rng).count_ones()).sum();
        // expectation is 8 bits; anything near 32 would mean the AND trick broke
        assert!(total / 256 < 16);
    }

    #[test]
    fn found_magic_is_collision_free() {
        let square = 27; // d4
        let mask = rook_blocker_mask(square);
        let shift = 64 - mask.count_ones();
        let blockers = blocker_subsets(mask);
        let attacks: Vec<u64> = blockers
            .iter()
            .map(|&b| rook_attacks_per_square(square, b))
            .collect();

        let mut rng = StdRng::seed_from_u64(42);
        let magic = find_magic_number_for_square(&blockers, &attacks, shift, &mut rng).unwrap();

        let mut scratch = Vec::new();
        assert!(is_magic_candidate_valid(&blockers, &attacks, magic, shift, &mut scratch));
    }

    #[test]
    fn rejects_a_known_bad_candidate() {
        // magic = 0 maps every subset to slot 0; attacks differ, so it must fail
        let square = 27;
        let mask = rook_blocker_mask(square);
        let shift = 64 - mask.count_ones();
        let blockers = blocker_subsets(mask);
        let attacks: Vec<u64> = blockers
            .iter()
            .map(|&b| rook_attacks_per_square(square, b))
            .collect();
        let mut scratch = Vec::new();
        assert!(!is_magic_candidate_valid(&blockers, &attacks, 0, shift, &mut scratch));
    }
}
