use rand::Rng;

use crate::Base;
use crate::ConstraintTable;
use crate::NUCS;

/// Random sequence honoring `table`: one uniform draw per position, from the
/// allowed set where constrained and from all four bases elsewhere.
pub fn build_initial_sequence<R: Rng + ?Sized>(
    length: usize,
    table: &ConstraintTable,
    rng: &mut R,
) -> Vec<Base> {
    (0..length)
        .map(|pos| {
            let allowed = table.get(pos).unwrap_or(&NUCS);
            allowed[rng.random_range(0..allowed.len())]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_respects_constraints() {
        let mut table = ConstraintTable::new(12);
        table.insert(4, &[Base::G]);
        table.insert(5, &NUCS);
        table.insert(6, &[Base::A, Base::G]);
        table.insert(7, &[Base::A]);

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let seq = build_initial_sequence(12, &table, &mut rng);
            assert_eq!(seq.len(), 12);
            for (pos, base) in seq.iter().enumerate() {
                if let Some(allowed) = table.get(pos) {
                    assert!(allowed.contains(base));
                }
            }
            assert_eq!(seq[4], Base::G);
            assert_eq!(seq[7], Base::A);
        }
    }

    #[test]
    fn test_unconstrained_uses_all_bases() {
        let table = ConstraintTable::new(200);
        let mut rng = StdRng::seed_from_u64(1);
        let seq = build_initial_sequence(200, &table, &mut rng);
        for b in NUCS {
            assert!(seq.contains(&b));
        }
    }

    #[test]
    fn test_empty_and_reproducible() {
        let table = ConstraintTable::new(0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(build_initial_sequence(0, &table, &mut rng).is_empty());

        let table = ConstraintTable::new(30);
        let a = build_initial_sequence(30, &table, &mut StdRng::seed_from_u64(9));
        let b = build_initial_sequence(30, &table, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
