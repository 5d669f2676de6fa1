// Uniform random sample gate with fast-paths at 0.0 and 1.0.
//
// Grounded on `execution_constraints.rs::ExecutionConstraints::should_sample`
// (the `>= 1.0` / `<= 0.0` fast-path shape, `rand::thread_rng`), extended
// with the fail-safe RNG-error handling the teacher's version doesn't need:
// `thread_rng` never returns a `Result`, so the fallible path goes through
// `rand::rngs::OsRng::try_fill_bytes`, the one RNG call in this dependency
// stack that can actually fail (starved entropy source, sandboxed syscall).

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

/// Draws a decision for `sample_rate` (expected in `[0.0, 1.0]`).
///
/// `sample_rate <= 0.0` always returns `false`; `sample_rate >= 1.0` always
/// returns `true` — both without touching the RNG, per spec.md's "rates 0.0
/// and 1.0 bypass the RNG". Anything in between draws one uniform `f64` from
/// a fresh `OsRng`-seeded source; if that draw fails, the fail-safe outcome
/// is `false` ("do not sample" — a rule whose sampler can't be trusted is
/// treated as not selected for this event, rather than risking a spurious
/// match off a broken RNG).
pub fn should_sample(sample_rate: f64) -> bool {
    if sample_rate >= 1.0 {
        return true;
    }
    if sample_rate <= 0.0 {
        return false;
    }

    match draw_uniform() {
        Some(u) => u < sample_rate,
        None => {
            log::trace!("sampler RNG failure; falling back to do-not-sample");
            false
        }
    }
}

/// Draws one uniform value in `[0, 1)`, returning `None` only if the
/// underlying OS entropy source itself fails to fill its seed bytes.
fn draw_uniform() -> Option<f64> {
    let mut seed = [0u8; 32];
    OsRng.try_fill_bytes(&mut seed).ok()?;
    let mut rng = StdRng::from_seed(seed);
    Some(rng.gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_never_samples() {
        for _ in 0..100 {
            assert!(!should_sample(0.0));
        }
    }

    #[test]
    fn full_sample_rate_always_samples() {
        for _ in 0..100 {
            assert!(should_sample(1.0));
        }
    }

    #[test]
    fn mid_sample_rate_draws_from_the_rng() {
        let outcomes: Vec<bool> = (0..200).map(|_| should_sample(0.5)).collect();
        assert!(outcomes.iter().any(|&b| b));
        assert!(outcomes.iter().any(|&b| !b));
    }
}
