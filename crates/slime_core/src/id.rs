use rand::Rng;
use uuid::Uuid;

/// Draws a process id from the session RNG.
///
/// Same seed, same slimes: ids are v4-formatted but fully determined by `rng`.
pub fn new_process_id(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn replayed_session_reissues_the_same_process_ids() {
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            [new_process_id(&mut rng), new_process_id(&mut rng)]
        };
        let [first, second] = draw(42);
        assert_eq!(draw(42), [first, second]);
        assert_ne!(first, second);
        assert_ne!(draw(43)[0], first);
        assert_eq!(first.get_version(), Some(uuid::Version::Random));
    }
}
