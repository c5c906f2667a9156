use rand::Rng;
use uuid::{Uuid, Variant, Version};

pub fn make_uuid<R: Rng>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random())
        .with_variant(Variant::RFC4122)
        .with_version(Version::Random)
        .into_uuid()
}

pub fn make_key<R: Rng, const N: usize>(rng: &mut R) -> [u8; N] {
    let mut key = [0u8; N];
    rng.fill(&mut key[..]);
    key
}
