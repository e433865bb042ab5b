use convnet_core::tensor::{randn, Tensor};
use convnet_core::ConvNumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Shared helpers for the integration tests. Not every test binary uses all
// of them.
#[allow(dead_code)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Standard-normal batch of shape `(n, c, h, w)` with uniformly drawn labels.
#[allow(dead_code)]
pub(crate) fn random_batch<T: ConvNumeric>(
    rng: &mut StdRng,
    n: usize,
    input_dim: (usize, usize, usize),
    num_classes: usize,
) -> (Tensor<T>, Vec<usize>) {
    let (c, h, w) = input_dim;
    let x = randn(&[n, c, h, w], 1.0, rng).expect("Test batch creation failed");
    let labels = (0..n).map(|_| rng.gen_range(0..num_classes)).collect();
    (x, labels)
}
