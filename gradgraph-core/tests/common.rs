use gradgraph_core::tensor::{SharedTensor, Tensor};

// Shared by several test crates; not every helper is used by each one.
#[allow(dead_code)]
pub fn shared_tensor(data: Vec<f32>, rows: usize, cols: usize) -> SharedTensor {
    Tensor::new(data, rows, cols)
        .expect("Test tensor creation failed")
        .into_shared()
}

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
