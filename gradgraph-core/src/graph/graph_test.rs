use super::*;
use crate::utils::testing::{check_tensor_near, create_test_tensor};

fn leaf(data: Vec<f32>, rows: usize, cols: usize) -> SharedTensor {
    create_test_tensor(data, rows, cols).into_shared()
}

#[test]
fn test_contract_scenario() {
    let x = leaf(vec![1.0, 2.0], 1, 2);
    let w = leaf(vec![1.0, 0.0, 0.0, 1.0], 2, 2);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    let wi = graph.append_data(&w).unwrap();
    let y = graph.execute(xi, Some(wi), NodeKind::Contract).unwrap();
    check_tensor_near(&graph.data(y).unwrap(), [1, 2], &[1.0, 2.0], 1e-6);

    graph.gradient_mut(y).unwrap().fill(1.0);
    graph.trace().unwrap();
    check_tensor_near(graph.gradient(xi).unwrap(), [1, 2], &[1.0, 1.0], 1e-6);
    check_tensor_near(graph.gradient(wi).unwrap(), [2, 2], &[1.0, 1.0, 2.0, 2.0], 1e-6);
}

#[test]
fn test_mse_scenario_seeds_loss() {
    let mut graph = Graph::new();
    let out = graph.append_tensor(Tensor::scalar(0.8)).unwrap();
    let expected = graph.append_tensor(Tensor::scalar(1.0)).unwrap();
    let loss = graph.execute(out, Some(expected), NodeKind::Mse).unwrap();
    assert!((graph.data(loss).unwrap().get(0, 0).unwrap() - 0.04).abs() < 1e-6);

    graph.trace().unwrap();
    check_tensor_near(graph.gradient(loss).unwrap(), [1, 1], &[1.0], 1e-6);
    check_tensor_near(graph.gradient(out).unwrap(), [1, 1], &[-0.4], 1e-6);
}

#[test]
fn test_trace_twice_doubles_leaf_gradients() {
    let x = leaf(vec![0.5, -1.0, 2.0], 1, 3);
    let target = leaf(vec![1.0, 0.0, 0.0], 1, 3);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    let ti = graph.append_data(&target).unwrap();
    let h = graph.execute(xi, None, NodeKind::Sigmoid).unwrap();
    let h2 = graph.execute(h, Some(xi), NodeKind::Mul).unwrap();
    let _loss = graph.execute(h2, Some(ti), NodeKind::Mse).unwrap();

    graph.trace().unwrap();
    let once = graph.gradient(xi).unwrap().clone();
    let interior_once = graph.gradient(h).unwrap().clone();
    graph.trace().unwrap();
    let twice = graph.gradient(xi).unwrap();
    for (a, b) in once.to_vec().iter().zip(twice.to_vec()) {
        assert!((2.0 * a - b).abs() < 1e-5);
    }
    // Interior gradients are recomputed, not accumulated.
    assert_eq!(graph.gradient(h).unwrap(), &interior_once);
}

#[test]
fn test_bias_gradient_sums_over_batch() {
    let x = leaf(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    let bias = leaf(vec![0.0, 0.0], 1, 2);
    let target = leaf(vec![0.0; 4], 2, 2);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    let bi = graph.append_data(&bias).unwrap();
    let ti = graph.append_data(&target).unwrap();
    let z = graph.execute(xi, Some(bi), NodeKind::Add).unwrap();
    graph.execute(z, Some(ti), NodeKind::Mse).unwrap();
    graph.trace().unwrap();
    // d/dz = (2/2) * z, summed over the two rows.
    check_tensor_near(graph.gradient(bi).unwrap(), [1, 2], &[4.0, 6.0], 1e-5);
}

#[test]
fn test_same_operand_twice() {
    let x = leaf(vec![3.0], 1, 1);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    let sq = graph.execute(xi, Some(xi), NodeKind::Mul).unwrap();
    check_tensor_near(&graph.data(sq).unwrap(), [1, 1], &[9.0], 1e-6);
    graph.gradient_mut(sq).unwrap().fill(1.0);
    graph.trace().unwrap();
    check_tensor_near(graph.gradient(xi).unwrap(), [1, 1], &[6.0], 1e-5);
}

#[test]
fn test_two_sinks_fail() {
    let x = leaf(vec![1.0], 1, 1);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    graph.execute(xi, None, NodeKind::Relu).unwrap();
    graph.execute(xi, None, NodeKind::Tanh).unwrap();
    assert_eq!(graph.trace(), Err(GradGraphError::NoUniqueSink { found: 2 }));
}

#[test]
fn test_empty_graph_has_no_sink() {
    let mut graph = Graph::new();
    assert_eq!(graph.trace(), Err(GradGraphError::NoUniqueSink { found: 0 }));
}

#[test]
fn test_cycle_is_detected() {
    let x = leaf(vec![1.0], 1, 1);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    let a = graph.execute(xi, None, NodeKind::Sigmoid).unwrap();
    let b = graph.execute(a, Some(xi), NodeKind::Add).unwrap();
    let c = graph.execute(b, None, NodeKind::Sigmoid).unwrap();
    graph.nodes[a.index()].deps[0] = b;

    assert_eq!(graph.sink(), Ok(c));
    assert_eq!(graph.trace(), Err(GradGraphError::CycleDetected(b)));
}

#[test]
fn test_topological_order_puts_dependencies_first() {
    let x = leaf(vec![1.0, 2.0], 1, 2);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    let t = graph.execute(xi, None, NodeKind::Transpose).unwrap();
    let p = graph.execute(xi, Some(t), NodeKind::Contract).unwrap();
    let order = graph.topological_order().unwrap();
    assert_eq!(order, vec![xi, t, p]);
    assert_eq!(graph.outdegrees(), vec![2, 1, 0]);
}

#[test]
fn test_arity_is_validated() {
    let x = leaf(vec![1.0], 1, 1);
    let mut graph = Graph::new();
    let xi = graph.append_data(&x).unwrap();
    assert_eq!(
        graph.execute(xi, None, NodeKind::Add),
        Err(GradGraphError::ArityMismatch {
            kind: NodeKind::Add,
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        graph.execute(xi, Some(xi), NodeKind::Relu),
        Err(GradGraphError::ArityMismatch {
            kind: NodeKind::Relu,
            expected: 1,
            actual: 2
        })
    );
    assert_eq!(
        graph.execute(xi, Some(NodeId::NONE), NodeKind::Relu).map(|id| id.index()),
        Ok(1)
    );
    assert!(matches!(
        graph.execute(xi, None, NodeKind::Data),
        Err(GradGraphError::InvalidArgument(_))
    ));
    assert_eq!(
        graph.execute(NodeId(40), None, NodeKind::Relu),
        Err(GradGraphError::UnknownNode {
            id: NodeId(40),
            len: 2
        })
    );
    assert_eq!(graph.len(), 2);
}

#[test]
fn test_shape_errors_leave_graph_unchanged() {
    let a = leaf(vec![1.0; 6], 2, 3);
    let b = leaf(vec![1.0; 6], 2, 3);
    let mut graph = Graph::new();
    let ai = graph.append_data(&a).unwrap();
    let bi = graph.append_data(&b).unwrap();
    assert!(matches!(
        graph.execute(ai, Some(bi), NodeKind::Contract),
        Err(GradGraphError::ShapeMismatch { .. })
    ));
    assert_eq!(graph.len(), 2);
}

#[test]
fn test_capacity_doubles_from_default() {
    let mut graph = Graph::new();
    assert_eq!(graph.capacity(), 0);
    for _ in 0..DEFAULT_CAPACITY {
        graph.append_tensor(Tensor::scalar(0.0)).unwrap();
    }
    assert!(graph.capacity() >= DEFAULT_CAPACITY);
    graph.append_tensor(Tensor::scalar(0.0)).unwrap();
    assert!(graph.capacity() >= 2 * DEFAULT_CAPACITY);
    assert!(Graph::with_capacity(0).unwrap().capacity() >= DEFAULT_CAPACITY);
    assert!(Graph::with_capacity(100).unwrap().capacity() >= 128);
}

#[test]
fn test_capacity_ceiling() {
    let mut graph = Graph::with_capacity(MAX_NODES).unwrap();
    for _ in 0..MAX_NODES {
        graph.append_tensor(Tensor::scalar(0.0)).unwrap();
    }
    assert_eq!(
        graph.append_tensor(Tensor::scalar(0.0)),
        Err(GradGraphError::CapacityExhausted { limit: MAX_NODES })
    );
}

#[test]
fn test_leaf_survives_graph() {
    let w = leaf(vec![1.0, 2.0], 1, 2);
    {
        let mut graph = Graph::new();
        let wi = graph.append_data(&w).unwrap();
        assert!(!graph.node(wi).unwrap().is_transient());
        let r = graph.execute(wi, None, NodeKind::Relu).unwrap();
        assert!(graph.node(r).unwrap().is_transient());
    }
    assert_eq!(std::sync::Arc::strong_count(&w), 1);
    check_tensor_near(&w.read().unwrap(), [1, 2], &[1.0, 2.0], 0.0);
}

#[test]
fn test_zero_grad() {
    let mut graph = Graph::new();
    let out = graph.append_tensor(Tensor::scalar(0.8)).unwrap();
    let expected = graph.append_tensor(Tensor::scalar(1.0)).unwrap();
    graph.execute(out, Some(expected), NodeKind::Mse).unwrap();
    graph.trace().unwrap();
    graph.zero_grad();
    check_tensor_near(graph.gradient(out).unwrap(), [1, 1], &[0.0], 0.0);
}
