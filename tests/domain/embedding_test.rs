use helpline::domain::Embedding;

#[test]
fn given_vector_when_normalizing_then_magnitude_is_one() {
    let embedding = Embedding::new(vec![3.0, 4.0]).normalized();

    assert!((embedding.magnitude() - 1.0).abs() < 1e-6);
    assert_eq!(embedding.values, vec![0.6, 0.8]);
}

#[test]
fn given_zero_vector_when_normalizing_then_it_stays_zero() {
    let embedding = Embedding::new(vec![0.0; 4]).normalized();

    assert_eq!(embedding.values, vec![0.0; 4]);
}

#[test]
fn given_parallel_vectors_when_comparing_then_similarity_is_one() {
    let a = Embedding::new(vec![1.0, 2.0, 3.0]);
    let b = Embedding::new(vec![2.0, 4.0, 6.0]);

    assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-6);
}

#[test]
fn given_mismatched_or_zero_vectors_when_comparing_then_similarity_is_zero() {
    let a = Embedding::new(vec![1.0, 0.0]);

    assert_eq!(a.cosine_similarity(&Embedding::new(vec![1.0, 0.0, 0.0])), 0.0);
    assert_eq!(a.cosine_similarity(&Embedding::new(vec![0.0, 0.0])), 0.0);
}
