#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn magnitude(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Scales to unit length. A zero vector is returned unchanged.
    pub fn normalized(mut self) -> Self {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            self.values.iter_mut().for_each(|v| *v /= magnitude);
        }
        self
    }

    /// Zero when the dimensions differ or either side is a zero vector.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        if self.dimensions() != other.dimensions() {
            return 0.0;
        }

        let denominator = self.magnitude() * other.magnitude();
        if denominator == 0.0 {
            return 0.0;
        }

        let dot: f32 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .sum();
        dot / denominator
    }
}
