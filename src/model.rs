
use ndarray::prelude::*;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_stats::QuantileExt;
use rand::Rng;
use std::error::Error;


/// Two layer linear skip-gram network.
///
/// `w1` is `(vocab_size, embedding_dim)` and takes a one-hot target to the hidden layer,
/// `w2` is `(embedding_dim, vocab_size)` and takes the hidden layer to the logits.
/// The embedding of token `i` is row `i` of `w1`.
#[derive(Clone, Debug)]
pub struct SkipGram {
    w1: Array2<f32>,
    w2: Array2<f32>,
}

pub struct Gradients {
    pub d_hidden: Array1<f32>, // gradient of the only non zero row of dW1, the target row
    pub d_w2: Array2<f32>,
}

impl SkipGram {

    pub fn new<R: Rng + ?Sized>(vocab_size: usize, embedding_dim: usize, rng: &mut R) -> SkipGram {

        Self {
            w1: Array::random_using((vocab_size, embedding_dim), StandardNormal, rng),
            w2: Array::random_using((embedding_dim, vocab_size), StandardNormal, rng),
        }
    }

    pub fn from_weights(w1: Array2<f32>, w2: Array2<f32>) -> Result<SkipGram, Box<dyn Error>> {

        let (vocab_size, embedding_dim) = w1.dim();
        if w2.dim() != (embedding_dim, vocab_size) {
            return Err(format!("w2 should be of shape ({}, {}), got {:?}", embedding_dim, vocab_size, w2.dim()).into());
        }
        Ok(Self { w1, w2 })
    }

    pub fn vocab_size(&self) -> usize {
        self.w1.dim().0
    }

    pub fn embedding_dim(&self) -> usize {
        self.w1.dim().1
    }

    pub fn w1(&self) -> &Array2<f32> {
        &self.w1
    }

    pub fn w2(&self) -> &Array2<f32> {
        &self.w2
    }

    pub fn embedding(&self, index: usize) -> ArrayView1<'_, f32> {
        self.w1.row(index)
    }

    pub fn embeddings(&self) -> Array2<f32> {
        self.w1.clone()
    }

    pub fn softmax(x: &Array1<f32>) -> Array1<f32> {
        // shift by the max logit so exp never overflows
        let max = *x.max_skipnan();
        let exp_x = x.mapv(|v| (v - max).exp());
        let sum = exp_x.sum();
        exp_x / sum
    }

    /// Returns the hidden layer and the softmax output for a target index.
    ///
    /// The one-hot product `onehot(target) · w1` is just row `target` of `w1`.
    pub fn forward(&self, target: usize) -> (Array1<f32>, Array1<f32>) {
        let hidden = self.w1.row(target).to_owned();
        let output = SkipGram::softmax(&hidden.dot(&self.w2));
        (hidden, output)
    }

    fn cross_entropy(output: &Array1<f32>, context: usize) -> f32 {
        -output[context].max(f32::MIN_POSITIVE).ln()
    }

    pub fn loss(&self, target: usize, context: usize) -> f32 {
        let (_, output) = self.forward(target);
        SkipGram::cross_entropy(&output, context)
    }

    fn gradients_from(&self, hidden: &Array1<f32>, output: &Array1<f32>, context: usize) -> Gradients {

        // dL/dlogits = softmax - onehot(context)
        let mut error = output.clone();
        error[context] -= 1.0;

        // dW2 = outer(hidden, error), dW1[target] = w2 · error
        let d_w2 = hidden.view().insert_axis(Axis(1)).dot(&error.view().insert_axis(Axis(0)));
        let d_hidden = self.w2.dot(&error);

        Gradients { d_hidden, d_w2 }
    }

    pub fn gradients(&self, target: usize, context: usize) -> Gradients {
        let (hidden, output) = self.forward(target);
        self.gradients_from(&hidden, &output, context)
    }

    /// One gradient descent step on a single (target, context) pair, returns the loss
    /// measured before the update.
    pub fn step(&mut self, target: usize, context: usize, learning_rate: f32) -> f32 {

        let (hidden, output) = self.forward(target);
        let loss = SkipGram::cross_entropy(&output, context);

        // both gradients are taken from the weights before any update
        let grads = self.gradients_from(&hidden, &output, context);
        self.w1.row_mut(target).scaled_add(-learning_rate, &grads.d_hidden);
        self.w2.scaled_add(-learning_rate, &grads.d_w2);

        loss
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_model() -> SkipGram {
        let w1 = array![
            [0.10, -0.20, 0.30],
            [0.05, 0.40, -0.10],
            [-0.30, 0.20, 0.15],
            [0.25, -0.05, -0.35]
        ];
        let w2 = array![
            [0.20, -0.10, 0.05, 0.30],
            [-0.25, 0.15, 0.10, -0.05],
            [0.35, 0.05, -0.20, 0.10]
        ];
        SkipGram::from_weights(w1, w2).unwrap()
    }

    #[test]
    fn new_has_expected_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = SkipGram::new(6, 4, &mut rng);
        assert_eq!(model.w1().dim(), (6, 4));
        assert_eq!(model.w2().dim(), (4, 6));
        assert_eq!(model.vocab_size(), 6);
        assert_eq!(model.embedding_dim(), 4);
        assert_eq!(model.embedding(5).len(), 4);
    }

    #[test]
    fn same_seed_same_weights() {
        let a = SkipGram::new(5, 3, &mut StdRng::seed_from_u64(11));
        let b = SkipGram::new(5, 3, &mut StdRng::seed_from_u64(11));
        assert_eq!(a.w1(), b.w1());
        assert_eq!(a.w2(), b.w2());
    }

    #[test]
    fn from_weights_rejects_mismatched_shapes() {
        let w1 = Array2::<f32>::zeros((4, 3));
        let w2 = Array2::<f32>::zeros((4, 3));
        assert!(SkipGram::from_weights(w1, w2).is_err());
    }

    #[test]
    fn softmax_sums_to_one_and_is_stable() {
        let probs = SkipGram::softmax(&array![1.0, 2.0, 3.0]);
        assert!((probs.sum() - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);

        // large logits would overflow exp without the max shift
        let probs = SkipGram::softmax(&array![1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn forward_selects_target_row() {
        let model = small_model();
        let (hidden, output) = model.forward(2);
        assert_eq!(hidden, model.w1().row(2));
        assert_eq!(output.len(), 4);
        assert!((output.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gradients_match_finite_differences() {

        let model = small_model();
        let (target, context) = (1, 3);
        let grads = model.gradients(target, context);
        let eps = 1e-2;
        let tol = 1e-3;

        // target row of w1
        for k in 0..model.embedding_dim() {
            let mut plus = model.w1().clone();
            let mut minus = model.w1().clone();
            plus[[target, k]] += eps;
            minus[[target, k]] -= eps;
            let l_plus = SkipGram::from_weights(plus, model.w2().clone()).unwrap().loss(target, context);
            let l_minus = SkipGram::from_weights(minus, model.w2().clone()).unwrap().loss(target, context);
            let numeric = (l_plus - l_minus) / (2.0 * eps);
            assert!((numeric - grads.d_hidden[k]).abs() < tol, "w1[{}, {}]: {} vs {}", target, k, numeric, grads.d_hidden[k]);
        }

        // every entry of w2
        for k in 0..model.embedding_dim() {
            for j in 0..model.vocab_size() {
                let mut plus = model.w2().clone();
                let mut minus = model.w2().clone();
                plus[[k, j]] += eps;
                minus[[k, j]] -= eps;
                let l_plus = SkipGram::from_weights(model.w1().clone(), plus).unwrap().loss(target, context);
                let l_minus = SkipGram::from_weights(model.w1().clone(), minus).unwrap().loss(target, context);
                let numeric = (l_plus - l_minus) / (2.0 * eps);
                assert!((numeric - grads.d_w2[[k, j]]).abs() < tol, "w2[{}, {}]: {} vs {}", k, j, numeric, grads.d_w2[[k, j]]);
            }
        }
    }

    #[test]
    fn step_only_touches_target_row_of_w1() {
        let mut model = small_model();
        let before = model.w1().clone();
        model.step(0, 2, 0.5);
        for i in 1..model.vocab_size() {
            assert_eq!(model.w1().row(i), before.row(i));
        }
        assert_ne!(model.w1().row(0), before.row(0));
    }

    #[test]
    fn step_reduces_pair_loss() {
        let mut model = small_model();
        let before = model.loss(3, 0);
        let reported = model.step(3, 0, 0.05);
        let after = model.loss(3, 0);
        assert!((reported - before).abs() < 1e-6);
        assert!(after < before, "{} should be below {}", after, before);
    }
}
