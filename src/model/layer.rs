//! Fully connected layer with an elementwise activation.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, z: &mut Array2<f32>) {
        match self {
            Activation::Relu => z.mapv_inplace(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp())),
        }
    }

    /// Multiply `grad` (dL/da) by da/dz, expressed through the activation output `a`.
    fn backprop(self, a: &Array2<f32>, grad: &mut Array2<f32>) {
        match self {
            Activation::Relu => grad.zip_mut_with(a, |g, &a| {
                if a <= 0.0 {
                    *g = 0.0;
                }
            }),
            Activation::Sigmoid => grad.zip_mut_with(a, |g, &a| *g *= a * (1.0 - a)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub name: String,
    /// `inputs x units`
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: Activation,
}

/// Parameter gradients of one layer for one mini-batch.
#[derive(Debug, Clone)]
pub struct DenseGrad {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Dense {
    /// Glorot-uniform kernel, zero bias.
    pub fn new<R: Rng>(
        name: impl Into<String>,
        inputs: usize,
        units: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (inputs + units) as f32).sqrt();
        let weights = Array2::from_shape_fn((inputs, units), |_| rng.gen_range(-limit..limit));
        Self {
            name: name.into(),
            weights,
            bias: Array1::zeros(units),
            activation,
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn units(&self) -> usize {
        self.weights.ncols()
    }

    pub fn param_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    pub fn forward(&self, input: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut z = input.dot(&self.weights) + &self.bias;
        self.activation.apply(&mut z);
        z
    }

    /// Given this layer's `input`, its `output` and dL/d(output), return the
    /// parameter gradients and dL/d(input).
    pub fn backward(
        &self,
        input: ArrayView2<'_, f32>,
        output: &Array2<f32>,
        mut grad_output: Array2<f32>,
    ) -> (DenseGrad, Array2<f32>) {
        self.activation.backprop(output, &mut grad_output);
        let grad = DenseGrad {
            weights: input.t().dot(&grad_output),
            bias: grad_output.sum_axis(Axis(0)),
        };
        let grad_input = grad_output.dot(&self.weights.t());
        (grad, grad_input)
    }
}
