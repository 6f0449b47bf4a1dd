//! Adam optimizer state for a stack of dense layers.

use super::layer::{Dense, DenseGrad};
use ndarray::{Array1, Array2, Zip};

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-7;

struct Moments {
    m_w: Array2<f32>,
    v_w: Array2<f32>,
    m_b: Array1<f32>,
    v_b: Array1<f32>,
}

pub struct Adam {
    learning_rate: f32,
    step: i32,
    moments: Vec<Moments>,
}

impl Adam {
    pub fn new(learning_rate: f32, layers: &[Dense]) -> Self {
        let moments = layers
            .iter()
            .map(|l| Moments {
                m_w: Array2::zeros(l.weights.raw_dim()),
                v_w: Array2::zeros(l.weights.raw_dim()),
                m_b: Array1::zeros(l.bias.raw_dim()),
                v_b: Array1::zeros(l.bias.raw_dim()),
            })
            .collect();
        Self {
            learning_rate,
            step: 0,
            moments,
        }
    }

    /// Apply one update; `grads` is index-aligned with `layers`.
    pub fn step(&mut self, layers: &mut [Dense], grads: &[DenseGrad]) {
        self.step += 1;
        let t = self.step;
        let lr_t = self.learning_rate * (1.0 - BETA2.powi(t)).sqrt() / (1.0 - BETA1.powi(t));

        for ((layer, grad), mo) in layers.iter_mut().zip(grads).zip(self.moments.iter_mut()) {
            Zip::from(&mut layer.weights)
                .and(&grad.weights)
                .and(&mut mo.m_w)
                .and(&mut mo.v_w)
                .for_each(|p, &g, m, v| update(p, g, m, v, lr_t));
            Zip::from(&mut layer.bias)
                .and(&grad.bias)
                .and(&mut mo.m_b)
                .and(&mut mo.v_b)
                .for_each(|p, &g, m, v| update(p, g, m, v, lr_t));
        }
    }
}

#[inline]
fn update(p: &mut f32, g: f32, m: &mut f32, v: &mut f32, lr_t: f32) {
    *m = BETA1 * *m + (1.0 - BETA1) * g;
    *v = BETA2 * *v + (1.0 - BETA2) * g * g;
    *p -= lr_t * *m / (v.sqrt() + EPSILON);
}
