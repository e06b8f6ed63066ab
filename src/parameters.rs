use std::fmt::{self, Display};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::{NnErr, Result};

/// The weights and biases of every transition of a network.
///
/// Cloning is deep, a `Parameters` never aliases the buffers of the network it was taken from.
/// It is also the shape of every gradient computed by the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawParameters", try_from = "RawParameters")]
pub struct Parameters {
    pub(crate) weights: Vec<Array2<f64>>,
    pub(crate) biases: Vec<Array1<f64>>,
}

impl Parameters {
    /// Creates a new `Parameters` out of its weights and biases.
    ///
    /// # Arguments
    /// * `weights` - One `[out, in]` matrix per transition.
    /// * `biases` - One `out` vector per transition.
    ///
    /// # Returns
    /// The parameters or an error if the weights and biases don't line up.
    pub fn new(weights: Vec<Array2<f64>>, biases: Vec<Array1<f64>>) -> Result<Self> {
        if weights.len() != biases.len() {
            return Err(NnErr::SizeMismatch {
                what: "bias vectors",
                got: biases.len(),
                expected: weights.len(),
            });
        }

        for (w, b) in weights.iter().zip(&biases) {
            if w.nrows() != b.len() {
                return Err(NnErr::SizeMismatch {
                    what: "bias vector length",
                    got: b.len(),
                    expected: w.nrows(),
                });
            }
        }

        for pair in weights.windows(2) {
            if pair[1].ncols() != pair[0].nrows() {
                return Err(NnErr::SizeMismatch {
                    what: "weight matrix columns",
                    got: pair[1].ncols(),
                    expected: pair[0].nrows(),
                });
            }
        }

        Ok(Self { weights, biases })
    }

    /// All-zero parameters for the given layer widths.
    pub fn zeros(layer_sizes: &[usize]) -> Self {
        let weights = layer_sizes
            .windows(2)
            .map(|w| Array2::zeros((w[1], w[0])))
            .collect();

        let biases = layer_sizes[1..].iter().map(|&n| Array1::zeros(n)).collect();

        Self { weights, biases }
    }

    /// All-zero parameters with the same shape as `self`.
    pub fn zeros_like(&self) -> Self {
        Self {
            weights: self.weights.iter().map(|w| Array2::zeros(w.dim())).collect(),
            biases: self.biases.iter().map(|b| Array1::zeros(b.dim())).collect(),
        }
    }

    pub fn weights(&self) -> &[Array2<f64>] {
        &self.weights
    }

    pub fn biases(&self) -> &[Array1<f64>] {
        &self.biases
    }

    /// Returns the amount of transitions.
    pub fn transitions(&self) -> usize {
        self.weights.len()
    }

    /// Returns the amount of scalar parameters.
    pub fn len(&self) -> usize {
        let w: usize = self.weights.iter().map(|w| w.len()).sum();
        let b: usize = self.biases.iter().map(|b| b.len()).sum();
        w + b
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `[out, in]` shape of every weight matrix.
    pub fn shapes(&self) -> Vec<(usize, usize)> {
        self.weights.iter().map(|w| w.dim()).collect()
    }

    /// Adds `alpha * other` to `self`. Both must have the same shape.
    pub fn scaled_add(&mut self, alpha: f64, other: &Parameters) {
        for (w, ow) in self.weights.iter_mut().zip(&other.weights) {
            w.scaled_add(alpha, ow);
        }

        for (b, ob) in self.biases.iter_mut().zip(&other.biases) {
            b.scaled_add(alpha, ob);
        }
    }

    /// Multiplies every value by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for w in &mut self.weights {
            *w *= factor;
        }

        for b in &mut self.biases {
            *b *= factor;
        }
    }

    /// Returns `true` if no value is `NaN` or infinite.
    pub fn is_finite(&self) -> bool {
        self.weights.iter().all(|w| w.iter().all(|x| x.is_finite()))
            && self.biases.iter().all(|b| b.iter().all(|x| x.is_finite()))
    }

    /// Checks that `self` has the shape of `other`.
    pub(crate) fn check_shape(&self, other: &Parameters) -> Result<()> {
        if self.transitions() != other.transitions() {
            return Err(NnErr::SizeMismatch {
                what: "transitions",
                got: other.transitions(),
                expected: self.transitions(),
            });
        }

        for (w, ow) in self.weights.iter().zip(&other.weights) {
            if w.dim() != ow.dim() {
                return Err(NnErr::SizeMismatch {
                    what: "weight matrix",
                    got: ow.len(),
                    expected: w.len(),
                });
            }
        }

        Ok(())
    }
}

/// Respects the formatter's precision, `{:.3}` prints every value with three decimals.
impl Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6);

        let weights: Vec<_> = self
            .weights
            .iter()
            .map(|w| {
                let rows: Vec<_> = w
                    .rows()
                    .into_iter()
                    .map(|r| fmt_row(r.iter(), prec))
                    .collect();
                format!("[{}]", rows.join(", "))
            })
            .collect();

        let biases: Vec<_> = self.biases.iter().map(|b| fmt_row(b.iter(), prec)).collect();

        write!(
            f,
            "weights=[{}] biases=[{}]",
            weights.join(", "),
            biases.join(", ")
        )
    }
}

fn fmt_row<'a>(values: impl Iterator<Item = &'a f64>, prec: usize) -> String {
    let values: Vec<_> = values.map(|v| format!("{v:.prec$}")).collect();
    format!("[{}]", values.join(", "))
}

/// The wire form of `Parameters`: plain nested numeric arrays.
#[derive(Serialize, Deserialize)]
struct RawParameters {
    weights: Vec<Vec<Vec<f64>>>,
    biases: Vec<Vec<f64>>,
}

impl From<Parameters> for RawParameters {
    fn from(value: Parameters) -> Self {
        let weights = value
            .weights
            .iter()
            .map(|w| w.rows().into_iter().map(|r| r.to_vec()).collect())
            .collect();

        let biases = value.biases.iter().map(|b| b.to_vec()).collect();

        Self { weights, biases }
    }
}

impl TryFrom<RawParameters> for Parameters {
    type Error = NnErr;

    fn try_from(value: RawParameters) -> Result<Self> {
        let mut weights = Vec::with_capacity(value.weights.len());

        for rows in value.weights {
            let nrows = rows.len();
            let ncols = rows.first().map_or(0, Vec::len);

            if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
                return Err(NnErr::SizeMismatch {
                    what: "weight matrix row",
                    got: bad.len(),
                    expected: ncols,
                });
            }

            let flat = rows.into_iter().flatten().collect();
            weights.push(Array2::from_shape_vec((nrows, ncols), flat)?);
        }

        let biases = value.biases.into_iter().map(Array1::from_vec).collect();
        Parameters::new(weights, biases)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn params() -> Parameters {
        Parameters::new(
            vec![array![[1., 2.], [3., 4.], [5., 6.]], array![[0.5, -0.5, 1.]]],
            vec![array![0.1, 0.2, 0.3], array![-1.]],
        )
        .unwrap()
    }

    #[test]
    fn zeros_follow_the_layer_sizes() {
        let params = Parameters::zeros(&[2, 3, 1]);
        assert_eq!(params.shapes(), [(3, 2), (1, 3)]);
        assert_eq!(params.biases()[0].len(), 3);
        assert_eq!(params.len(), 6 + 3 + 3 + 1);
    }

    #[test]
    fn clones_are_independent() {
        let original = params();
        let mut copy = original.clone();
        copy.weights[0][[0, 0]] = 100.;
        copy.biases[1][0] = 100.;

        assert_eq!(original.weights()[0][[0, 0]], 1.);
        assert_eq!(original.biases()[1][0], -1.);
    }

    #[test]
    fn mismatched_biases_are_rejected() {
        let res = Parameters::new(vec![array![[1., 2.]]], vec![array![0., 0.]]);
        assert!(matches!(res, Err(NnErr::SizeMismatch { .. })));
    }

    #[test]
    fn unchained_transitions_are_rejected() {
        let res = Parameters::new(
            vec![array![[1., 2.]], array![[1., 2.]]],
            vec![array![0.], array![0.]],
        );
        assert!(matches!(res, Err(NnErr::SizeMismatch { .. })));
    }

    #[test]
    fn scaled_add_and_scale() {
        let mut acc = params().zeros_like();
        acc.scaled_add(1., &params());
        acc.scaled_add(1., &params());
        acc.scale(0.5);

        assert_eq!(acc, params());
    }

    #[test]
    fn detects_non_finite_values() {
        let mut params = params();
        assert!(params.is_finite());

        params.biases[0][2] = f64::NAN;
        assert!(!params.is_finite());
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let json = serde_json::to_value(params()).unwrap();
        assert_eq!(json["weights"][0][1], serde_json::json!([3., 4.]));
        assert_eq!(json["biases"][1], serde_json::json!([-1.]));

        let back: Parameters = serde_json::from_value(json).unwrap();
        assert_eq!(back, params());
    }

    #[test]
    fn ragged_rows_fail_to_deserialize() {
        let json = r#"{"weights": [[[1.0, 2.0], [3.0]]], "biases": [[0.0, 0.0]]}"#;
        assert!(serde_json::from_str::<Parameters>(json).is_err());
    }

    #[test]
    fn display_respects_precision() {
        let params = Parameters::new(vec![array![[1.23456]]], vec![array![-0.5]]).unwrap();
        assert_eq!(
            format!("{params:.3}"),
            "weights=[[[1.235]]] biases=[[-0.500]]"
        );
    }
}
