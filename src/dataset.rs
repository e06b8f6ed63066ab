use crate::{NnErr, Result};

/// A single supervised sample (x, y).
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    input: Vec<f64>,
    target: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }
}

/// An in-memory, non-empty dataset where every input has the same width and so does every
/// target. Training always goes over the whole dataset, its order doesn't matter.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<Sample>,
    x_size: usize,
    y_size: usize,
}

impl Dataset {
    /// Creates a new `Dataset` pairing every input with its target.
    ///
    /// # Arguments
    /// * `x` - The inputs.
    /// * `y` - The targets.
    ///
    /// # Returns
    /// The dataset or an error if it's empty, the counts differ or a row has a different
    /// width than the first one.
    pub fn new(x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(NnErr::SampleCountMismatch {
                inputs: x.len(),
                targets: y.len(),
            });
        }

        let samples = x.into_iter().zip(y).map(|(x, y)| Sample::new(x, y));
        Self::from_samples(samples.collect())
    }

    /// Creates a new `Dataset` out of already paired samples.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        let first = samples.first().ok_or(NnErr::EmptyDataset)?;
        let x_size = first.input.len();
        let y_size = first.target.len();

        for (i, sample) in samples.iter().enumerate() {
            check_row("input", i, sample.input.len(), x_size)?;
            check_row("target", i, sample.target.len(), y_size)?;
        }

        Ok(Self {
            samples,
            x_size,
            y_size,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The width of every input.
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// The width of every target.
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Checks this dataset can train a network with the given input and output widths.
    pub fn check_widths(&self, input: usize, output: usize) -> Result<()> {
        if self.x_size != input {
            return Err(NnErr::SizeMismatch {
                what: "dataset inputs",
                got: self.x_size,
                expected: input,
            });
        }

        if self.y_size != output {
            return Err(NnErr::SizeMismatch {
                what: "dataset targets",
                got: self.y_size,
                expected: output,
            });
        }

        Ok(())
    }
}

fn check_row(what: &'static str, sample: usize, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(NnErr::RaggedDataset {
            what,
            sample,
            got,
            expected,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_basic() {
        let ds = Dataset::new(vec![vec![1., 2.], vec![3., 4.]], vec![vec![3.], vec![7.]]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.x_size(), 2);
        assert_eq!(ds.y_size(), 1);
        assert_eq!(ds.samples()[1], Sample::new(vec![3., 4.], vec![7.]));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert!(matches!(
            Dataset::new(vec![], vec![]),
            Err(NnErr::EmptyDataset)
        ));
    }

    #[test]
    fn counts_must_match() {
        let res = Dataset::new(vec![vec![1.], vec![2.]], vec![vec![2.]]);
        assert!(matches!(
            res,
            Err(NnErr::SampleCountMismatch {
                inputs: 2,
                targets: 1
            })
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let res = Dataset::new(vec![vec![1.], vec![2., 3.]], vec![vec![2.], vec![4.]]);
        assert!(matches!(
            res,
            Err(NnErr::RaggedDataset {
                what: "input",
                sample: 1,
                ..
            })
        ));
    }

    #[test]
    fn widths_are_checked_against_a_network() {
        let ds = Dataset::new(vec![vec![1.]], vec![vec![2.]]).unwrap();
        assert!(ds.check_widths(1, 1).is_ok());
        assert!(ds.check_widths(2, 1).is_err());
        assert!(ds.check_widths(1, 3).is_err());
    }
}
