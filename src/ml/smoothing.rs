use crate::models::Prediction;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Centred moving average over a prediction sequence.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    window: usize,
}

impl Smoother {
    /// A window of zero is treated as one (no smoothing).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Averages `predicted_demand` over `[i - floor(w/2), i + ceil(w/2))`,
    /// clipped to the sequence. Edge windows are shorter; nothing is padded.
    /// All other fields pass through unchanged.
    pub fn smooth(&self, predictions: &[Prediction]) -> Vec<Prediction> {
        let len = predictions.len();
        let behind = self.window / 2;
        let ahead = (self.window + 1) / 2;

        predictions
            .iter()
            .enumerate()
            .map(|(i, prediction)| {
                let start = i.saturating_sub(behind);
                let end = (i + ahead).min(len);
                let slice = &predictions[start..end];
                let average =
                    slice.iter().map(|p| p.predicted_demand).sum::<f64>() / slice.len() as f64;
                Prediction {
                    predicted_demand: average,
                    ..prediction.clone()
                }
            })
            .collect()
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}
