// Classifier - fixed threshold policy for call-readiness metrics
//
// Each metric maps to an ordinal rating (success < warning < error) through
// a fixed threshold table, and the overall verdict is the worst rating among
// the metrics that were actually computed. Absent or NaN values rate as
// warning when classified individually, but they never vote.
//
// Threshold table (units as produced by the metric finalizer):
//
// | metric               | success       | warning                     | error     |
// |----------------------|---------------|-----------------------------|-----------|
// | rms                  | >= 6          | [3, 6)                      | < 3       |
// | peak                 | < 120         | [120, 127)                  | >= 127    |
// | clipping_percent     | <= 0          | (0, 0.1)                    | >= 0.1    |
// | noise_floor_rms      | < 5           | [5, 10)                     | >= 10     |
// | snr_db               | > 30          | (20, 30]                    | <= 20     |
// | |dc_offset|          | < 0.05        | [0.05, 0.1)                 | >= 0.1    |
// | spectral_centroid_hz | [1000, 4000]  | [500, 1000) or (4000, 6000] | otherwise |

use std::fmt;
use std::str::FromStr;

use crate::analysis::metrics::Metrics;

/// Ordinal quality rating, ordered from best to worst
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Success,
    Warning,
    Error,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Success => "success",
            Rating::Warning => "warning",
            Rating::Error => "error",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics covered by the threshold table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Rms,
    Peak,
    ClippingPercent,
    NoiseFloorRms,
    SnrDb,
    DcOffset,
    SpectralCentroidHz,
}

impl MetricKind {
    /// All rated metrics in presentation order
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Rms,
        MetricKind::Peak,
        MetricKind::ClippingPercent,
        MetricKind::NoiseFloorRms,
        MetricKind::SnrDb,
        MetricKind::DcOffset,
        MetricKind::SpectralCentroidHz,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Rms => "rms",
            MetricKind::Peak => "peak",
            MetricKind::ClippingPercent => "clipping_percent",
            MetricKind::NoiseFloorRms => "noise_floor_rms",
            MetricKind::SnrDb => "snr_db",
            MetricKind::DcOffset => "dc_offset",
            MetricKind::SpectralCentroidHz => "spectral_centroid_hz",
        }
    }

    /// Read this metric's value out of a metric set
    pub fn value_in(&self, metrics: &Metrics) -> Option<f64> {
        match self {
            MetricKind::Rms => Some(metrics.rms),
            MetricKind::Peak => Some(metrics.peak),
            MetricKind::ClippingPercent => Some(metrics.clipping_percent),
            MetricKind::NoiseFloorRms => metrics.noise_floor_rms,
            MetricKind::SnrDb => metrics.snr_db,
            MetricKind::DcOffset => Some(metrics.dc_offset),
            MetricKind::SpectralCentroidHz => metrics.spectral_centroid_hz.map(f64::from),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    /// Accepts snake_case and camelCase metric names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rms" => Ok(MetricKind::Rms),
            "peak" => Ok(MetricKind::Peak),
            "clipping_percent" | "clippingPercent" => Ok(MetricKind::ClippingPercent),
            "noise_floor_rms" | "noiseFloorRms" => Ok(MetricKind::NoiseFloorRms),
            "snr_db" | "snrDb" => Ok(MetricKind::SnrDb),
            "dc_offset" | "dcOffset" => Ok(MetricKind::DcOffset),
            "spectral_centroid_hz" | "spectralCentroidHz" => Ok(MetricKind::SpectralCentroidHz),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// Rate a single metric value
///
/// Pure and total: `None` and NaN are inconclusive and rate as warning.
pub fn classify(metric: MetricKind, value: Option<f64>) -> Rating {
    let value = match value {
        Some(v) if !v.is_nan() => v,
        _ => return Rating::Warning,
    };

    match metric {
        MetricKind::Rms => {
            if value >= 6.0 {
                Rating::Success
            } else if value >= 3.0 {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
        MetricKind::Peak => {
            if value < 120.0 {
                Rating::Success
            } else if value < 127.0 {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
        MetricKind::ClippingPercent => {
            if value <= 0.0 {
                Rating::Success
            } else if value < 0.1 {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
        MetricKind::NoiseFloorRms => {
            if value < 5.0 {
                Rating::Success
            } else if value < 10.0 {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
        MetricKind::SnrDb => {
            if value > 30.0 {
                Rating::Success
            } else if value > 20.0 {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
        MetricKind::DcOffset => {
            let magnitude = value.abs();
            if magnitude < 0.05 {
                Rating::Success
            } else if magnitude < 0.1 {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
        MetricKind::SpectralCentroidHz => {
            if (1000.0..=4000.0).contains(&value) {
                Rating::Success
            } else if (500.0..1000.0).contains(&value) || (value > 4000.0 && value <= 6000.0) {
                Rating::Warning
            } else {
                Rating::Error
            }
        }
    }
}

/// Rating of one present metric
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricRating {
    pub metric: MetricKind,
    pub value: f64,
    pub rating: Rating,
}

/// Rate every metric present in a metric set, in presentation order
///
/// Absent metrics are skipped, not rated.
pub fn rate_metrics(metrics: &Metrics) -> Vec<MetricRating> {
    MetricKind::ALL
        .iter()
        .filter_map(|&metric| {
            metric.value_in(metrics).map(|value| MetricRating {
                metric,
                value,
                rating: classify(metric, Some(value)),
            })
        })
        .collect()
}

/// Worst rating among the given ratings; success when there are none
pub fn overall_rating<I>(ratings: I) -> Rating
where
    I: IntoIterator<Item = Rating>,
{
    ratings.into_iter().max().unwrap_or(Rating::Success)
}

/// Overall session verdict
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Verdict {
    pub status: Rating,
    pub message: String,
}

impl Verdict {
    /// Verdict carrying the fixed message for a rating
    pub fn for_rating(status: Rating) -> Self {
        Self {
            status,
            message: verdict_message(status).to_string(),
        }
    }

    /// Derive the verdict from a metric set
    pub fn from_metrics(metrics: &Metrics) -> Self {
        let status = overall_rating(rate_metrics(metrics).into_iter().map(|r| r.rating));
        Self::for_rating(status)
    }
}

/// Fixed verdict message for each rating
pub fn verdict_message(status: Rating) -> &'static str {
    match status {
        Rating::Success => "Audio is in good shape for calls.",
        Rating::Warning => "Audio is usable, but there is room for improvement.",
        Rating::Error => "Poor audio quality detected.",
    }
}

/// Everything the presentation layer needs after a session
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiagnosticReport {
    pub metrics: Metrics,
    pub ratings: Vec<MetricRating>,
    pub verdict: Verdict,
}

impl DiagnosticReport {
    /// Classify a metric set into a full report
    pub fn from_metrics(metrics: Metrics) -> Self {
        let ratings = rate_metrics(&metrics);
        let verdict = Verdict::for_rating(overall_rating(ratings.iter().map(|r| r.rating)));
        Self {
            metrics,
            ratings,
            verdict,
        }
    }

    /// Rating of a given metric, if it was present
    pub fn rating_of(&self, metric: MetricKind) -> Option<Rating> {
        self.ratings
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.rating)
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
