// Spectrum module - frequency metrics over the session magnitude accumulator
//
// Bin i is taken to sit at i * bin_width Hz, where
// bin_width = (sample_rate / 2) / bin_count.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description

/// Index of the largest accumulated magnitude
///
/// Ties resolve to the lowest index (first maximum encountered).
pub fn dominant_bin(accum: &[f64]) -> Option<usize> {
    let (first, rest) = accum.split_first()?;
    let mut best_idx = 0;
    let mut best = *first;
    for (offset, &value) in rest.iter().enumerate() {
        if value > best {
            best = value;
            best_idx = offset + 1;
        }
    }
    Some(best_idx)
}

/// Dominant frequency in Hz, rounded to the nearest integer
///
/// # Returns
/// `None` only when the accumulator is empty
pub fn dominant_frequency_hz(accum: &[f64], bin_width_hz: f64) -> Option<u32> {
    dominant_bin(accum).map(|idx| round_hz(idx as f64 * bin_width_hz))
}

/// Spectral centroid in Hz, rounded to the nearest integer
///
/// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
///
/// # Returns
/// `None` when the accumulated spectrum carries no energy
pub fn spectral_centroid_hz(accum: &[f64], bin_width_hz: f64) -> Option<u32> {
    let mut weighted_sum = 0.0f64;
    let mut magnitude_sum = 0.0f64;
    for (i, &mag) in accum.iter().enumerate() {
        weighted_sum += i as f64 * bin_width_hz * mag;
        magnitude_sum += mag;
    }

    if magnitude_sum > 0.0 {
        Some(round_hz(weighted_sum / magnitude_sum))
    } else {
        None
    }
}

fn round_hz(hz: f64) -> u32 {
    hz.max(0.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_bin_picks_maximum() {
        assert_eq!(dominant_bin(&[1.0, 5.0, 2.0]), Some(1));
        assert_eq!(dominant_bin(&[]), None);
    }

    #[test]
    fn test_dominant_bin_ties_resolve_low() {
        assert_eq!(dominant_bin(&[3.0, 7.0, 7.0, 1.0]), Some(1));
        assert_eq!(dominant_bin(&[0.0, 0.0, 0.0]), Some(0));
    }

    #[test]
    fn test_dominant_frequency_rounding() {
        // 44100 Hz, 1024 bins -> 21.533203125 Hz per bin
        let bin_width = 22_050.0 / 1024.0;
        let mut accum = vec![0.0; 1024];
        accum[46] = 10.0;
        assert_eq!(dominant_frequency_hz(&accum, bin_width), Some(991));
    }

    #[test]
    fn test_centroid_single_bin() {
        let mut accum = vec![0.0; 8];
        accum[4] = 2.0;
        assert_eq!(spectral_centroid_hz(&accum, 100.0), Some(400));
    }

    #[test]
    fn test_centroid_weighted_mean() {
        // bins at 0, 100, 200 Hz with weights 1, 1, 2 -> (0 + 100 + 400) / 4 = 125
        assert_eq!(spectral_centroid_hz(&[1.0, 1.0, 2.0], 100.0), Some(125));
    }

    #[test]
    fn test_centroid_absent_for_zero_energy() {
        assert_eq!(spectral_centroid_hz(&[0.0; 16], 10.0), None);
        assert_eq!(spectral_centroid_hz(&[], 10.0), None);
    }
}
