use super::*;

/// Helper to build a metric set; optional fields default to absent
fn create_metrics(rms: f64, peak: f64, clipping_percent: f64, dc_offset: f64) -> Metrics {
    Metrics {
        rms,
        peak,
        clipping_percent,
        noise_floor_rms: None,
        snr_db: None,
        dominant_freq_hz: None,
        spectral_centroid_hz: None,
        dc_offset,
    }
}

/// Metric set that rates success on every field
fn healthy_metrics() -> Metrics {
    Metrics {
        rms: 12.0,
        peak: 90.0,
        clipping_percent: 0.0,
        noise_floor_rms: Some(1.5),
        snr_db: Some(35.0),
        dominant_freq_hz: Some(215),
        spectral_centroid_hz: Some(1800),
        dc_offset: 0.01,
    }
}

#[test]
fn test_rms_boundaries() {
    assert_eq!(classify(MetricKind::Rms, Some(6.0)), Rating::Success);
    assert_eq!(classify(MetricKind::Rms, Some(5.999)), Rating::Warning);
    assert_eq!(classify(MetricKind::Rms, Some(3.0)), Rating::Warning);
    assert_eq!(classify(MetricKind::Rms, Some(2.999)), Rating::Error);
    assert_eq!(classify(MetricKind::Rms, Some(0.0)), Rating::Error);
}

#[test]
fn test_peak_boundaries() {
    assert_eq!(classify(MetricKind::Peak, Some(119.99)), Rating::Success);
    assert_eq!(classify(MetricKind::Peak, Some(120.0)), Rating::Warning);
    assert_eq!(classify(MetricKind::Peak, Some(126.99)), Rating::Warning);
    assert_eq!(classify(MetricKind::Peak, Some(127.0)), Rating::Error);
    assert_eq!(classify(MetricKind::Peak, Some(128.0)), Rating::Error);
}

#[test]
fn test_clipping_boundaries() {
    assert_eq!(
        classify(MetricKind::ClippingPercent, Some(0.0)),
        Rating::Success
    );
    assert_eq!(
        classify(MetricKind::ClippingPercent, Some(0.0999)),
        Rating::Warning
    );
    assert_eq!(
        classify(MetricKind::ClippingPercent, Some(0.1)),
        Rating::Error
    );
    assert_eq!(
        classify(MetricKind::ClippingPercent, Some(1e-9)),
        Rating::Warning
    );
}

#[test]
fn test_noise_floor_boundaries() {
    assert_eq!(classify(MetricKind::NoiseFloorRms, Some(4.99)), Rating::Success);
    assert_eq!(classify(MetricKind::NoiseFloorRms, Some(5.0)), Rating::Warning);
    assert_eq!(classify(MetricKind::NoiseFloorRms, Some(9.99)), Rating::Warning);
    assert_eq!(classify(MetricKind::NoiseFloorRms, Some(10.0)), Rating::Error);
}

#[test]
fn test_snr_boundaries() {
    assert_eq!(classify(MetricKind::SnrDb, Some(30.01)), Rating::Success);
    assert_eq!(classify(MetricKind::SnrDb, Some(30.0)), Rating::Warning);
    assert_eq!(classify(MetricKind::SnrDb, Some(20.01)), Rating::Warning);
    assert_eq!(classify(MetricKind::SnrDb, Some(20.0)), Rating::Error);
    assert_eq!(classify(MetricKind::SnrDb, Some(-3.0)), Rating::Error);
}

#[test]
fn test_dc_offset_uses_magnitude() {
    assert_eq!(classify(MetricKind::DcOffset, Some(0.049)), Rating::Success);
    assert_eq!(classify(MetricKind::DcOffset, Some(-0.049)), Rating::Success);
    assert_eq!(classify(MetricKind::DcOffset, Some(-0.05)), Rating::Warning);
    assert_eq!(classify(MetricKind::DcOffset, Some(0.0999)), Rating::Warning);
    assert_eq!(classify(MetricKind::DcOffset, Some(-0.1)), Rating::Error);
}

#[test]
fn test_centroid_bands() {
    let centroid = MetricKind::SpectralCentroidHz;
    assert_eq!(classify(centroid, Some(1000.0)), Rating::Success);
    assert_eq!(classify(centroid, Some(4000.0)), Rating::Success);
    assert_eq!(classify(centroid, Some(500.0)), Rating::Warning);
    assert_eq!(classify(centroid, Some(999.0)), Rating::Warning);
    assert_eq!(classify(centroid, Some(4001.0)), Rating::Warning);
    assert_eq!(classify(centroid, Some(6000.0)), Rating::Warning);
    assert_eq!(classify(centroid, Some(499.0)), Rating::Error);
    assert_eq!(classify(centroid, Some(6001.0)), Rating::Error);
}

#[test]
fn test_absent_and_nan_are_inconclusive() {
    for metric in MetricKind::ALL {
        assert_eq!(
            classify(metric, None),
            Rating::Warning,
            "absent {} should be warning",
            metric
        );
        assert_eq!(
            classify(metric, Some(f64::NAN)),
            Rating::Warning,
            "NaN {} should be warning",
            metric
        );
    }
}

#[test]
fn test_metric_names_parse() {
    assert_eq!("rms".parse::<MetricKind>(), Ok(MetricKind::Rms));
    assert_eq!(
        "clippingPercent".parse::<MetricKind>(),
        Ok(MetricKind::ClippingPercent)
    );
    assert_eq!(
        "clipping_percent".parse::<MetricKind>(),
        Ok(MetricKind::ClippingPercent)
    );
    assert_eq!("snrDb".parse::<MetricKind>(), Ok(MetricKind::SnrDb));
    assert!("loudness".parse::<MetricKind>().is_err());

    for metric in MetricKind::ALL {
        assert_eq!(metric.name().parse::<MetricKind>(), Ok(metric));
    }
}

#[test]
fn test_rating_order_is_worst_last() {
    assert!(Rating::Success < Rating::Warning);
    assert!(Rating::Warning < Rating::Error);
}

#[test]
fn test_overall_worst_of_all() {
    use Rating::*;
    assert_eq!(overall_rating([Success, Warning, Success, Error]), Error);
    assert_eq!(overall_rating([Success, Warning, Success]), Warning);
    assert_eq!(overall_rating([Success, Success]), Success);
    assert_eq!(overall_rating(Vec::new()), Success);
}

#[test]
fn test_verdict_for_healthy_session() {
    let verdict = Verdict::from_metrics(&healthy_metrics());
    assert_eq!(verdict.status, Rating::Success);
    assert_eq!(verdict.message, verdict_message(Rating::Success));
}

#[test]
fn test_absent_metrics_do_not_vote() {
    // Only rms/peak/clipping/dc are present and all healthy
    let metrics = create_metrics(8.0, 60.0, 0.0, 0.0);
    let report = DiagnosticReport::from_metrics(metrics);

    assert_eq!(report.verdict.status, Rating::Success);
    assert_eq!(report.ratings.len(), 4);
    assert_eq!(report.rating_of(MetricKind::SnrDb), None);
    assert_eq!(report.rating_of(MetricKind::NoiseFloorRms), None);
}

#[test]
fn test_single_error_dominates_verdict() {
    let mut metrics = healthy_metrics();
    metrics.clipping_percent = 0.5;
    let report = DiagnosticReport::from_metrics(metrics);

    assert_eq!(report.verdict.status, Rating::Error);
    assert_eq!(report.verdict.message, "Poor audio quality detected.");
    assert_eq!(
        report.rating_of(MetricKind::ClippingPercent),
        Some(Rating::Error)
    );
    assert_eq!(report.rating_of(MetricKind::Rms), Some(Rating::Success));
}

#[test]
fn test_centroid_votes_in_verdict() {
    let mut metrics = healthy_metrics();
    metrics.spectral_centroid_hz = Some(700);
    assert_eq!(Verdict::from_metrics(&metrics).status, Rating::Warning);

    metrics.spectral_centroid_hz = Some(7500);
    assert_eq!(Verdict::from_metrics(&metrics).status, Rating::Error);
}

#[test]
fn test_dominant_frequency_never_votes() {
    let mut metrics = healthy_metrics();
    metrics.dominant_freq_hz = Some(19_000);
    let report = DiagnosticReport::from_metrics(metrics);
    assert_eq!(report.verdict.status, Rating::Success);
    assert!(report.ratings.iter().all(|r| r.value != 19_000.0));
}

#[test]
fn test_report_order_follows_presentation_order() {
    let report = DiagnosticReport::from_metrics(healthy_metrics());
    let order: Vec<MetricKind> = report.ratings.iter().map(|r| r.metric).collect();
    assert_eq!(order, MetricKind::ALL.to_vec());
}

#[test]
fn test_classification_is_idempotent() {
    let metrics = healthy_metrics();
    assert_eq!(
        DiagnosticReport::from_metrics(metrics),
        DiagnosticReport::from_metrics(metrics)
    );
    assert_eq!(
        classify(MetricKind::Rms, Some(4.2)),
        classify(MetricKind::Rms, Some(4.2))
    );
}

#[test]
fn test_report_serializes_snake_case() {
    let report = DiagnosticReport::from_metrics(healthy_metrics());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["verdict"]["status"], "success");
    assert_eq!(json["ratings"][0]["metric"], "rms");
    assert_eq!(json["metrics"]["snr_db"], 35.0);
}

#[test]
fn test_ratings_use_unrounded_values() {
    let metrics = Metrics {
        clipping_percent: 0.004,
        ..healthy_metrics()
    };
    assert_eq!(metrics.rounded().clipping_percent, 0.0);

    let report = DiagnosticReport::from_metrics(metrics);
    assert_eq!(
        report.rating_of(MetricKind::ClippingPercent),
        Some(Rating::Warning)
    );
    assert_eq!(report.metrics.clipping_percent, 0.004);
    assert_eq!(report.verdict.status, Rating::Warning);
}
