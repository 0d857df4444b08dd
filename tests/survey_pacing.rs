use adsb_probe::{
    config::{Config, Endpoint},
    error::FailureKind,
    probe::{ProbeFailure, ProbeRequest, ProbeResult, ProbeSuccess, Prober},
    report::render_survey,
    survey::{select, Survey},
};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Records when each request arrived; fails URLs containing "down".
#[derive(Default)]
struct FakeProber {
    calls: Mutex<Vec<(ProbeRequest, Instant)>>,
}

impl Prober for FakeProber {
    fn probe(&self, req: &ProbeRequest) -> ProbeResult {
        self.calls.lock().unwrap().push((req.clone(), Instant::now()));
        if req.url.contains("down") {
            ProbeResult::Failure(ProbeFailure {
                kind: FailureKind::Network,
                message: "network error: connection refused".into(),
            })
        } else {
            ProbeResult::Success(ProbeSuccess {
                http_status: 200,
                top_level_keys: vec!["ac".into()],
                sample_count: 0,
                samples: vec![],
            })
        }
    }
}

fn endpoint(name: &str, url: &str, list_field: Option<&str>) -> Endpoint {
    Endpoint {
        name: name.into(),
        url: url.into(),
        list_field: list_field.map(String::from),
        note: None,
    }
}

fn endpoints() -> Vec<Endpoint> {
    vec![
        endpoint("one", "http://one.test/", Some("ac")),
        endpoint("two", "http://down.test/", None),
        endpoint("three", "http://three.test/", Some("aircraft")),
    ]
}

#[test]
fn pauses_only_between_probes_and_keeps_going() {
    let mut cfg = Config::default();
    cfg.probe.timeout_seconds = 7;
    cfg.survey.pause_millis = 50;

    let survey = Survey::new(&cfg, FakeProber::default());
    let started = Instant::now();
    let report = survey.run(&endpoints());
    let elapsed = started.elapsed();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.failures(), 1);
    assert!(!report.entries[1].result.is_success());
    assert!(report.entries[2].result.is_success());

    // two gaps, no trailing sleep
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(1000));
    assert!(!report.started.is_empty() && !report.finished.is_empty());
}

#[test]
fn requests_carry_endpoint_settings() {
    let mut cfg = Config::default();
    cfg.probe.timeout_seconds = 7;
    let prober = FakeProber::default();
    let survey = Survey::new(&cfg, prober).with_pause(Duration::ZERO);
    let report = survey.run(&endpoints());
    assert_eq!(report.entries[0].list_field.as_deref(), Some("ac"));
    assert_eq!(report.entries[1].list_field, None);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entries"][1]["result"]["outcome"], "failure");
    assert_eq!(json["entries"][0]["result"]["http_status"], 200);
}

#[test]
fn requests_use_configured_timeout() {
    let mut cfg = Config::default();
    cfg.probe.timeout_seconds = 7;
    cfg.survey.pause_millis = 0;
    let prober = FakeProber::default();
    let _ = Survey::new(&cfg, &prober).run(&endpoints()[..1]);

    let calls = prober.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.timeout, Duration::from_secs(7));
    assert_eq!(calls[0].0.list_field.as_deref(), Some("ac"));
}

#[test]
fn select_filters_in_configured_order() {
    let picked = select(&endpoints(), &["three".into(), "one".into()]).unwrap();
    let names: Vec<&str> = picked.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["one", "three"]);

    assert_eq!(select(&endpoints(), &[]).unwrap().len(), 3);
}

#[test]
fn select_rejects_unknown_names() {
    let err = select(&endpoints(), &["opensky".into()]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("unknown endpoint: opensky"));
    assert!(msg.contains("one, two, three"));
}

#[test]
fn text_survey_has_banner_per_endpoint() {
    let cfg = Config::default();
    let survey = Survey::new(&cfg, FakeProber::default()).with_pause(Duration::ZERO);
    let report = survey.run(&endpoints());
    let text = render_survey(&report, &cfg.report.route_fields);

    assert!(text.contains("1. one"));
    assert!(text.contains("3. three"));
    assert!(text.contains("✗ Error: network error: connection refused"));
    assert!(text.contains("✓ Found 0 records in 'ac'"));
    assert!(text.contains("3 endpoint(s), 1 failed"));
}
