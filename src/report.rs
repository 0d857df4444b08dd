use crate::{
    inspect::{has_any_field, sample_fields},
    probe::{ProbeResult, ProbeSuccess},
    survey::SurveyReport,
};
use std::fmt::Write;

const BANNER_WIDTH: usize = 60;

/// Human-readable rendering of one probe. `list_field` only affects wording.
pub fn render_result(
    result: &ProbeResult,
    list_field: Option<&str>,
    route_fields: &[String],
) -> String {
    let mut out = String::new();
    match result {
        ProbeResult::Success(s) => render_success(&mut out, s, list_field, route_fields),
        ProbeResult::Failure(f) => {
            let _ = writeln!(out, "✗ Error: {}", f.message);
        }
    }
    out
}

fn render_success(
    out: &mut String,
    s: &ProbeSuccess,
    list_field: Option<&str>,
    route_fields: &[String],
) {
    let _ = writeln!(out, "✓ Status: {}", s.http_status);
    let _ = writeln!(out, "✓ Keys: {:?}", s.top_level_keys);

    if let Some(field) = list_field.filter(|f| !f.is_empty()) {
        let _ = writeln!(out, "✓ Found {} records in '{}'", s.sample_count, field);
    }

    let Some(first) = s.samples.first() else {
        return;
    };

    let _ = writeln!(out, "\nFirst sample:");
    let pretty = serde_json::to_string_pretty(first).unwrap_or_else(|_| first.to_string());
    let _ = writeln!(out, "{pretty}");

    let fields = sample_fields(first);
    if !fields.is_empty() {
        let _ = writeln!(out, "Sample fields: {:?}", fields);
    }
    if has_any_field(first, route_fields) {
        let _ = writeln!(out, "✓ Has route information!");
    }
}

pub fn render_survey(report: &SurveyReport, route_fields: &[String]) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();

    for (i, entry) in report.entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{rule}\n{}. {}\n{rule}", i + 1, entry.name);
        let _ = writeln!(out, "{}", entry.url);

        out.push_str(&render_result(
            &entry.result,
            entry.list_field.as_deref(),
            route_fields,
        ));

        if let Some(note) = &entry.note {
            let _ = writeln!(out, "Note: {note}");
        }
    }

    let _ = writeln!(
        out,
        "\n{} endpoint(s), {} failed",
        report.entries.len(),
        report.failures()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::FailureKind, probe::ProbeFailure};
    use serde_json::json;

    fn route_fields() -> Vec<String> {
        vec!["from".into(), "to".into()]
    }

    #[test]
    fn success_lists_status_keys_and_first_sample() {
        let r = ProbeResult::Success(ProbeSuccess {
            http_status: 200,
            top_level_keys: vec!["now".into(), "aircraft".into()],
            sample_count: 41,
            samples: vec![
                json!({"hex": "a1b2c3", "flight": "AAL123"}),
                json!({"hex": "ffffff"}),
            ],
        });
        let text = render_result(&r, Some("aircraft"), &route_fields());
        assert!(text.contains("✓ Status: 200"));
        assert!(text.contains(r#"✓ Keys: ["now", "aircraft"]"#));
        assert!(text.contains("✓ Found 41 records in 'aircraft'"));
        assert!(text.contains("\"flight\": \"AAL123\""));
        assert!(text.contains(r#"Sample fields: ["hex", "flight"]"#));
        assert!(!text.contains("route information"));
        assert!(!text.contains("ffffff"));
    }

    #[test]
    fn route_fields_are_called_out() {
        let r = ProbeResult::Success(ProbeSuccess {
            http_status: 200,
            top_level_keys: vec!["ac".into()],
            sample_count: 1,
            samples: vec![json!({"hex": "a1b2c3", "from": "KDCA", "to": "KBOS"})],
        });
        let text = render_result(&r, Some("ac"), &route_fields());
        assert!(text.contains("✓ Has route information!"));
    }

    #[test]
    fn failure_is_one_error_line() {
        let r = ProbeResult::Failure(ProbeFailure {
            kind: FailureKind::Network,
            message: "network error: connection refused".into(),
        });
        assert_eq!(
            render_result(&r, Some("ac"), &route_fields()),
            "✗ Error: network error: connection refused\n"
        );
    }
}
