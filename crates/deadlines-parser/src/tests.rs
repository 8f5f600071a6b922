use std::fs;
use std::path::PathBuf;

use serde_json::json;

use crate::errors::ParserError;
use crate::formats::{
    decode_payload, CanonicalAdapter, CcfddlAcceptanceAdapter, CcfddlConferenceAdapter,
    PayloadEncoding,
};
use crate::model::{
    normalize_series_name, series_key, DateExpr, FragmentRole, Lifecycle, RankGrade,
};
use crate::parse_source;
use crate::registry::{parse_with_adapters, SourceAdapter};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn yaml_fixture(path: &str) -> serde_json::Value {
    decode_payload(&fixture(path), PayloadEncoding::Yaml).expect("fixture is valid YAML")
}

fn json_fixture(path: &str) -> serde_json::Value {
    decode_payload(&fixture(path), PayloadEncoding::Json).expect("fixture is valid JSON")
}

#[test]
fn routes_ccfddl_conference_list() {
    let parsed = parse_source(&yaml_fixture("allconf.yml")).expect("allconf parse failed");

    assert_eq!(parsed.adapter, "CCFDDL_CONFERENCES");
    assert_eq!(parsed.fragments.len(), 5);
    assert_eq!(parsed.issues.len(), 1);
    assert_eq!(parsed.issues[0].record, "#5");

    let icse = &parsed.fragments[0];
    assert_eq!(icse.title, "ICSE");
    assert_eq!(icse.role, FragmentRole::Primary);
    assert_eq!(icse.category.as_deref(), Some("Software Engineering"));
    assert_eq!(
        icse.rankings.as_ref().and_then(|r| r.get("core")).map(String::as_str),
        Some("A*")
    );

    let instances = icse.instances.as_ref().expect("ICSE instances");
    assert_eq!(instances.len(), 1);
    let instance = &instances[0];
    assert_eq!(instance.year, 2026);
    assert_eq!(instance.timezone.as_deref(), Some("AoE"));
    assert_eq!(instance.date_text.as_deref(), Some("April 12-18, 2026"));

    let labels: Vec<&str> = instance.timeline.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        ["Abstract deadline", "Submission deadline", "Submission deadline"]
    );
    assert_eq!(instance.timeline[0].comment.as_deref(), Some("First cycle"));
    assert_eq!(instance.timeline[2].date, DateExpr::Tbd);
}

#[test]
fn ccfddl_titles_are_normalized() {
    let parsed = parse_source(&yaml_fixture("allconf.yml")).expect("allconf parse failed");
    let titles: Vec<&str> = parsed.fragments.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["ICSE", "S&P", "ESEM", "ACNS", "QUANT"]);
}

#[test]
fn unknown_category_codes_are_kept_verbatim() {
    let parsed = parse_source(&yaml_fixture("allconf.yml")).expect("allconf parse failed");
    let quant = parsed
        .fragments
        .iter()
        .find(|f| f.title == "QUANT")
        .expect("QUANT fragment");
    assert_eq!(quant.category.as_deref(), Some("QX"));
    assert_eq!(quant.instances.as_ref().unwrap()[0].timezone, None);
}

#[test]
fn routes_acceptance_feed_as_enrichment() {
    let parsed = parse_source(&yaml_fixture("allacc.yml")).expect("allacc parse failed");

    assert_eq!(parsed.adapter, "CCFDDL_ACCEPTANCE");
    assert_eq!(parsed.fragments.len(), 3);
    assert!(parsed
        .fragments
        .iter()
        .all(|f| f.role == FragmentRole::Enrichment && f.instances.is_none()));

    let sp = &parsed.fragments[1];
    assert_eq!(sp.title, "S&P");
    let stats = sp.acceptance.as_ref().expect("S&P acceptance")[&2026];
    assert_eq!(stats.submitted, 1466);
    assert_eq!(stats.accepted, 261);
}

#[test]
fn routes_canonical_mapping() {
    let parsed = parse_source(&json_fixture("conferences.json")).expect("canonical parse failed");

    assert_eq!(parsed.adapter, "CANONICAL");
    assert_eq!(parsed.fragments.len(), 2);
    assert_eq!(parsed.issues.len(), 1);
    assert_eq!(parsed.issues[0].record, "BROKEN__CATOther");

    let aaai = parsed
        .fragments
        .iter()
        .find(|f| f.title == "AAAI")
        .expect("AAAI fragment");
    assert_eq!(aaai.acceptance.as_ref().map(|a| a.len()), Some(2));
    let instance = &aaai.instances.as_ref().unwrap()[0];
    assert_eq!(instance.timezone.as_deref(), Some("UTC-12"));
    assert_eq!(instance.timeline[1].comment.as_deref(), Some("Full paper"));
    assert_eq!(instance.timeline[3].lifecycle(), Some(Lifecycle::Start));

    let icse = parsed.fragments.iter().find(|f| f.title == "ICSE").unwrap();
    assert_eq!(icse.acceptance.as_ref().map(|a| a.len()), Some(0));
}

#[test]
fn canonical_fields_absent_from_payload_stay_unset() {
    let payload = json!({
        "x": { "name": "FSE", "conferences": { "2026": { "timeline": [] } } }
    });
    let parsed = parse_source(&payload).expect("canonical parse failed");
    let fse = &parsed.fragments[0];
    assert_eq!(fse.rankings, None);
    assert_eq!(fse.acceptance, None);
    assert_eq!(fse.category, None);
}

#[test]
fn canonical_rejects_non_numeric_year_keys() {
    let payload = json!({
        "x": {
            "name": "FSE",
            "conferences": { "next": { "timeline": [] }, "2026": { "timeline": [] } }
        }
    });
    let parsed = parse_source(&payload).expect("canonical parse failed");
    assert_eq!(parsed.fragments[0].instances.as_ref().unwrap().len(), 1);
    assert_eq!(parsed.issues.len(), 1);
}

#[test]
fn unknown_payload_lists_every_attempt() {
    let err = parse_source(&json!("just a string")).expect_err("strings are not a source");
    match err {
        ParserError::NoMatchingAdapter { attempts } => {
            let names: Vec<&str> = attempts.iter().map(|a| a.adapter).collect();
            assert_eq!(names, ["CANONICAL", "CCFDDL_CONFERENCES", "CCFDDL_ACCEPTANCE"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn list_without_known_fields_is_rejected() {
    let err = parse_source(&json!([{ "title": "X" }])).expect_err("no adapter fits");
    assert!(matches!(err, ParserError::NoMatchingAdapter { .. }));
}

#[test]
fn custom_adapter_order_is_respected() {
    let acceptance = CcfddlAcceptanceAdapter;
    let conferences = CcfddlConferenceAdapter;
    let adapters: [&dyn SourceAdapter; 2] = [&acceptance, &conferences];
    let parsed = parse_with_adapters(&json!([]), &adapters).expect("empty list parses");
    assert_eq!(parsed.adapter, "CCFDDL_CONFERENCES");
    assert!(parsed.fragments.is_empty());
}

#[test]
fn canonical_adapter_rejects_lists_directly() {
    let err = CanonicalAdapter
        .parse(&json!([]))
        .expect_err("lists are not canonical");
    assert!(matches!(err, ParserError::FormatMismatch { .. }));
}

#[test]
fn invalid_json_surfaces_decode_error() {
    let err = decode_payload("{not json", PayloadEncoding::Json).expect_err("invalid JSON");
    assert!(matches!(err, ParserError::Json { .. }));
}

#[test]
fn rank_grades_follow_core_order() {
    let grades: Vec<RankGrade> = ["A*", "A", "B", "C", "D"].into_iter().map(RankGrade::from).collect();
    let minimum = RankGrade::A;
    let kept: Vec<&str> = grades
        .iter()
        .filter(|g| g.meets(&minimum))
        .map(|g| g.label())
        .collect();
    assert_eq!(kept, ["A*", "A"]);
    assert_eq!(RankGrade::from("N").ordinal(), RankGrade::from("").ordinal());
    assert!(!RankGrade::from("N").meets(&RankGrade::C));
}

#[test]
fn tbd_detection_is_tolerant() {
    assert_eq!(DateExpr::from_raw("TBD"), DateExpr::Tbd);
    assert_eq!(DateExpr::from_raw(" tbd "), DateExpr::Tbd);
    assert_eq!(
        DateExpr::from_raw("2025-01-01 10:00"),
        DateExpr::At("2025-01-01 10:00".to_string())
    );
}

#[test]
fn blank_or_missing_dates_are_not_tbd() {
    assert_eq!(DateExpr::from_raw("  "), DateExpr::At(String::new()));
    assert_eq!(DateExpr::from_optional(None), DateExpr::At(String::new()));
    assert_eq!(DateExpr::from_optional(Some("tbd")), DateExpr::Tbd);
}

#[test]
fn ccfddl_timeline_without_deadline_keeps_a_blank_date() {
    let payload = json!([{
        "title": "FSE",
        "sub": "SE",
        "confs": [{ "year": 2026, "id": "fse26", "timeline": [{ "comment": "Research track" }] }]
    }]);
    let parsed = parse_source(&payload).expect("ccfddl parse failed");
    let instance = &parsed.fragments[0].instances.as_ref().unwrap()[0];
    assert_eq!(instance.timeline[0].date, DateExpr::At(String::new()));
}

#[test]
fn rank_labels_ignore_case() {
    assert_eq!(RankGrade::from("a*"), RankGrade::AStar);
    assert_eq!(RankGrade::from(" a "), RankGrade::A);
    assert_eq!(RankGrade::from("b"), RankGrade::B);
    assert_eq!(RankGrade::from("n"), RankGrade::Unranked("n".into()));
}

#[test]
fn acceptance_titles_follow_known_aliases() {
    let payload = json!([
        { "title": "UbiComp", "accept_rates": [{ "year": 2025, "submitted": 400, "accepted": 90 }] },
        { "title": "ICSE", "accept_rates": [] }
    ]);
    let parsed = parse_source(&payload).expect("allacc parse failed");
    let titles: Vec<&str> = parsed.fragments.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["UbiComp/ISWC", "ICSE"]);
}

#[test]
fn series_keys_carry_the_category() {
    assert_eq!(series_key("FSE", "Software Engineering"), "FSE [Software Engineering]");
    assert_eq!(series_key("FSE", ""), "FSE");
}

#[test]
fn series_names_drop_publisher_prefixes() {
    assert_eq!(normalize_series_name("IEEE  S&P"), "S&P");
    assert_eq!(normalize_series_name("ACM CCS "), "CCS");
    assert_eq!(normalize_series_name("ACM"), "ACM");
}

#[test]
fn acceptance_statistics_render_rates() {
    let stats = crate::model::AcceptanceStatistics {
        submitted: 395,
        accepted: 100,
    };
    assert_eq!(stats.to_string(), "25.3% (100/395)");
    let empty = crate::model::AcceptanceStatistics {
        submitted: 0,
        accepted: 0,
    };
    assert_eq!(empty.rate(), None);
}
