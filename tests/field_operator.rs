//! Evaluation of the built-in field operator catalogue.

use chrono::NaiveDate;
use pathways::{Catalogue, CompetencyCode, Evaluator, Ledger, Roster, Status};

fn evaluator() -> Evaluator {
    Catalogue::builtin().unwrap().compile().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 7, 1)
}

fn ledger(entries: &[(&str, NaiveDate)]) -> Ledger {
    entries
        .iter()
        .map(|&(code, date)| (CompetencyCode::try_from(code).unwrap(), date))
        .collect()
}

/// Everything needed for the foundation certification, all current.
fn foundation_codes() -> Vec<(&'static str, NaiveDate)> {
    vec![
        ("BEA002", date(2020, 2, 1)),
        ("COC003E", date(2023, 2, 1)),
        ("FRA001", date(2020, 2, 1)),
        ("JRI001", date(2020, 2, 1)),
        ("IJR001", date(2020, 2, 1)),
        ("HLTAID011", date(2023, 2, 1)),
        ("PUAOPE013A", date(2020, 3, 1)),
        ("BEF002", date(2020, 3, 1)),
        ("AIP002", date(2020, 3, 1)),
    ]
}

fn with(extra: &[(&'static str, NaiveDate)]) -> Ledger {
    let mut entries = foundation_codes();
    entries.extend_from_slice(extra);
    ledger(&entries)
}

#[test]
fn builtin_catalogue_compiles() {
    let evaluator = evaluator();
    assert!(evaluator.table().len() > 20);
    assert!(evaluator.graph().len() > 15);
    assert!(evaluator.graph().depth() >= 4);
}

/// Certifications with no inputs yet, which every member is assumed to hold.
const UNTRACKED: [&str; 6] = [
    "fieldCoreSkills",
    "boatFitness",
    "landBasedFitness",
    "inWaterFitness",
    "verticalRescueFitness",
    "landSearchOpenFitness",
];

#[test]
fn empty_ledger_holds_nothing_but_untracked_skills() {
    let report = evaluator().evaluate(&Ledger::new(), today());

    for (name, status) in report.iter() {
        let expected = if UNTRACKED.contains(&name.as_str()) {
            Status::Current
        } else {
            Status::None
        };
        assert_eq!(status, expected, "{name}");
    }
}

#[test]
fn foundation_and_storm_ground() {
    let report = evaluator().evaluate(&with(&[("SDG003C", date(2021, 1, 1))]), today());

    assert_eq!(report.get("jobReady"), Some(Status::Current));
    assert_eq!(report.get("foundation"), Some(Status::Current));
    assert_eq!(report.get("stormGroundOperator"), Some(Status::Current));
    assert_eq!(report.get("stormHeightsOperator"), Some(Status::None));
}

#[test]
fn combined_storm_course_certifies_both_tiers() {
    let report = evaluator().evaluate(&with(&[("SDC001", date(2021, 1, 1))]), today());

    assert_eq!(report.get("stormGround"), Some(Status::Current));
    assert_eq!(report.get("stormHeights"), Some(Status::Current));
    assert_eq!(report.get("stormHeightsOperator"), Some(Status::Current));
}

#[test]
fn expired_first_aid_caps_every_operator() {
    let mut entries = foundation_codes();
    entries.retain(|(code, _)| *code != "HLTAID011");
    entries.push(("HLTAID003", date(2019, 1, 1)));
    entries.push(("SDC001", date(2021, 1, 1)));
    entries.push(("PUASAR022A", date(2021, 1, 1)));
    entries.push(("USC001", date(2021, 1, 1)));
    let report = evaluator().evaluate(&ledger(&entries), today());

    assert_eq!(report.get("firstAid"), Some(Status::Expired));
    assert_eq!(report.get("jobReady"), Some(Status::Current));
    assert_eq!(report.get("foundation"), Some(Status::Expired));
    assert_eq!(report.get("stormGroundOperator"), Some(Status::Expired));
    assert_eq!(report.get("stormHeightsOperator"), Some(Status::Expired));
    assert_eq!(report.get("usarOperator"), Some(Status::Expired));
    assert_eq!(report.get("landSearchSuburban"), Some(Status::Current));
}

#[test]
fn missing_foundation_item_caps_dependents_at_none() {
    let mut entries = foundation_codes();
    entries.retain(|(code, _)| *code != "AIP002");
    entries.push(("SDC001", date(2021, 1, 1)));
    let report = evaluator().evaluate(&ledger(&entries), today());

    assert_eq!(report.get("stormGround"), Some(Status::Current));
    assert_eq!(report.get("foundation"), Some(Status::None));
    assert_eq!(report.get("stormGroundOperator"), Some(Status::None));
    assert_eq!(report.get("stormHeightsOperator"), Some(Status::None));
}

#[test]
fn chainsaw_accepts_any_prerequisite_route() {
    for route in ["SDG003C", "PRC001", "LSC002"] {
        let report = evaluator().evaluate(
            &with(&[(route, date(2022, 1, 1)), ("CSC001", date(2022, 2, 1))]),
            today(),
        );
        assert_eq!(report.get("chainsawL1"), Some(Status::Current), "{route}");
        assert_eq!(report.get("chainsawL2"), Some(Status::None), "{route}");
    }
}

#[test]
fn rigorous_fitness_test_satisfies_lighter_tiers() {
    let report = evaluator().evaluate(&ledger(&[("FIT003", date(2024, 1, 10))]), today());
    assert_eq!(report.get("arduousFitness"), Some(Status::Current));
    assert_eq!(report.get("moderateFitness"), Some(Status::Current));
    assert_eq!(report.get("lightFitness"), Some(Status::Current));

    let report = evaluator().evaluate(&ledger(&[("FIT001", date(2024, 1, 10))]), today());
    assert_eq!(report.get("arduousFitness"), Some(Status::None));
    assert_eq!(report.get("moderateFitness"), Some(Status::None));
    assert_eq!(report.get("lightFitness"), Some(Status::Current));
}

#[test]
fn flood_rescue_tiers_chain_through_land_based() {
    let report = evaluator().evaluate(
        &with(&[
            ("PUASAR022A", date(2021, 1, 1)),
            ("PUASAR033", date(2021, 1, 1)),
            ("IRB001", date(2021, 1, 1)),
            ("FR3001", date(2021, 1, 1)),
        ]),
        today(),
    );

    assert_eq!(report.get("landBasedOperator"), Some(Status::Current));
    assert_eq!(report.get("onWaterOperator"), Some(Status::Current));
    assert_eq!(report.get("inWaterOperator"), Some(Status::Current));
    assert_eq!(report.get("boatOperator"), Some(Status::Current));

    // Without the land-based course neither water tier is held.
    let report = evaluator().evaluate(
        &with(&[
            ("PUASAR022A", date(2021, 1, 1)),
            ("IRB001", date(2021, 1, 1)),
            ("FR3001", date(2021, 1, 1)),
        ]),
        today(),
    );
    assert_eq!(report.get("boatOperator"), Some(Status::Current));
    assert_eq!(report.get("onWaterOperator"), Some(Status::None));
    assert_eq!(report.get("inWaterOperator"), Some(Status::None));
}

#[test]
fn operators_need_no_fitness_assessment() {
    let achieved = date(2023, 2, 1);
    let report = evaluator().evaluate(
        &with(&[
            ("IRB001", achieved),
            ("PUASAR022A", achieved),
            ("PUASAR033", achieved),
            ("VRC001", achieved),
            ("LSC001", achieved),
        ]),
        today(),
    );

    for name in [
        "foundation",
        "boatOperator",
        "landBasedOperator",
        "onWaterOperator",
        "verticalRescueOperator",
        "verticalRescueFitness",
        "landSearchOpen",
    ] {
        assert_eq!(report.get(name), Some(Status::Current), "{name}");
    }
    assert_eq!(report.get("lightFitness"), Some(Status::None));
}

#[test]
fn first_aid_lapses_on_its_anniversary() {
    let mut entries = foundation_codes();
    entries.retain(|(code, _)| *code != "HLTAID011");

    entries.push(("HLTAID011", date(2021, 7, 2)));
    let report = evaluator().evaluate(&ledger(&entries), today());
    assert_eq!(report.get("firstAid"), Some(Status::Current));
    assert_eq!(report.get("foundation"), Some(Status::Current));

    entries.pop();
    entries.push(("HLTAID011", date(2021, 7, 1)));
    let report = evaluator().evaluate(&ledger(&entries), today());
    assert_eq!(report.get("firstAid"), Some(Status::Expired));
    assert_eq!(report.get("foundation"), Some(Status::Expired));
}

#[test]
fn adding_evidence_never_lowers_a_status() {
    let evaluator = evaluator();
    let base = with(&[("HLTAID003", date(2010, 1, 1))]);
    let before = evaluator.evaluate(&base, today());

    let codes: Vec<String> = evaluator
        .table()
        .iter()
        .flat_map(|(_, equivalency)| equivalency.aliases().iter().map(ToString::to_string))
        .collect();

    for code in codes {
        for achieved in [date(2010, 1, 1), date(2024, 6, 1)] {
            let mut raised = base.clone();
            raised.record(CompetencyCode::try_from(code.as_str()).unwrap(), achieved);
            let after = evaluator.evaluate(&raised, today());

            for (name, status) in before.iter() {
                assert!(
                    after.get(name).unwrap() >= status,
                    "adding {code} lowered {name}"
                );
            }
        }
    }
}

#[test]
fn unrecognised_codes_are_ignored() {
    let evaluator = evaluator();
    let plain = with(&[]);
    let noisy = with(&[
        ("ZZZ999", date(2023, 1, 1)),
        ("PUATEA001", date(2023, 1, 1)),
        ("PUA-30613", date(2023, 1, 1)),
    ]);

    assert_eq!(
        evaluator.evaluate(&plain, today()),
        evaluator.evaluate(&noisy, today())
    );

    let unrecognised: Vec<_> = evaluator
        .table()
        .unrecognised_codes(&noisy)
        .map(|code| code.as_str())
        .collect();
    assert_eq!(unrecognised, ["PUA-30613", "PUATEA001", "ZZZ999"]);
}

#[test]
fn later_course_issues_must_be_listed() {
    let evaluator = evaluator();
    let ledger = ledger(&[("SFC004", date(2024, 1, 1))]);

    assert_eq!(
        evaluator.resolve("firstAid", &ledger, today()),
        Some(Status::None)
    );
    assert_eq!(
        evaluator
            .table()
            .unrecognised_codes(&ledger)
            .map(|code| code.as_str())
            .collect::<Vec<_>>(),
        ["SFC004"]
    );
}

#[test]
fn reports_are_identical_across_calls() {
    let evaluator = evaluator();
    let ledger = with(&[("SDC001", date(2021, 1, 1))]);

    let first = serde_json::to_string(&evaluator.evaluate(&ledger, today())).unwrap();
    let second = serde_json::to_string(&evaluator.evaluate(&ledger, today())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn roster_members_evaluate_independently() {
    let roster = Roster::from_yaml_str(
        r#"
- id: "1"
  name: Storm Ground Only
  competencies:
    - code: sdg003c
      date: 2021-01-01
- id: "2"
  name: Nobody
- id: "3"
  name: Legacy Records
  competencies:
    - code: SDC001
      date: 2021-01-01
    - code: PUA-30613
      date: 2019-06-01
"#,
    )
    .unwrap();

    let evaluator = evaluator();
    let reports: Vec<_> = roster
        .members()
        .iter()
        .map(|member| evaluator.evaluate(&member.ledger, today()))
        .collect();

    assert_eq!(reports[0].get("stormGround"), Some(Status::Current));
    assert_eq!(reports[1].get("stormGround"), Some(Status::None));
    assert_eq!(reports[2].get("stormHeights"), Some(Status::Current));

    let legacy = &roster.members()[2].ledger;
    assert_eq!(
        evaluator
            .table()
            .unrecognised_codes(legacy)
            .map(|code| code.as_str())
            .collect::<Vec<_>>(),
        ["PUA-30613"]
    );
}
