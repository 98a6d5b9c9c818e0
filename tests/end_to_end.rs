//! End-to-end scenarios and cross-stage invariants, run against the fixture
//! pattern library checked in at `tests/fixtures/patterns.json`.

use report_title_parser::pattern_library::JsonFilePatternSource;
use report_title_parser::{PatternLibrary, Pipeline};

fn library() -> PatternLibrary {
    let source = JsonFilePatternSource::new("tests/fixtures/patterns.json");
    PatternLibrary::load(&source).expect("fixture library should load")
}

#[test]
fn scenario_1_apac_ppe() {
    let lib = library();
    let out = Pipeline::new(&lib).run("APAC Personal Protective Equipment Market Analysis, 2024-2030");
    assert_eq!(out.extracted_date_range.as_deref(), Some("2024-2030"));
    assert_eq!(out.extracted_report_type, "Market Analysis");
    assert_eq!(out.extracted_regions, vec!["Asia-Pacific"]);
    assert_eq!(out.topic, "Personal Protective Equipment");
}

#[test]
fn scenario_2_carbon_black_market_for() {
    let lib = library();
    let out = Pipeline::new(&lib).run("Carbon Black Market For Textile Fibers Growth Report, 2020");
    assert_eq!(out.extracted_date_range.as_deref(), Some("2020"));
    assert_eq!(out.extracted_report_type, "Market Growth Report");
    assert!(out.extracted_regions.is_empty());
    assert_eq!(out.topic, "Carbon Black for Textile Fibers");
}

#[test]
fn scenario_3_sulfur_market_in() {
    let lib = library();
    let out = Pipeline::new(&lib).run("Sulfur, Arsine, and Mercury Remover Market in Oil & Gas Industry");
    assert!(out.extracted_date_range.is_none());
    assert_eq!(out.extracted_report_type, "Market Industry");
    assert!(out.extracted_regions.is_empty());
    assert_eq!(out.topic, "Sulfur, Arsine, and Mercury Remover in Oil & Gas");
}

#[test]
fn scenario_4_us_and_europe_digital_pathology() {
    let lib = library();
    let out = Pipeline::new(&lib).run("U.S. And Europe Digital Pathology Market Size, Share Report, 2030");
    assert_eq!(out.extracted_date_range.as_deref(), Some("2030"));
    assert_eq!(out.extracted_report_type, "Market Size Share Report");
    assert_eq!(out.extracted_regions, vec!["United States", "Europe"]);
    assert_eq!(out.topic, "Digital Pathology");
}

#[test]
fn scenario_5_directed_energy_weapons_acronym() {
    let lib = library();
    let out = Pipeline::new(&lib).run("Directed Energy Weapons Market Size, DEW Industry Report, 2025");
    assert_eq!(out.extracted_date_range.as_deref(), Some("2025"));
    assert_eq!(out.extracted_report_type, "Market Size Industry Report");
    assert_eq!(out.extracted_acronym.as_deref(), Some("DEW"));
    assert_eq!(out.topic, "Directed Energy Weapons (DEW)");
}

#[test]
fn scenario_6_battery_fuel_gauge_parenthetical_rescue() {
    let lib = library();
    let out = Pipeline::new(&lib).run("Battery Fuel Gauge Market (Forecast 2020-2030)");
    assert_eq!(out.extracted_date_range.as_deref(), Some("2020-2030"));
    assert_eq!(out.extracted_report_type, "Market Forecast");
    assert_eq!(out.topic, "Battery Fuel Gauge");
}

#[test]
fn scenario_7_hyphen_guard_blocks_delaware() {
    let lib = library();
    let out = Pipeline::new(&lib).run("De-identified Health Data Market Size, Industry Report, 2030");
    assert!(out.extracted_regions.is_empty());
    assert_eq!(out.extracted_report_type, "Market Size Industry Report");
    assert_eq!(out.topic, "De-identified Health Data");
}

#[test]
fn residual_freedom_holds_across_stages() {
    let lib = library();
    let out = Pipeline::new(&lib).run("U.S. And Europe Digital Pathology Market Size, Share Report, 2030");
    for region in &out.extracted_regions {
        assert!(!out.topic.contains(region.as_str()));
    }
    if let Some(date) = &out.extracted_date_range {
        assert!(!out.topic.contains(date.as_str()));
    }
    assert!(!out.topic.contains(out.extracted_report_type.as_str()) || out.extracted_report_type.is_empty());
}

#[test]
fn separator_purity_holds_for_report_type() {
    let lib = library();
    for title in [
        "Carbon Black Market For Textile Fibers Growth Report, 2020",
        "U.S. And Europe Digital Pathology Market Size, Share Report, 2030",
        "Directed Energy Weapons Market Size, DEW Industry Report, 2025",
    ] {
        let out = Pipeline::new(&lib).run(title);
        assert!(!out.extracted_report_type.contains('&'));
        assert!(!out.extracted_report_type.contains(','));
        assert!(!out
            .extracted_report_type
            .split_whitespace()
            .any(|w| w.eq_ignore_ascii_case("and")));
    }
}

#[test]
fn symbol_preservation_keeps_ampersand_in_topic() {
    let lib = library();
    let out = Pipeline::new(&lib).run("Sulfur, Arsine, and Mercury Remover Market in Oil & Gas Industry");
    assert!(out.topic.contains('&'));
}

#[test]
fn determinism_same_title_same_output() {
    let lib = library();
    let pipeline = Pipeline::new(&lib);
    let title = "APAC Personal Protective Equipment Market Analysis, 2024-2030";
    let a = pipeline.run(title);
    let b = pipeline.run(title);
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}

#[test]
fn non_expansion_holds_when_no_acronym_or_preserved_words() {
    let lib = library();
    let title = "APAC Personal Protective Equipment Market Analysis, 2024-2030";
    let out = Pipeline::new(&lib).run(title);
    assert!(out.topic.len() <= title.len());
}

#[test]
fn empty_title_produces_empty_not_an_error() {
    let lib = library();
    let out = Pipeline::new(&lib).run("");
    assert_eq!(out.topic, "");
    assert!(out.extracted_date_range.is_none());
    assert!(out.extracted_regions.is_empty());
}

#[test]
fn title_with_no_recognizable_content_falls_through_to_topic() {
    let lib = library();
    let out = Pipeline::new(&lib).run("A Completely Unrelated Sentence About Nothing In Particular");
    assert!(out.extracted_report_type.is_empty());
    assert!(!out.topic.is_empty());
}
