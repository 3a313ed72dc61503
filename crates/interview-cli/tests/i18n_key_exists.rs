use std::collections::BTreeMap;

#[test]
fn cli_i18n_keys_exist_in_root_en_catalog() {
    let root_en = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("i18n/en.json");
    let raw = std::fs::read_to_string(&root_en).expect("read root i18n/en.json");
    let catalog: BTreeMap<String, String> = serde_json::from_str(&raw).expect("parse en.json");

    let required = [
        "cli.error.record_not_found",
        "cli.error.stdin_closed",
        "cli.prompt.invalid_choice",
        "cli.prompt.select_number",
        "cli.prompt.select_numbers",
        "cli.records.empty",
        "cli.records.status.complete",
        "cli.records.status.exit",
        "cli.records.status.pending",
        "cli.records.status.question",
        "cli.run.choose_button",
        "cli.run.complete",
        "cli.run.record",
        "cli.run.rejected",
        "cli.validate.invalid",
        "cli.validate.ok_empty",
        "cli.validate.ok_value",
        "cli.validate.valid",
    ];

    for key in required {
        assert!(catalog.contains_key(key), "missing i18n key {key}");
    }
}

#[test]
fn overlay_keys_are_known_in_english() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("i18n");
    let read = |name: &str| -> BTreeMap<String, String> {
        let raw = std::fs::read_to_string(dir.join(name)).expect("read locale file");
        serde_json::from_str(&raw).expect("parse locale file")
    };
    let en = read("en.json");
    let nl = read("nl.json");
    for (key, value) in &nl {
        let english = en.get(key).unwrap_or_else(|| panic!("nl key {key} missing in en"));
        assert_eq!(
            english.matches("{}").count(),
            value.matches("{}").count(),
            "placeholder count differs for {key}"
        );
    }
}
