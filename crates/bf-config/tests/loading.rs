use bf_config::{
    ConfigError, MachineConfig, SimType, load_glps, load_glps_with, load_json_str, load_path,
    load_yaml_str, save_json, save_yaml, to_glps,
};
use bf_lattice::{ElementKind, Params, Value, params};

const OBSERVE: &str = r#"
sim_type = "Vector";
L = 2.0e-3;
elem0: drift, L = 2.0e-3;
foo: LINE = (elem0*5);
"#;

const GLOBAL: &str = r#"
sim_type = "Vector";
L = 2.0e-3;
elem0: drift;
elem1: drift;
elem2: drift;
foo: LINE = (elem0, elem1, elem2);
"#;

const OPTIMIZE: &str = r#"
sim_type = "Vector";
straight: drift, L = 1.0e-3;
bend: sbend, L = 1.0e-1, phi=1.0e-6, K=0;
foo: LINE = (straight, bend, straight);
"#;

#[test]
fn repeated_element_line() {
    let config = load_glps(OBSERVE).unwrap();
    assert_eq!(config.sim_type, SimType::Vector);
    assert_eq!(config.elements.len(), 5);
    assert!(config.elements.iter().all(|e| e.name == "elem0"));
    config.build_lattice().unwrap();
}

#[test]
fn global_length_reaches_every_drift() {
    let config = load_glps(GLOBAL).unwrap();
    let lattice = config.build_lattice().unwrap();
    for element in lattice.iter() {
        assert_eq!(element.param("L"), Some(&Value::Number(2.0e-3)));
        assert!((element.transfer()[(2, 3)] - 2.0).abs() < 1e-12);
    }
}

#[test]
fn sbend_line_builds() {
    let config = load_glps(OPTIMIZE).unwrap();
    let kinds: Vec<ElementKind> = config.elements.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [ElementKind::Drift, ElementKind::SBend, ElementKind::Drift]
    );
    assert_eq!(config.elements[1].params["K"], Value::Number(0.0));
    config.build_lattice().unwrap();
}

#[test]
fn extra_definitions_are_visible() {
    let extra = params([("L", 7.0e-3)]);
    let config = load_glps_with(
        "sim_type = \"Vector\"; d: drift; l: LINE = (d);",
        &extra,
    )
    .unwrap();
    assert_eq!(config.elements[0].params["L"], Value::Number(7.0e-3));
}

#[test]
fn structured_and_textual_forms_agree() {
    let yaml = "
sim_type: Vector
elements:
  - name: straight
    type: drift
    L: 1.0e-3
  - name: bend
    type: sbend
    L: 1.0e-1
    phi: 1.0e-6
    K: 0
  - name: straight
    type: drift
    L: 1.0e-3
";
    let from_yaml = load_yaml_str(yaml).unwrap();
    let from_glps = load_glps(OPTIMIZE).unwrap();
    assert_eq!(from_yaml, from_glps);

    let json = r#"{"sim_type": "Vector", "elements": [
        {"name": "straight", "type": "drift", "L": 1.0e-3},
        {"name": "bend", "type": "sbend", "L": 1.0e-1, "phi": 1.0e-6, "K": 0},
        {"name": "straight", "type": "drift", "L": 1.0e-3}
    ]}"#;
    assert_eq!(load_json_str(json).unwrap(), from_glps);
}

#[test]
fn print_then_parse_round_trip() {
    for source in [OBSERVE, GLOBAL, OPTIMIZE] {
        let config = load_glps(source).unwrap();
        let text = to_glps(&config).unwrap();
        assert_eq!(load_glps(&text).unwrap(), config, "{text}");
    }
}

#[test]
fn file_loading_by_extension() {
    let config = load_glps(OPTIMIZE).unwrap();
    let dir = std::env::temp_dir();

    let yaml_path = dir.join("bf_config_roundtrip.yaml");
    save_yaml(&yaml_path, &config).unwrap();
    assert_eq!(load_path(&yaml_path, &Params::new()).unwrap(), config);

    let json_path = dir.join("bf_config_roundtrip.json");
    save_json(&json_path, &config).unwrap();
    assert_eq!(load_path(&json_path, &Params::new()).unwrap(), config);

    let glps_path = dir.join("bf_config_roundtrip.lat");
    std::fs::write(&glps_path, to_glps(&config).unwrap()).unwrap();
    assert_eq!(load_path(&glps_path, &Params::new()).unwrap(), config);
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("bf_config_does_not_exist.lat");
    assert!(matches!(
        load_path(&path, &Params::new()),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn syntax_error_reports_line_and_column() {
    let err = load_glps("sim_type = \"Vector\";\nd: drift, L = ;\n").unwrap_err();
    match err {
        ConfigError::Syntax { pos, .. } => {
            assert_eq!(pos.line, 2);
            assert_eq!(pos.col, 15);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn invalid_parameter_surfaces_when_building() {
    let config: MachineConfig = load_glps(
        "sim_type = \"Vector\"; b: sbend, L = 0.1; l: LINE = (b);",
    )
    .unwrap();
    assert!(matches!(
        config.build_lattice(),
        Err(ConfigError::Lattice(_))
    ));
}
