use bf_fit::{ElementFit, FitError, LmConfig};
use bf_lattice::{Value, params};
use bf_sim::Machine;

const BEND_LINE: &str = r#"
sim_type = "Vector";
straight: drift, L = 1.0e-3;
bend: sbend, L = 1.0e-1, phi=1.0e-6, K=0;
foo: LINE = (straight, bend, straight);
"#;

const INITIAL: [f64; 6] = [1.0, 1e-3, 1.0, 1e-3, 1.0, 1e-3];
const EXPECTED: [f64; 6] = [1.10198417, 9.99684702e-4, 1.10201583, 1.00031530e-3, 1.0, 1.0e-3];
const EXPECT_K: f64 = 3e-3;

#[test]
fn sbend_strength_converges() {
    let mut machine = Machine::from_glps(BEND_LINE).unwrap();
    let bend = machine.find("bend")[0];

    let mut fit = ElementFit::new(
        &mut machine,
        bend,
        vec!["K".to_string()],
        INITIAL.to_vec(),
        EXPECTED.to_vec(),
    )
    .unwrap()
    .with_fixed(params([("L", 1.0e-1), ("phi", 1.0e-6)]));

    let result = fit.solve(&[0.0], &LmConfig::default()).unwrap();
    assert!(
        (result.x[0] - EXPECT_K).abs() < 5e-7,
        "fitted K = {}",
        result.x[0]
    );
    assert!(result.cost < 1e-15);

    let k = machine.element(bend).unwrap().param("K").cloned();
    assert_eq!(k, Some(Value::Number(result.x[0])));
}

#[test]
fn fit_leaves_other_elements_alone() {
    let mut machine = Machine::from_glps(BEND_LINE).unwrap();
    let before: Vec<_> = [0, 2]
        .iter()
        .map(|&i| machine.element(i).unwrap().clone())
        .collect();

    ElementFit::new(&mut machine, 1, vec!["K".into()], INITIAL.to_vec(), EXPECTED.to_vec())
        .unwrap()
        .solve(&[0.0], &LmConfig::default())
        .unwrap();

    for (i, element) in [0, 2].into_iter().zip(before) {
        assert_eq!(machine.element(i).unwrap(), &element);
    }
}

#[test]
fn failed_fit_restores_bend() {
    let mut machine = Machine::from_glps(BEND_LINE).unwrap();
    let bend = machine.find("bend")[0];
    let before = machine.element(bend).unwrap().clone();

    let config = LmConfig {
        max_iterations: 1,
        ftol: 0.0,
        xtol: 0.0,
        ..LmConfig::default()
    };
    let err = ElementFit::new(&mut machine, bend, vec!["K".into()], INITIAL.to_vec(), EXPECTED.to_vec())
        .unwrap()
        .solve(&[0.0], &config)
        .unwrap_err();

    assert!(matches!(err, FitError::ConvergenceFailed { .. }), "{err:?}");
    assert_eq!(machine.element(bend).unwrap(), &before);
}
