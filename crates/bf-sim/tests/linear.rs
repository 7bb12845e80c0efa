use bf_config::{ElementDef, MachineDef, ParamDef};
use bf_core::{
    PhaseVector, Tolerances, TransferMatrix, matrix_from_row_major, nearly_equal, nulp_eq,
};
use bf_lattice::{Payload, Value, params};
use bf_sim::{Machine, SimError, SimType};
use std::collections::BTreeMap;

fn element(name: &str, type_name: &str, p: Vec<(&str, ParamDef)>) -> ElementDef {
    ElementDef {
        name: name.to_string(),
        type_name: type_name.to_string(),
        params: p
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn machine(sim_type: &str, elements: Vec<ElementDef>) -> Machine {
    Machine::from_def(MachineDef {
        sim_type: Some(sim_type.to_string()),
        elements,
    })
    .unwrap()
}

fn single_drift() -> Machine {
    machine(
        "Vector",
        vec![element("elem0", "drift", vec![("L", ParamDef::Number(1.0e-3))])],
    )
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            nearly_equal(*a, *e, Tolerances::default()),
            "{actual:?} != {expected:?}"
        );
    }
}

const CROSS: [f64; 36] = [
    1.0, 0.0, 1.0, 0.0, 1.0, 0.0, //
    0.0, 1.0, 0.0, 1.0, 0.0, 1.0, //
    1.0, 0.0, 1.0, 0.0, 1.0, 0.0, //
    0.0, 1.0, 0.0, 1.0, 0.0, 1.0, //
    1.0, 0.0, 1.0, 0.0, 1.0, 0.0, //
    0.0, 1.0, 0.0, 1.0, 0.0, 1.0, //
];

#[test]
fn describes_single_drift() {
    assert_eq!(
        single_drift().to_string(),
        "sim_type: Vector\n\
         #Elements: 1\n\
         Element 0: elem0 (drift)\n\
         Transfer: [6,6]((1,1,0,0,0,0),(0,1,0,0,0,0),(0,0,1,1,0,0),(0,0,0,1,0,0),(0,0,0,0,1,0),(0,0,0,0,0,1))\n"
    );
}

#[test]
fn describes_multi_element_without_transfer() {
    let m = machine(
        "TransferMatrix",
        vec![
            element("elem0", "drift", vec![("L", ParamDef::Number(1.0e-3))]),
            element("m", "marker", vec![]),
        ],
    );
    assert_eq!(
        m.to_string(),
        "sim_type: TransferMatrix\n#Elements: 2\nElement 0: elem0 (drift)\nElement 1: m (marker)\n"
    );
}

#[test]
fn drift_advances_position_and_cursor() {
    let m = single_drift();
    let state = m.alloc_state();
    assert_eq!(state.next_elem(), 0);

    state.set_values(&[1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();
    assert_eq!(m.propagate(&state, None).unwrap(), None);

    assert_eq!(state.next_elem(), 1);
    assert_close(&state.to_vec(), &[1.001, 1e-3, 0.0, 0.0, 0.0, 0.0]);

    // already at the end: nothing happens
    m.propagate(&state, None).unwrap();
    assert_close(&state.to_vec(), &[1.001, 1e-3, 0.0, 0.0, 0.0, 0.0]);

    state.set_next_elem(2);
    assert_eq!(state.next_elem(), 2);
    m.propagate(&state, None).unwrap();
    assert_eq!(state.next_elem(), 1);
    assert_close(&state.to_vec(), &[1.001, 1e-3, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn reconfigure_changes_later_propagation() {
    let mut m = single_drift();
    let state = m.alloc_state();

    for (length, expected) in [(None, 1.001), (Some(2.0e-3), 1.002), (Some(5.0e-3), 1.005)] {
        if let Some(length) = length {
            m.reconfigure(0, params([("L", length)])).unwrap();
        }
        state.set_values(&[1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();
        state.set_next_elem(0);
        m.propagate(&state, None).unwrap();
        assert_close(&state.to_vec(), &[expected, 1e-3, 0.0, 0.0, 0.0, 0.0]);
    }
}

#[test]
fn failed_reconfigure_rolls_back() {
    let mut m = single_drift();
    let before = m.lattice().clone();

    assert!(matches!(
        m.reconfigure(0, params([("L", "long")])),
        Err(SimError::Lattice(_))
    ));
    assert!(matches!(
        m.reconfigure(5, params([("L", 2.0e-3)])),
        Err(SimError::IndexOutOfRange { index: 5, len: 1 })
    ));
    assert_eq!(m.lattice(), &before);
}

#[test]
fn view_keeps_state_storage_alive() {
    let m = single_drift();
    let state = m.alloc_state();
    let view = state.view();
    let weak = state.downgrade();

    drop(state);
    assert!(weak.is_alive());

    drop(view);
    assert!(!weak.is_alive());
}

#[test]
fn view_aliases_state_payload() {
    let m = single_drift();
    let state = m.alloc_state();
    let view = state.view();
    view.set(&[1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();
    m.propagate(&state, None).unwrap();
    assert_close(&view.to_vec(), &[1.001, 1e-3, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn rejects_anything_but_a_state() {
    let m = single_drift();
    assert!(matches!(m.propagate_dyn(&(), None), Err(SimError::NotAState)));
    assert!(matches!(
        m.propagate_dyn(&"state", None),
        Err(SimError::NotAState)
    ));

    let state = m.alloc_state();
    m.propagate_dyn(&state, None).unwrap();
    assert_eq!(state.next_elem(), 1);
}

#[test]
fn rejects_state_from_other_machine() {
    let a = single_drift();
    let b = single_drift();
    let state = b.alloc_state();
    state.set_values(&[1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();

    assert!(matches!(
        a.propagate(&state, None),
        Err(SimError::ForeignState { .. })
    ));
    assert_eq!(state.next_elem(), 0);
    assert_eq!(state.to_vec(), vec![1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn matrix_mode_accumulates_two_drifts() {
    let m = machine(
        "TransferMatrix",
        vec![
            element("elem0", "drift", vec![("L", ParamDef::Number(1.0e-3))]),
            element("elem1", "drift", vec![("L", ParamDef::Number(1.0e-3))]),
        ],
    );
    let state = m.alloc_state();
    assert_eq!(state.matrix(), Some(TransferMatrix::identity()));

    m.propagate(&state, None).unwrap();

    let mut expected = TransferMatrix::identity();
    expected[(0, 1)] = 2.0;
    expected[(2, 3)] = 2.0;
    assert_close(state.matrix().unwrap().as_slice(), expected.as_slice());
}

#[test]
fn observe_returns_sorted_frozen_snapshots() {
    let m = Machine::from_glps(
        r#"
        sim_type = "Vector";
        L = 2.0e-3;
        elem0: drift, L = 2.0e-3;
        foo: LINE = (elem0*5);
        "#,
    )
    .unwrap();
    let state = m.alloc_state();
    state.set_values(&[0.0, 0.0, 1.0, 1e-3, 0.0, 0.0]).unwrap();

    let results = m
        .propagate(&state, Some(&[4, 0, 2, 1, 3, 2, 99]))
        .unwrap()
        .unwrap();

    let indices: Vec<usize> = results.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, [0, 1, 2, 3, 4]);
    for (i, snap) in &results {
        let y = 1.0 + 2e-3 * (*i as f64 + 1.0);
        assert_close(&snap.to_vec(), &[0.0, 0.0, y, 1e-3, 0.0, 0.0]);
        assert_eq!(snap.next_elem(), i + 1);
    }

    state.set_values(&[9.0; 6]).unwrap();
    assert_close(&results[0].1.to_vec(), &[0.0, 0.0, 1.002, 1e-3, 0.0, 0.0]);
}

#[test]
fn observe_with_nothing_applied_is_empty() {
    let m = single_drift();
    let state = m.alloc_state();
    state.set_next_elem(1);
    assert_eq!(m.propagate(&state, Some(&[0])).unwrap(), Some(vec![]));
}

#[test]
fn global_length_applies_to_all_drifts() {
    let m = Machine::from_glps(
        r#"
sim_type = "Vector";
L = 2.0e-3;
elem0: drift;
elem1: drift;
elem2: drift;
foo: LINE = (elem0, elem1, elem2);
"#,
    )
    .unwrap();
    let state = m.alloc_state();
    state.set_values(&[0.0, 0.0, 1.0, 1e-3, 0.0, 0.0]).unwrap();
    m.propagate(&state, None).unwrap();
    assert_close(&state.to_vec(), &[0.0, 0.0, 1.006, 1e-3, 0.0, 0.0]);
}

#[test]
fn extra_definitions_supply_mode_and_length() {
    let extra = params([("sim_type", Value::from("Vector")), ("L", Value::from(3.0e-3))]);
    let m = Machine::from_glps_with("d: drift; foo: LINE = (d, d);", &extra).unwrap();
    assert_eq!(m.sim_type(), SimType::Vector);

    let state = m.alloc_state();
    state.set_values(&[1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();
    m.propagate(&state, None).unwrap();
    assert_close(&state.to_vec(), &[1.006, 1e-3, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn generic_transfer_is_used_verbatim() {
    let m = machine(
        "TransferMatrix",
        vec![element("elem0", "generic", vec![("transfer", ParamDef::Array(CROSS.to_vec()))])],
    );
    let state = m.alloc_state();
    m.propagate(&state, None).unwrap();
    assert_eq!(state.matrix(), Some(matrix_from_row_major(&CROSS).unwrap()));
}

#[test]
fn generic_accepts_nested_rows() {
    let rows: Vec<Vec<f64>> = CROSS.chunks(6).map(<[f64]>::to_vec).collect();
    let m = machine(
        "TransferMatrix",
        vec![element("elem0", "generic", vec![("transfer", ParamDef::Rows(rows))])],
    );
    let state = m.alloc_state();
    m.propagate(&state, None).unwrap();
    assert_eq!(state.to_vec(), CROSS.to_vec());
}

#[test]
fn source_replaces_vector() {
    let initial = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
    let m = machine(
        "Vector",
        vec![element("elem0", "source", vec![("initial", ParamDef::Array(initial.clone()))])],
    );
    let state = m.alloc_state();
    state.set_values(&[5.0; 6]).unwrap();
    m.propagate(&state, None).unwrap();
    assert_eq!(state.vector(), Some(PhaseVector::from_column_slice(&initial)));
}

#[test]
fn source_replaces_matrix() {
    let m = machine(
        "TransferMatrix",
        vec![element("elem0", "source", vec![("initial", ParamDef::Array(CROSS.to_vec()))])],
    );
    let state = m.alloc_state();
    m.propagate(&state, None).unwrap();
    assert_eq!(state.payload(), Payload::Matrix(matrix_from_row_major(&CROSS).unwrap()));
}

const BEND_LINE: &str = r#"
sim_type = "Vector";
straight: drift, L = 1.0e-3;
bend: sbend, L = 1.0e-1, phi=1.0e-6, K=0;
foo: LINE = (straight, bend, straight);
"#;

#[test]
fn sbend_strength_gives_expected_state() {
    let mut m = Machine::from_glps(BEND_LINE).unwrap();
    let state = m.alloc_state();
    state.set_values(&[1.0, 1e-3, 1.0, 1e-3, 1.0, 1e-3]).unwrap();

    m.reconfigure(1, params([("L", 1.0e-1), ("phi", 1.0e-6), ("K", 3e-3)]))
        .unwrap();
    m.propagate(&state, None).unwrap();

    let expected = [1.10198417, 9.99684702e-4, 1.10201583, 1.00031530e-3, 1.0, 1.0e-3];
    for (a, e) in state.to_vec().iter().zip(expected) {
        assert!(nulp_eq(*a, e, 1.0e8), "{a} != {e}");
    }
}

#[test]
fn states_propagate_concurrently() {
    let m = Machine::from_glps(BEND_LINE).unwrap();
    let states: Vec<_> = (0..4).map(|_| m.alloc_state()).collect();
    std::thread::scope(|s| {
        for (i, state) in states.iter().enumerate() {
            let m = &m;
            s.spawn(move || {
                state.set_values(&[i as f64, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();
                m.propagate(state, None).unwrap();
            });
        }
    });
    for state in &states {
        assert_eq!(state.next_elem(), 3);
    }
}

#[test]
fn machine_kind_matches_config() {
    assert_eq!(single_drift().sim_type(), SimType::Vector);
}
