use std::path::Path;

use bf_config::{SimType, load_path};
use bf_lattice::Params;

#[test]
fn demos_load_and_build() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let demos = [
        ("bend_fit.lat", SimType::Vector, 3),
        ("fodo.lat", SimType::TransferMatrix, 18),
        ("two_drifts.yaml", SimType::TransferMatrix, 2),
    ];

    for (name, sim_type, len) in demos {
        let path = root.join(name);
        let config = load_path(&path, &Params::new())
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        assert_eq!(config.sim_type, sim_type, "{name}");
        assert_eq!(config.elements.len(), len, "{name}");
        config
            .build_lattice()
            .unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
    }
}
