//! Checks on the shipped config files.

use std::path::PathBuf;

use dominion_tools::simulate::{run_game, SimulationOptions};
use dominion_tools::validate::{validate_config_file, validate_data_directory};

fn configs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/configs")
}

#[test]
fn test_shipped_configs_are_valid() {
    let report = validate_data_directory(&configs_dir()).unwrap();
    assert!(report.is_ok(), "invalid configs: {:?}", report.invalid);
    assert!(report.valid.len() >= 3);
}

#[test]
fn test_shipped_configs_play() {
    let options = SimulationOptions {
        max_turns: 8,
        ..SimulationOptions::default()
    };
    for name in ["standard.ron", "four_player.ron", "quick.ron"] {
        let config = validate_config_file(&configs_dir().join(name)).unwrap();
        let players = config.players;
        let summary = run_game(config, &options).unwrap();
        assert_eq!(summary.players, players, "{name}");
    }
}
