//! Integration tests for `SettingsStore` against real files.

use proptest::prelude::*;
use rstest::rstest;
use tempfile::TempDir;
use thermo_core::{FanMode, HvacMode, ThermostatSettings};
use thermo_storage::{SettingsStore, StorageError};

fn store_in(dir: &TempDir) -> SettingsStore {
    SettingsStore::new(dir.path().join("config.ini"))
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let settings = ThermostatSettings {
        hvac_mode: HvacMode::Heat,
        fan_mode: FanMode::Auto,
        heat_setpoint: 68.25,
        cool_setpoint: 77.5,
        calibration_offset: -2.0,
    };

    store.save(&settings).await.unwrap();

    assert_eq!(store.load().await.unwrap(), settings);
    let text = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(
        text,
        "hvacMode = 1\nfanMode = 1\nheatTemp = 68.25\ncoolTemp = 77.50\noffsetVal = -2.00\n"
    );
    assert!(!dir.path().join("config.ini.tmp").exists());
}

#[tokio::test]
async fn test_save_rounds_to_two_decimals() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .save(&ThermostatSettings {
            heat_setpoint: 72.128,
            ..ThermostatSettings::default()
        })
        .await
        .unwrap();

    assert_eq!(store.load().await.unwrap().heat_setpoint, 72.13);
}

#[tokio::test]
async fn test_load_original_file_format() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        "hvacMode = 2\nfanMode = 1\nheatTemp = 74.00\ncoolTemp = 70.00\noffsetVal = 0.0\n",
    )
    .unwrap();

    let settings = store.load().await.unwrap();
    assert_eq!(settings.hvac_mode, HvacMode::Off);
    assert_eq!(settings.fan_mode, FanMode::Auto);
    assert_eq!(settings.calibration_offset, 0.0);
}

#[tokio::test]
async fn test_load_or_init_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let settings = store.load_or_init().await;

    assert_eq!(settings, ThermostatSettings::default());
    assert_eq!(store.load().await.unwrap(), ThermostatSettings::default());
}

#[tokio::test]
async fn test_load_or_init_leaves_malformed_file_alone() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "hvacMode = 9\n").unwrap();

    let settings = store.load_or_init().await;

    assert_eq!(settings, ThermostatSettings::default());
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "hvacMode = 9\n");
}

#[tokio::test]
async fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = store_in(&dir).load().await;

    assert!(result.as_ref().is_err_and(StorageError::is_not_found));
}

#[tokio::test]
async fn test_save_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::new(dir.path().join("nope").join("config.ini"));

    let result = store.save(&ThermostatSettings::default()).await;
    assert!(matches!(result, Err(StorageError::Io(_))));
}

#[rstest]
#[case::empty("")]
#[case::truncated("hvacMode = 0\nfanMode = 0\nheatTemp = 74.00\n")]
#[case::bad_mode_code("hvacMode = 3\nfanMode = 0\nheatTemp = 74\ncoolTemp = 70\noffsetVal = 0\n")]
#[case::bad_fan_code("hvacMode = 0\nfanMode = 2\nheatTemp = 74\ncoolTemp = 70\noffsetVal = 0\n")]
#[case::non_numeric("hvacMode = 0\nfanMode = 0\nheatTemp = 74\ncoolTemp = cold\noffsetVal = 0\n")]
#[case::not_finite("hvacMode = 0\nfanMode = 0\nheatTemp = NaN\ncoolTemp = 70\noffsetVal = 0\n")]
#[case::missing_separator("hvacMode 0\nfanMode = 0\nheatTemp = 74\ncoolTemp = 70\noffsetVal = 0\n")]
#[case::glued("hvacMode=0\nfanMode=0\nheatTemp=74\ncoolTemp=70\noffsetVal=0\n")]
#[tokio::test]
async fn test_malformed_files_rejected(#[case] contents: &str) {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), contents).unwrap();

    let result = store.load().await;
    assert!(matches!(result, Err(StorageError::Parse { .. })), "{result:?}");
}

fn cents() -> impl Strategy<Value = f64> {
    (-20_000i32..20_000).prop_map(|c| f64::from(c) / 100.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: two-decimal settings survive a save/load round trip exactly.
    #[test]
    fn prop_round_trip(
        mode in 0u8..3,
        fan in 0u8..2,
        heat in cents(),
        cool in cents(),
        offset in cents(),
    ) {
        let settings = ThermostatSettings {
            hvac_mode: HvacMode::from_code(mode).unwrap(),
            fan_mode: FanMode::from_code(fan).unwrap(),
            heat_setpoint: heat,
            cool_setpoint: cool,
            calibration_offset: offset,
        };

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let loaded = rt.block_on(async {
            let dir = TempDir::new().unwrap();
            let store = store_in(&dir);
            store.save(&settings).await.unwrap();
            store.load().await.unwrap()
        });

        prop_assert_eq!(loaded, settings);
    }
}
