//! Text form of the settings file.
//!
//! Five lines in a fixed order, each `<name> <sep> <value>`:
//!
//! ```text
//! hvacMode = 0
//! fanMode = 0
//! heatTemp = 74.00
//! coolTemp = 70.00
//! offsetVal = 0.00
//! ```
//!
//! Reading is positional: names and separators are not checked, only the
//! token count and the values. Blank lines are skipped and anything after the
//! fifth line is ignored.

use crate::error::{StorageError, StorageResult};
use thermo_core::{FanMode, HvacMode, ThermostatSettings};

/// Names written for each line, in file order.
pub const KEYS: [&str; 5] = ["hvacMode", "fanMode", "heatTemp", "coolTemp", "offsetVal"];

/// Render `settings` in file form. Temperatures keep two decimals.
pub fn render(settings: &ThermostatSettings) -> String {
    format!(
        "{} = {}\n{} = {}\n{} = {:.2}\n{} = {:.2}\n{} = {:.2}\n",
        KEYS[0],
        settings.hvac_mode.code(),
        KEYS[1],
        settings.fan_mode.code(),
        KEYS[2],
        settings.heat_setpoint,
        KEYS[3],
        settings.cool_setpoint,
        KEYS[4],
        settings.calibration_offset,
    )
}

/// Parse the file form. All-or-nothing.
///
/// # Errors
///
/// Returns `StorageError::Parse` naming the first offending line.
pub fn parse(text: &str) -> StorageResult<ThermostatSettings> {
    let end = text.lines().count() + 1;
    let mut values = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| value_token(index + 1, line));

    let mut next = |key: &str| {
        values
            .next()
            .unwrap_or_else(|| Err(StorageError::parse(end, format!("missing {key} line"))))
    };

    let (line, token) = next(KEYS[0])?;
    let hvac_mode = HvacMode::from_code(parse_code(line, token)?)
        .map_err(|e| StorageError::parse(line, e.to_string()))?;

    let (line, token) = next(KEYS[1])?;
    let fan_mode = FanMode::from_code(parse_code(line, token)?)
        .map_err(|e| StorageError::parse(line, e.to_string()))?;

    let (line, token) = next(KEYS[2])?;
    let heat_setpoint = parse_float(line, token)?;
    let (line, token) = next(KEYS[3])?;
    let cool_setpoint = parse_float(line, token)?;
    let (line, token) = next(KEYS[4])?;
    let calibration_offset = parse_float(line, token)?;

    Ok(ThermostatSettings {
        hvac_mode,
        fan_mode,
        heat_setpoint,
        cool_setpoint,
        calibration_offset,
    })
}

fn value_token(line: usize, text: &str) -> StorageResult<(usize, &str)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [_name, _sep, value] => Ok((line, value)),
        _ => Err(StorageError::parse(
            line,
            format!("expected `<name> <sep> <value>`, got {:?}", text.trim()),
        )),
    }
}

fn parse_code(line: usize, token: &str) -> StorageResult<u8> {
    token
        .parse()
        .map_err(|_| StorageError::parse(line, format!("expected a mode code, got {token:?}")))
}

fn parse_float(line: usize, token: &str) -> StorageResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StorageError::parse(line, format!("expected a number, got {token:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        assert_eq!(
            render(&ThermostatSettings::default()),
            "hvacMode = 0\nfanMode = 0\nheatTemp = 74.00\ncoolTemp = 70.00\noffsetVal = 0.00\n"
        );
    }

    #[test]
    fn test_parse_ignores_names_and_separators() {
        let settings = parse("a : 1\nb : 1\nc : 65.5\nd : 78\ne : -1.25\n").unwrap();

        assert_eq!(settings.hvac_mode, HvacMode::Heat);
        assert_eq!(settings.fan_mode, FanMode::Auto);
        assert_eq!(settings.heat_setpoint, 65.5);
        assert_eq!(settings.cool_setpoint, 78.0);
        assert_eq!(settings.calibration_offset, -1.25);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_trailing_content() {
        let text = "\nhvacMode = 2\n\nfanMode = 1\nheatTemp = 74.00\ncoolTemp = 70.00\noffsetVal = 0.0\n# extra\n";
        let settings = parse(text).unwrap();
        assert_eq!(settings.hvac_mode, HvacMode::Off);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "hvacMode = 0\nfanMode = 0\nheatTemp = warm\n";
        match parse(text) {
            Err(StorageError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
