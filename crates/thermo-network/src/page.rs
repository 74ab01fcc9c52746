//! HTML rendering of the current state and the settings form.

use thermo_core::{FanMode, HvacMode, StateSnapshot};

/// Render the status page with the form prefilled from `snapshot`.
///
/// `message` is shown above the form, escaped.
pub fn render(snapshot: &StateSnapshot, message: Option<&str>) -> String {
    let s = &snapshot.settings;
    let a = &snapshot.actuators;

    let temperature = match snapshot.adjusted_temperature() {
        Some(t) => format!("{t:.2}&deg;F, {:.1}% RH", snapshot.sample.raw_humidity),
        None => "sensor not ready".to_string(),
    };
    let status = if snapshot.ready { "ready" } else { "warming up" };
    let level = |on: bool| if on { "on" } else { "off" };
    let selected = |yes: bool| if yes { " selected" } else { "" };
    let notice = message
        .map(|m| format!("<p class=\"notice\">{}</p>\n", escape(m)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Thermostat</title></head>
<body>
<h1>Thermostat</h1>
{notice}<table>
<tr><th>Temperature</th><td>{temperature}</td></tr>
<tr><th>Status</th><td>{status}</td></tr>
<tr><th>Mode</th><td>{mode}</td></tr>
<tr><th>Fan</th><td>{fan}</td></tr>
<tr><th>Heater</th><td>{heater}</td></tr>
<tr><th>Compressor</th><td>{compressor}</td></tr>
<tr><th>Blower</th><td>{blower}</td></tr>
</table>
<form method="post" action="/">
<label>Mode <select name="hvacmode">
<option value="ac"{ac}>AC</option>
<option value="heat"{heat}>Heat</option>
<option value="off"{off}>Off</option>
</select></label>
<label>Fan <select name="fanmode">
<option value="on"{fan_on}>On</option>
<option value="auto"{fan_auto}>Auto</option>
</select></label>
<label>Heat to <input name="hightemp" value="{heat_setpoint:.2}"></label>
<label>Cool to <input name="cooltemp" value="{cool_setpoint:.2}"></label>
<label>Offset <input name="offsetvalue" value="{offset:.2}"></label>
<button type="submit">Save</button>
</form>
</body>
</html>
"#,
        mode = s.hvac_mode,
        fan = s.fan_mode,
        heater = level(a.heater_on),
        compressor = level(a.compressor_on),
        blower = level(a.blower_on),
        ac = selected(s.hvac_mode == HvacMode::Ac),
        heat = selected(s.hvac_mode == HvacMode::Heat),
        off = selected(s.hvac_mode == HvacMode::Off),
        fan_on = selected(s.fan_mode == FanMode::On),
        fan_auto = selected(s.fan_mode == FanMode::Auto),
        heat_setpoint = s.heat_setpoint,
        cool_setpoint = s.cool_setpoint,
        offset = s.calibration_offset,
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
