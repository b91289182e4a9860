//! Console rendering (human output only, not a machine interface)

use std::fmt::Write;

use crate::api::{PostAck, StatusResponse};
use crate::generator::SimulationProfile;
use crate::model::DerivedSensorReading;
use crate::scenario::{ConnectionReport, PollObservation, SendOutcome};

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

fn temperature_label(reading: &DerivedSensorReading) -> String {
    match reading.raw.temperature_c {
        Some(t) => format!("{t:.1}°C"),
        None => "n/a".to_string(),
    }
}

/// Bloc "SENSOR STATUS" façon Serial.println de l'Arduino
pub fn serial_status_block(reading: &DerivedSensorReading) -> String {
    let raw = &reading.raw;
    let alert = match reading.vibration_alert {
        Some(true) => "⚠️ Detected",
        Some(false) => "✅ Stable",
        None => "-",
    };

    let mut out = String::new();
    let _ = writeln!(out, "📊 SENSOR STATUS");
    let _ = writeln!(out, "--------------------------------");
    let _ = writeln!(out, "📏 Water Level Distance: {:.1} cm", raw.distance_cm);
    let _ = writeln!(
        out,
        "💧 Soil Moisture Raw: {} (0-1023) | Moisture: {:.1}%",
        raw.soil_moisture_raw, reading.moisture_percent
    );
    let _ = writeln!(out, "🌍 Vibration Raw Value: {} (0-1024) | Alert: {}", raw.vibration_raw, alert);
    let _ = writeln!(
        out,
        "🔄 Pump Status: {} | Moisture: {:.1}%",
        on_off(reading.pump_active),
        reading.moisture_percent
    );
    let _ = writeln!(out, "🌡️ Temperature: {}", temperature_label(reading));
    let _ = writeln!(out, "📋 SUMMARY DATA:");
    let _ = writeln!(
        out,
        "   Distance: {:.1}cm | Soil: {}/1023 | Moisture: {:.1}% | Vibration: {}/1024 | Pump: {} | Temp: {}",
        raw.distance_cm,
        raw.soil_moisture_raw,
        reading.moisture_percent,
        raw.vibration_raw,
        on_off(reading.pump_active),
        temperature_label(reading)
    );
    out.push_str("================================");
    out
}

/// Résumé court d'une lecture avant envoi
pub fn reading_summary(reading: &DerivedSensorReading) -> String {
    let raw = &reading.raw;
    let mut out = String::new();
    let _ = writeln!(out, "   📏 Distance: {:.1}cm", raw.distance_cm);
    let _ = writeln!(
        out,
        "   💧 Soil Moisture: {:.1}% (Raw: {}/1023)",
        reading.moisture_percent, raw.soil_moisture_raw
    );
    let _ = writeln!(out, "   🌍 Vibration: {}/1024", raw.vibration_raw);
    let _ = write!(out, "   🔄 Pump: {}", on_off(reading.pump_active));
    if raw.temperature_c.is_some() {
        let _ = write!(out, "\n   🌡️ Temperature: {}", temperature_label(reading));
    }
    out
}

/// `api-test` affiche le message du serveur, les autres profils la source de données
pub fn ack_line(ack: &PostAck, profile: SimulationProfile) -> String {
    let message = || ack.message.as_ref().map(|m| format!("✅ API Response: {m}"));
    let source = || ack.data_source.map(|s| format!("✅ Data accepted (data source: {s})"));

    let line = match profile {
        SimulationProfile::ApiTest => message().or_else(source),
        _ => source().or_else(message),
    };
    line.unwrap_or_else(|| "✅ API Response: Success".to_string())
}

pub fn send_outcome(outcome: &SendOutcome, profile: SimulationProfile) -> String {
    let mut out = format!("🔄 Sending reading #{}:\n{}\n", outcome.index + 1, reading_summary(&outcome.reading));
    match &outcome.result {
        Ok(ack) => out.push_str(&format!("   {}", ack_line(ack, profile))),
        Err(e) => out.push_str(&format!("   ❌ {e}")),
    }
    out
}

pub fn status_summary(status: &StatusResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "   🔌 Data Source: {}", status.data_source.to_string().to_uppercase());
    let _ = write!(
        out,
        "   📡 Arduino Connected: {}",
        if status.arduino_connected { "YES" } else { "NO" }
    );
    if let Some(last) = status.last_arduino_update {
        let _ = write!(out, "\n   ⏰ Last Arduino Update: {}", last.to_rfc3339());
    }
    if let (true, Some(data)) = (status.success, &status.data) {
        let _ = write!(
            out,
            "\n   📈 Current Data:\n      Earthquake: {} magnitude\n      Irrigation: {}% moisture\n      Flood: {}cm distance",
            data.earthquake.magnitude, data.irrigation.soil_moisture, data.flood.distance
        );
    }
    out
}

pub fn poll_observation(observation: &PollObservation) -> String {
    match &observation.result {
        Ok(status) => format!("📊 GET Request #{}:\n{}", observation.index + 1, status_summary(status)),
        Err(e) => format!("📊 GET Request #{}:\n   ❌ {e}", observation.index + 1),
    }
}

pub fn connection_summary(report: &ConnectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🏁 Connection scenario complete");
    let _ = writeln!(
        out,
        "- Sends accepted: {}/{}",
        report.send.accepted(),
        report.send.outcomes.len()
    );

    let transitions = report.poll.source_transitions();
    if transitions.is_empty() {
        let last = report
            .poll
            .last_source()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string());
        let _ = write!(out, "- No data source change observed (last: {last})");
    } else {
        let path: Vec<String> = transitions.iter().map(|(from, to)| format!("{from} → {to}")).collect();
        let _ = writeln!(out, "- Transitions: {}", path.join(", "));
        let _ = write!(
            out,
            "- Fallback to simulated data: {}",
            if report.poll.fell_back() { "YES" } else { "NO" }
        );
    }
    out
}
