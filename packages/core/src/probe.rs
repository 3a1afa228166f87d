//! Best-effort diagnostics for a single field.

use serde::Serialize;
use serde_json::Value as Json;

use crate::{CheckerDoc, CodecDoc, Interface, Result};

/// What happened when a value was pushed through a field and read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub interface: String,
    pub name: String,
    pub codec: Option<CodecDoc>,
    pub checker: Option<CheckerDoc>,
    pub value: Json,
    pub encoded: Option<String>,
    pub decoded: Option<Json>,
    /// Whether the decoded value equals the value written.
    pub matched: bool,
    pub error: Option<String>,
}

/// Write `value` to field `name` through the keyed surface, then read back
/// the raw encoded string and the decoded value.
///
/// Never fails: any error is recorded in the report and steps after it are
/// skipped.
pub fn probe(iface: &Interface, name: &str, value: Json) -> ProbeReport {
    let mut report = ProbeReport {
        interface: iface.name().to_string(),
        name: name.to_string(),
        codec: None,
        checker: None,
        value,
        encoded: None,
        decoded: None,
        matched: false,
        error: None,
    };

    if let Err(e) = run(iface, &mut report) {
        report.error = Some(e.to_string());
    }

    match &report.error {
        None => log::info!(
            "probe {}.{}: encoded {:?}, matched {}",
            report.interface,
            report.name,
            report.encoded,
            report.matched
        ),
        Some(e) => log::warn!("probe {}.{} failed: {}", report.interface, report.name, e),
    }
    report
}

fn run(iface: &Interface, report: &mut ProbeReport) -> Result<()> {
    let field = iface.field_member(&report.name)?;
    let doc = field.doc();
    report.codec = doc.codec;
    report.checker = doc.checker;

    iface.set(&report.name, report.value.clone())?;
    report.encoded = iface.get_raw(&report.name)?;
    report.decoded = field.read_json(iface)?;
    report.matched = report.decoded.as_ref() == Some(&report.value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, IntegerRange, ParseCodec, Schema};
    use serde_json::json;

    fn iface() -> Interface {
        let port = Field::new("Port", ParseCodec::<i64>::new())
            .with_checker(IntegerRange::new(Some(0), Some(65535)));
        let schema = Schema::builder("Net").field("port", &port).build().unwrap();
        Interface::new(&schema)
    }

    #[test]
    fn successful_probe_reports_round_trip() {
        let report = probe(&iface(), "port", json!(8080));
        assert_eq!(report.error, None);
        assert_eq!(report.encoded.as_deref(), Some("8080"));
        assert_eq!(report.decoded, Some(json!(8080)));
        assert!(report.matched);
        assert_eq!(report.checker.unwrap().kind, "IntegerRange");
    }

    #[test]
    fn failures_are_reported_not_raised() {
        let iface = iface();
        let report = probe(&iface, "port", json!(70000));
        assert!(report.error.is_some());
        assert!(!report.matched);
        assert_eq!(report.encoded, None);
        assert_eq!(iface.get_raw("port").unwrap(), None);

        let report = probe(&iface, "missing", json!(1));
        assert!(report.error.unwrap().contains("missing"));
        assert_eq!(report.codec, None);
    }
}
