//! PCB design data model.
//!
//! These types mirror the JSON schema shared with the editor front-end:
//! camelCase field names, positions as `[x, y]` pairs, and string-keyed
//! component kinds. Everything is serde round-trippable so a `Design` can move
//! between the store, the engine, and the UI without loss.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::geometry::Point;

/// Severity of a validation issue. Ordered `Info < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The kind of defect an issue reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnconnectedNet,
    ShortCircuit,
    ClearanceViolation,
    BoardEdge,
    MissingComponent,
    InvalidConnection,
}

impl IssueKind {
    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::UnconnectedNet => "unconnected_net",
            IssueKind::ShortCircuit => "short_circuit",
            IssueKind::ClearanceViolation => "clearance_violation",
            IssueKind::BoardEdge => "board_edge",
            IssueKind::MissingComponent => "missing_component",
            IssueKind::InvalidConnection => "invalid_connection",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component kind. Unknown kinds are preserved as `Other` so third-party
/// designs round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Resistor,
    Led,
    Button,
    Battery,
    Header,
    Mcu,
    Other(String),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Resistor => "resistor",
            ComponentKind::Led => "led",
            ComponentKind::Button => "button",
            ComponentKind::Battery => "battery",
            ComponentKind::Header => "header",
            ComponentKind::Mcu => "mcu",
            ComponentKind::Other(s) => s,
        }
    }
}

impl From<String> for ComponentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "resistor" => ComponentKind::Resistor,
            "led" => ComponentKind::Led,
            "button" => ComponentKind::Button,
            "battery" => ComponentKind::Battery,
            "header" => ComponentKind::Header,
            "mcu" => ComponentKind::Mcu,
            _ => ComponentKind::Other(s),
        }
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of valid pin names for a component kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinSet {
    /// A fixed list of named pins.
    Named(&'static [&'static str]),
    /// Pins `"1"` through `"n"`.
    Numbered(u32),
    /// Any pin name resolves. Used for unknown kinds, which carry no pinout
    /// the engine could check against.
    Any,
}

impl PinSet {
    pub fn contains(&self, pin: &str) -> bool {
        match self {
            PinSet::Named(names) => names.contains(&pin),
            PinSet::Numbered(n) => pin
                .parse::<u32>()
                .map(|p| p >= 1 && p <= *n)
                .unwrap_or(false),
            PinSet::Any => true,
        }
    }
}

const MCU_PINS: &[&str] = &[
    "vcc", "gnd", "rst", "gpio0", "gpio1", "gpio2", "gpio3", "gpio4", "gpio5", "gpio6",
    "gpio7",
];

/// Largest pin count a `header` component is allowed to declare.
const MAX_HEADER_PINS: u32 = 64;

/// A typed property value: either a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.parse().ok(),
        }
    }
}

/// A named component property with an optional unit (e.g. resistance in ohms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A placed (or not yet placed) part on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            properties: BTreeMap::new(),
            position: None,
            rotation: None,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: PropertyValue,
        unit: Option<&str>,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            Property {
                name,
                value,
                unit: unit.map(|u| u.to_string()),
            },
        );
        self
    }

    /// The pin names this component exposes, determined by its kind.
    ///
    /// Headers read their pin count from the `pins` property (default 2).
    pub fn pin_set(&self) -> PinSet {
        match &self.kind {
            ComponentKind::Resistor | ComponentKind::Button => PinSet::Numbered(2),
            ComponentKind::Led => PinSet::Named(&["anode", "cathode"]),
            ComponentKind::Battery => PinSet::Named(&["+", "-"]),
            ComponentKind::Header => {
                let count = self
                    .properties
                    .get("pins")
                    .and_then(|p| p.value.as_number())
                    .map(|n| n as u32)
                    .unwrap_or(2);
                PinSet::Numbered(count.clamp(1, MAX_HEADER_PINS))
            }
            ComponentKind::Mcu => PinSet::Named(MCU_PINS),
            ComponentKind::Other(_) => PinSet::Any,
        }
    }
}

/// One electrical node: an ordered list of `"componentId.pinName"` references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub id: String,
    #[serde(rename = "connectionIds", default)]
    pub connection_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Net {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connection_ids: Vec::new(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn add_connection(&mut self, component_id: &str, pin: &str) {
        self.connection_ids.push(format!("{}.{}", component_id, pin));
    }

    /// Display name for messages: the optional `name`, falling back to `id`.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

fn default_layers() -> u32 {
    1
}

/// The board itself: outline polygon, parts, and nets.
///
/// An empty outline means "not drawn yet" and is valid; a non-empty outline
/// needs at least 3 vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub outline: Vec<Point>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub nets: Vec<Net>,
    #[serde(default = "default_layers")]
    pub layers: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            outline: Vec::new(),
            components: Vec::new(),
            nets: Vec::new(),
            layers: default_layers(),
        }
    }
}

impl Board {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn net(&self, id: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.id == id)
    }
}

/// Where on the board an issue points. The JSON form is the original untagged
/// object shape (`{"component_id", "pin"}`, `{"net_id"}`, or `{"x", "y"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueLocation {
    Pin { component_id: String, pin: String },
    Net { net_id: String },
    Point { x: f64, y: f64 },
}

/// A single validation finding.
///
/// `id` is deterministic: the same defect produces the same id on every run,
/// so UI state keyed by issue id survives a re-validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    #[serde(rename = "relatedIds")]
    pub related_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<IssueLocation>,
}

/// A complete design project: one board plus the issues from the last
/// validation run. Issues are replaced wholesale on every run, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub id: String,
    pub name: String,
    pub board: Board,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Design {
    /// A fresh, empty design with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            board: Board::default(),
            issues: Vec::new(),
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

/// Filter an externally received issue list down to well-formed entries.
///
/// Entries missing required fields or carrying an out-of-enum `type` or
/// `severity` are dropped; a malformed entry never fails the whole batch.
pub fn validate_issues(raw: serde_json::Value) -> Vec<Issue> {
    let serde_json::Value::Array(entries) = raw else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_kind_roundtrip() {
        for name in ["resistor", "led", "button", "battery", "header", "mcu"] {
            let kind = ComponentKind::from(name.to_string());
            assert!(!matches!(kind, ComponentKind::Other(_)), "{name}");
            assert_eq!(kind.as_str(), name);
        }
        let other = ComponentKind::from("relay".to_string());
        assert_eq!(other, ComponentKind::Other("relay".to_string()));
        assert_eq!(String::from(other), "relay");
    }

    #[test]
    fn test_pin_sets() {
        let r = Component::new("R1", ComponentKind::Resistor);
        assert!(r.pin_set().contains("1"));
        assert!(r.pin_set().contains("2"));
        assert!(!r.pin_set().contains("3"));
        assert!(!r.pin_set().contains("anode"));

        let led = Component::new("LED1", ComponentKind::Led);
        assert!(led.pin_set().contains("anode"));
        assert!(led.pin_set().contains("cathode"));
        assert!(!led.pin_set().contains("cathode2"));

        let bat = Component::new("BT1", ComponentKind::Battery);
        assert!(bat.pin_set().contains("+"));
        assert!(bat.pin_set().contains("-"));

        let mcu = Component::new("U1", ComponentKind::Mcu);
        assert!(mcu.pin_set().contains("vcc"));
        assert!(mcu.pin_set().contains("gpio7"));
        assert!(!mcu.pin_set().contains("gpio8"));

        // Unknown kinds have no pinout to check against
        let relay = Component::new("K1", ComponentKind::Other("relay".into()));
        assert!(relay.pin_set().contains("coil_a"));
    }

    #[test]
    fn test_header_pin_count_from_property() {
        let hdr = Component::new("J1", ComponentKind::Header).with_property(
            "pins",
            PropertyValue::Number(6.0),
            None,
        );
        assert!(hdr.pin_set().contains("6"));
        assert!(!hdr.pin_set().contains("7"));
        assert!(!hdr.pin_set().contains("0"));

        let default_hdr = Component::new("J2", ComponentKind::Header);
        assert!(default_hdr.pin_set().contains("2"));
        assert!(!default_hdr.pin_set().contains("3"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_component_wire_format() {
        let c = Component::new("R1", ComponentKind::Resistor).with_position(1.0, 2.0);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "resistor");
        assert_eq!(json["position"], serde_json::json!([1.0, 2.0]));
    }

    #[test]
    fn test_net_wire_format() {
        let mut net = Net::new("N1").with_name("VCC");
        net.add_connection("R1", "1");
        net.add_connection("LED1", "anode");
        let json = serde_json::to_value(&net).unwrap();
        assert_eq!(json["connectionIds"], serde_json::json!(["R1.1", "LED1.anode"]));
        assert_eq!(net.label(), "VCC");
        assert_eq!(Net::new("N2").label(), "N2");
    }

    #[test]
    fn test_issue_location_shapes() {
        let pin: IssueLocation =
            serde_json::from_value(serde_json::json!({"component_id": "R1", "pin": "1"}))
                .unwrap();
        assert_eq!(
            pin,
            IssueLocation::Pin { component_id: "R1".into(), pin: "1".into() }
        );

        let net: IssueLocation =
            serde_json::from_value(serde_json::json!({"net_id": "N1"})).unwrap();
        assert_eq!(net, IssueLocation::Net { net_id: "N1".into() });

        let point: IssueLocation =
            serde_json::from_value(serde_json::json!({"x": 1.5, "y": 2.0})).unwrap();
        assert_eq!(point, IssueLocation::Point { x: 1.5, y: 2.0 });
    }

    #[test]
    fn test_validate_issues_filters_malformed() {
        let raw = serde_json::json!([
            {
                "id": "a", "type": "short_circuit", "severity": "error",
                "message": "ok", "relatedIds": ["N1", "N2"]
            },
            // Out-of-enum type
            {
                "id": "b", "type": "mystery", "severity": "error",
                "message": "bad", "relatedIds": []
            },
            // Out-of-enum severity
            {
                "id": "c", "type": "board_edge", "severity": "fatal",
                "message": "bad", "relatedIds": []
            },
            // Missing relatedIds
            { "id": "d", "type": "board_edge", "severity": "info", "message": "bad" },
            "not an object"
        ]);
        let issues = validate_issues(raw);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "a");

        assert!(validate_issues(serde_json::json!({"not": "an array"})).is_empty());
    }

    #[test]
    fn test_design_roundtrip() {
        let mut design = Design::new("blinky");
        design.board.components.push(Component::new("R1", ComponentKind::Resistor));
        let json = serde_json::to_string(&design).unwrap();
        let back: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(back, design);
    }

    #[test]
    fn test_board_defaults() {
        let board: Board = serde_json::from_str("{}").unwrap();
        assert_eq!(board.layers, 1);
        assert!(board.outline.is_empty());
        assert!(board.components.is_empty());
    }
}
