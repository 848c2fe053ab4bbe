//! Documents returned by the SnapRoute REST API.
//!
//! Keys missing from a document decode to zero values, the same way the
//! device's own clients treat sparse objects.

use serde::Deserialize;

/// Operational state value of a port that is carrying traffic.
pub const OPER_STATE_UP: &str = "UP";

/// Response of `GET state/Ports`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortsDocument {
    #[serde(rename = "Objects")]
    pub objects: Vec<PortObject>,
}

/// One entry of the port listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortObject {
    #[serde(rename = "ObjectId")]
    pub object_id: String,

    #[serde(rename = "Object")]
    pub object: PortState,
}

/// Counters and state of a single physical port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortState {
    /// Interface reference, e.g. `fpPort1`
    #[serde(rename = "IntfRef")]
    pub intf_ref: String,

    /// Interface index used as the history key
    #[serde(rename = "IfIndex")]
    pub if_index: i64,

    #[serde(rename = "OperState")]
    pub oper_state: String,

    #[serde(rename = "IfInDiscards")]
    pub if_in_discards: i64,

    #[serde(rename = "IfOutDiscards")]
    pub if_out_discards: i64,

    #[serde(rename = "IfEtherPkts")]
    pub if_ether_pkts: i64,

    #[serde(rename = "IfEtherMCPkts")]
    pub if_ether_mc_pkts: i64,

    #[serde(rename = "IfEtherBcastPkts")]
    pub if_ether_bcast_pkts: i64,

    #[serde(rename = "IfInOctets")]
    pub if_in_octets: i64,

    #[serde(rename = "IfOutOctets")]
    pub if_out_octets: i64,
}

impl PortState {
    pub fn is_up(&self) -> bool {
        self.oper_state == OPER_STATE_UP
    }
}

/// Response of `GET state/SystemStatus`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusDocument {
    #[serde(rename = "ObjectId")]
    pub object_id: String,

    #[serde(rename = "Object")]
    pub object: SystemStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    #[serde(rename = "Ready")]
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_document_parse() {
        let body = r#"{
            "Objects": [{
                "ObjectId": "7b9f2c1e",
                "Object": {
                    "IntfRef": "fpPort1",
                    "IfIndex": 1,
                    "OperState": "UP",
                    "IfInDiscards": 3,
                    "IfOutDiscards": 4,
                    "IfEtherPkts": 1000,
                    "IfEtherMCPkts": 20,
                    "IfEtherBcastPkts": 5,
                    "IfInOctets": 64000,
                    "IfOutOctets": 72000
                }
            }]
        }"#;

        let doc: PortsDocument = serde_json::from_str(body).unwrap();
        assert_eq!(doc.objects.len(), 1);

        let port = &doc.objects[0].object;
        assert_eq!(doc.objects[0].object_id, "7b9f2c1e");
        assert_eq!(port.intf_ref, "fpPort1");
        assert!(port.is_up());
        assert_eq!(port.if_ether_mc_pkts, 20);
        assert_eq!(port.if_ether_bcast_pkts, 5);
        assert_eq!(port.if_out_octets, 72000);
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let body = r#"{"Objects": [{"Object": {"IntfRef": "fpPort2", "OperState": "DOWN"}}]}"#;
        let doc: PortsDocument = serde_json::from_str(body).unwrap();

        let port = &doc.objects[0].object;
        assert!(!port.is_up());
        assert_eq!(port.if_index, 0);
        assert_eq!(port.if_in_octets, 0);

        let doc: PortsDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.objects.is_empty());
    }

    #[test]
    fn test_status_document_parse() {
        let doc: StatusDocument =
            serde_json::from_str(r#"{"ObjectId": "s1", "Object": {"Ready": true}}"#).unwrap();
        assert!(doc.object.ready);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<PortsDocument>(r#"{"Objects": 5}"#).is_err());
        assert!(serde_json::from_str::<StatusDocument>(r#"{"Object": {"Ready": "yes"}}"#).is_err());
        assert!(serde_json::from_str::<PortsDocument>("<html>").is_err());
    }
}
