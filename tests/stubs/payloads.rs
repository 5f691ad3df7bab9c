#![allow(dead_code)]
// Each test binary uses a different subset of these

pub const GENERATION_1: &str = "2024-03-01T11:00:00Z";
pub const GENERATION_2: &str = "2024-03-01T12:00:00Z";

pub const BACNET_CONFIG: &str = r#"
{
    "generation": "2024-03-01T12:00:00Z",
    "scan_interval_sec": 600,
    "scan_duration_sec": 60,
    "enumerate": "entries"
}
"#;

pub const OLD_BACNET_CONFIG: &str = r#"
{
    "generation": "2024-03-01T11:00:00Z",
    "scan_interval_sec": 600,
    "scan_duration_sec": 60
}
"#;

pub const INVALID_DURATION_CONFIG: &str = r#"
{
    "generation": "2024-03-01T12:00:00Z",
    "scan_interval_sec": 60,
    "scan_duration_sec": 120
}
"#;

pub const PASSIVE_CONFIG: &str = r#"
{
    "generation": "2024-03-01T12:00:00Z",
    "passive_sec": 30
}
"#;

pub const HUGE_PASSIVE_CONFIG: &str = r#"
{
    "generation": "2024-03-01T12:00:00Z",
    "passive_sec": 18446744073709551615
}
"#;

pub const BACNET_RESULT: &str = r#"
{
    "scan_addr": "28179023",
    "families": {
        "ipv4": {"addr": "192.168.1.20"}
    },
    "refs": {
        "AI:1": {"point": "zone_temp", "units": "Degrees-Celsius", "possible_values": ["on", "off"]}
    }
}
"#;

pub const RESULT_WITHOUT_ADDR: &str = r#"
{
    "families": {"ipv4": {"addr": "192.168.1.21"}}
}
"#;

pub const ENUMERATION_TREE: &str = r#"
{
    "timestamp": "2024-03-01T12:00:00Z",
    "version": "1.5.1",
    "scan_addr": "28179023",
    "families": {"ipv4": {"addr": "192.168.1.20"}},
    "registries": {
        "ZZ-TRI-FECTA": {"devices": {"AHU-1": {"num_id": "2625324262579600"}}}
    },
    "refs": {
        "AI:1": {"point": "zone_temp", "units": "Degrees-Celsius", "ancillary": {"present_value": 21.5}}
    },
    "features": {
        "enumeration.pointset": {"stage": "beta", "score": 8}
    },
    "system": {"serial_no": "A-113"}
}
"#;

pub const POINTSET_WITH_ERRORS: &str = r#"
{
    "missing": ["zone_temp"],
    "extra": ["filter_alarm"]
}
"#;
