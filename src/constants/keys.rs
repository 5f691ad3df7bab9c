use crate::discovery::FamilyKey;

// Key prefixes in the persistent store
pub const DISCOVERY_PFX: &str = "discovery/";
pub const VALIDATION_PFX: &str = "validation/";

/// Escape an id so it never contains the `/` key separator.
fn segment(id: &str) -> String {
    id.replace('%', "%25").replace('/', "%2F")
}

pub fn scan(key: &FamilyKey) -> String {
    format!("{}{}", device_scans(&key.device_id), segment(&key.family))
}

/// Prefix shared by every scan of one device, and only that device.
pub fn device_scans(device_id: &str) -> String {
    format!("{DISCOVERY_PFX}{}/", segment(device_id))
}

pub fn site(site_id: &str) -> String {
    format!("{VALIDATION_PFX}{}", segment(site_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_are_readable() {
        assert_eq!(scan(&FamilyKey::new("AHU-1", "bacnet")), "discovery/AHU-1/bacnet");
        assert_eq!(site("ZZ-TRI-FECTA"), "validation/ZZ-TRI-FECTA");
    }

    #[test]
    fn separators_are_escaped() {
        let left = scan(&FamilyKey::new("A/B", "c"));
        let right = scan(&FamilyKey::new("A", "B/c"));
        assert_ne!(left, right);
        assert_eq!(left, "discovery/A%2FB/c");
        assert!(!right.starts_with(&device_scans("A/B")));
        assert!(!left.starts_with(&device_scans("A")));
        // an id that already looks escaped stays distinct
        assert_ne!(scan(&FamilyKey::new("A%2FB", "c")), left);
    }
}
