//! Resource Locator
//!
//! Splits resource strings such as
//! `//compute.googleapis.com/projects/p/zones/us-east1-b/instances/vm-1`
//! into their project, zone and collection components.

use super::error::ParseError;

const PROJECTS: &str = "projects";
const ZONES: &str = "zones";
const INSTANCES: &str = "instances";
const DISKS: &str = "disks";
const MACHINE_TYPES: &str = "machineTypes";
const SNAPSHOTS: &str = "snapshots";

const COLLECTIONS: &[&str] = &[INSTANCES, DISKS, MACHINE_TYPES, SNAPSHOTS];

/// Parsed components of a resource string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLocator {
    resource: String,
    project: Option<String>,
    zone: Option<String>,
    collection: Option<String>,
    name: Option<String>,
}

impl ResourceLocator {
    /// Parse a resource string. Never fails; missing parts are reported by
    /// the accessors.
    ///
    /// Segments are read positionally: the zone is looked up after the
    /// project value, and the collection is the last collection keyword
    /// followed by a name. A project or zone named like a keyword is
    /// therefore never mistaken for one.
    pub fn parse(resource: &str) -> Self {
        let segments: Vec<&str> = resource.split('/').collect();

        let mut locator = Self {
            resource: resource.to_string(),
            ..Self::default()
        };

        let mut cursor = 0;
        if let Some((idx, project)) = value_after(&segments, 0, PROJECTS) {
            locator.project = Some(project);
            cursor = idx + 1;
        }
        if let Some((idx, zone)) = value_after(&segments, cursor, ZONES) {
            locator.zone = Some(zone);
            cursor = idx + 1;
        }

        let collection = (cursor..segments.len()).rev().find_map(|i| {
            let key = COLLECTIONS.iter().find(|c| **c == segments[i])?;
            let name = segments.get(i + 1).filter(|s| !s.is_empty())?;
            Some((*key, *name))
        });
        if let Some((key, name)) = collection {
            locator.collection = Some(key.to_string());
            locator.name = Some(name.to_string());
        }

        locator
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn project(&self) -> Result<&str, ParseError> {
        self.require(self.project.as_deref(), PROJECTS)
    }

    pub fn zone(&self) -> Result<&str, ParseError> {
        self.require(self.zone.as_deref(), ZONES)
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Instance name; requires an `instances` segment
    pub fn instance(&self) -> Result<&str, ParseError> {
        self.named(INSTANCES)
    }

    /// Disk name; requires a `disks` segment
    pub fn disk(&self) -> Result<&str, ParseError> {
        self.named(DISKS)
    }

    /// Project, zone and instance name together
    pub fn zonal_instance(&self) -> Result<ZonalName, ParseError> {
        Ok(ZonalName {
            project: self.project()?.to_string(),
            zone: self.zone()?.to_string(),
            name: self.instance()?.to_string(),
        })
    }

    /// Project, zone and disk name together
    pub fn zonal_disk(&self) -> Result<ZonalName, ParseError> {
        Ok(ZonalName {
            project: self.project()?.to_string(),
            zone: self.zone()?.to_string(),
            name: self.disk()?.to_string(),
        })
    }

    fn named(&self, collection: &'static str) -> Result<&str, ParseError> {
        match (self.collection.as_deref(), self.name.as_deref()) {
            (Some(c), Some(name)) if c == collection => Ok(name),
            _ => Err(self.missing(collection)),
        }
    }

    fn require<'a>(&self, part: Option<&'a str>, segment: &'static str) -> Result<&'a str, ParseError> {
        part.ok_or_else(|| self.missing(segment))
    }

    fn missing(&self, segment: &'static str) -> ParseError {
        ParseError::MissingSegment {
            segment,
            resource: self.resource.clone(),
        }
    }
}

/// A zonal Compute Engine resource address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonalName {
    pub project: String,
    pub zone: String,
    pub name: String,
}

impl std::fmt::Display for ZonalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "projects/{}/zones/{}/{}", self.project, self.zone, self.name)
    }
}

/// Short machine type name from a value such as
/// `zones/us-central1-a/machineTypes/e2-medium`. A bare name is returned as is.
pub fn machine_type_name(value: &str) -> Result<&str, ParseError> {
    if !value.contains('/') {
        if value.is_empty() {
            return Err(ParseError::MachineType(value.to_string()));
        }
        return Ok(value);
    }

    let segments: Vec<&str> = value.split('/').collect();
    segments
        .iter()
        .position(|s| *s == MACHINE_TYPES)
        .and_then(|i| segments.get(i + 1))
        .filter(|name| !name.is_empty())
        .copied()
        .ok_or_else(|| ParseError::MachineType(value.to_string()))
}

/// Index and value of the segment following the first `key` at or after
/// `start`, if non-empty
fn value_after(segments: &[&str], start: usize, key: &str) -> Option<(usize, String)> {
    let idx = start + segments.get(start..)?.iter().position(|s| *s == key)?;
    segments
        .get(idx + 1)
        .filter(|s| !s.is_empty())
        .map(|s| (idx + 1, s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instance() {
        let loc = ResourceLocator::parse(
            "//compute.googleapis.com/projects/rightsizer-test/zones/us-east1-b/instances/alicja-test",
        );
        assert_eq!(loc.project().unwrap(), "rightsizer-test");
        assert_eq!(loc.zone().unwrap(), "us-east1-b");
        assert_eq!(loc.collection(), Some("instances"));
        assert_eq!(loc.instance().unwrap(), "alicja-test");
        assert!(loc.disk().is_err());
    }

    #[test]
    fn test_parse_relative_disk() {
        let loc = ResourceLocator::parse("projects/p1/zones/europe-west1-d/disks/data");
        let disk = loc.zonal_disk().unwrap();
        assert_eq!(disk.project, "p1");
        assert_eq!(disk.zone, "europe-west1-d");
        assert_eq!(disk.name, "data");
        assert_eq!(disk.to_string(), "projects/p1/zones/europe-west1-d/data");
    }

    #[test]
    fn test_global_snapshot_has_no_zone() {
        let loc = ResourceLocator::parse(
            "//compute.googleapis.com/projects/p1/global/snapshots/$snapshot-name",
        );
        assert_eq!(loc.project().unwrap(), "p1");
        assert_eq!(
            loc.zone(),
            Err(ParseError::MissingSegment {
                segment: "zones",
                resource: loc.resource().to_string(),
            })
        );
    }

    #[test]
    fn test_segments_are_case_sensitive() {
        let loc = ResourceLocator::parse("//compute.googleapis.com/Projects/p/Zones/z/Instances/i");
        assert!(loc.project().is_err());
        assert!(loc.zone().is_err());
        assert!(loc.instance().is_err());
    }

    #[test]
    fn test_trailing_segment_without_value() {
        let loc = ResourceLocator::parse("projects/p/zones/");
        assert!(loc.zone().is_err());
    }

    #[test]
    fn test_keyword_named_project() {
        let loc = ResourceLocator::parse(
            "//compute.googleapis.com/projects/instances/zones/us-east1-b/disks/data-1",
        );
        let disk = loc.zonal_disk().unwrap();
        assert_eq!(disk.project, "instances");
        assert_eq!(disk.zone, "us-east1-b");
        assert_eq!(disk.name, "data-1");
        assert!(loc.instance().is_err());

        let loc = ResourceLocator::parse("projects/zones/zones/z1/instances/snapshots");
        assert_eq!(loc.project().unwrap(), "zones");
        assert_eq!(loc.zone().unwrap(), "z1");
        assert_eq!(loc.instance().unwrap(), "snapshots");
    }

    #[test]
    fn test_keyword_named_zone() {
        let loc = ResourceLocator::parse("projects/p/zones/disks/instances/vm-1");
        assert_eq!(loc.zone().unwrap(), "disks");
        assert_eq!(loc.instance().unwrap(), "vm-1");
    }

    #[test]
    fn test_machine_type_name() {
        assert_eq!(
            machine_type_name("zones/us-central1-a/machineTypes/e2-medium").unwrap(),
            "e2-medium"
        );
        assert_eq!(
            machine_type_name(
                "https://www.googleapis.com/compute/v1/projects/p/zones/z/machineTypes/n1-standard-4"
            )
            .unwrap(),
            "n1-standard-4"
        );
        assert_eq!(machine_type_name("custom-2-5120").unwrap(), "custom-2-5120");
        assert!(machine_type_name("zones/us-central1-a").is_err());
        assert!(machine_type_name("").is_err());
    }
}
