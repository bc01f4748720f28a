//! Property-based tests using proptest
//!
//! These tests exercise resource parsing, test-condition matching and name
//! validation with randomized inputs.

use proptest::prelude::*;
use recapply::recommendation::dispatch::Action;
use recapply::recommendation::locator::{machine_type_name, ResourceLocator};
use recapply::recommendation::matcher::{compile_anchored, TestCondition};
use recapply::recommendation::model::ValueMatcher;
use serde_json::json;

/// Compute Engine style resource name
fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,30}[a-z0-9]".prop_filter("collection keyword", |s| {
        !["projects", "zones", "instances", "disks", "machineTypes", "snapshots"].contains(&s.as_str())
    })
}

fn arb_zone() -> impl Strategy<Value = String> {
    ("[a-z]{2,8}-[a-z]{2,9}[0-9]", "[a-f]").prop_map(|(region, suffix)| format!("{}-{}", region, suffix))
}

/// Project or zone that collides with a path keyword
fn arb_keyword() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("projects"),
        Just("zones"),
        Just("instances"),
        Just("disks"),
        Just("machineTypes"),
        Just("snapshots"),
    ]
}

/// Optional service prefix seen on recommendation resources
fn arb_prefix() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(""),
        Just("//compute.googleapis.com/"),
        Just("https://www.googleapis.com/compute/v1/"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Zonal instance strings always yield their three components
    #[test]
    fn instance_components_roundtrip(
        prefix in arb_prefix(),
        project in arb_name(),
        zone in arb_zone(),
        name in arb_name(),
    ) {
        let resource = format!("{}projects/{}/zones/{}/instances/{}", prefix, project, zone, name);
        let zonal = ResourceLocator::parse(&resource).zonal_instance().unwrap();

        prop_assert_eq!(&zonal.project, &project);
        prop_assert_eq!(&zonal.zone, &zone);
        prop_assert_eq!(&zonal.name, &name);
    }

    /// A disk string never resolves as an instance, and vice versa
    #[test]
    fn collections_are_not_confused(
        project in arb_name(),
        zone in arb_zone(),
        name in arb_name(),
    ) {
        let disk = ResourceLocator::parse(&format!("projects/{}/zones/{}/disks/{}", project, zone, name));
        prop_assert!(disk.instance().is_err());
        prop_assert_eq!(disk.disk().unwrap(), name.as_str());

        let vm = ResourceLocator::parse(&format!("projects/{}/zones/{}/instances/{}", project, zone, name));
        prop_assert!(vm.disk().is_err());
    }

    /// Without a zones segment a zonal address cannot be formed
    #[test]
    fn missing_zone_is_an_error(project in arb_name(), name in arb_name()) {
        let loc = ResourceLocator::parse(&format!("projects/{}/global/snapshots/{}", project, name));
        prop_assert!(loc.zone().is_err());
        prop_assert!(loc.zonal_disk().is_err());
        prop_assert_eq!(loc.project().unwrap(), project.as_str());
    }

    /// Keyword-named projects, zones and resources still parse by position
    #[test]
    fn keyword_names_parse_by_position(
        prefix in arb_prefix(),
        project in arb_keyword(),
        zone in prop_oneof![arb_zone(), arb_keyword().prop_map(String::from)],
        name in prop_oneof![arb_name(), arb_keyword().prop_map(String::from)],
        is_disk in any::<bool>(),
    ) {
        let collection = if is_disk { "disks" } else { "instances" };
        let resource = format!("{}projects/{}/zones/{}/{}/{}", prefix, project, zone, collection, name);
        let loc = ResourceLocator::parse(&resource);
        let zonal = if is_disk { loc.zonal_disk() } else { loc.zonal_instance() }.unwrap();

        prop_assert_eq!(zonal.project.as_str(), project);
        prop_assert_eq!(&zonal.zone, &zone);
        prop_assert_eq!(&zonal.name, &name);
    }

    /// Parsing never panics on arbitrary input
    #[test]
    fn parse_never_panics(resource in ".{0,200}") {
        let loc = ResourceLocator::parse(&resource);
        prop_assert_eq!(loc.resource(), resource.as_str());
    }

    /// The machine type name is the segment after machineTypes
    #[test]
    fn machine_type_from_zonal_path(zone in arb_zone(), machine_type in arb_name()) {
        let value = format!("zones/{}/machineTypes/{}", zone, machine_type);
        prop_assert_eq!(machine_type_name(&value).unwrap(), machine_type.as_str());
        prop_assert_eq!(machine_type_name(&machine_type).unwrap(), machine_type.as_str());
    }
}

mod matcher_props {
    use super::*;

    proptest! {
        /// A literal condition matches exactly the literal
        #[test]
        fn literal_is_exact(expected in "[A-Z_]{1,12}", observed in "[A-Z_]{1,12}") {
            let condition = TestCondition::resolve("/status", Some(&json!(expected)), None).unwrap();
            prop_assert_eq!(condition.matches(&observed), observed == expected);
        }

        /// Patterns are anchored: an escaped literal does not match a longer string
        #[test]
        fn pattern_is_anchored(text in "[a-z0-9/.-]{1,40}", extra in "[a-z0-9]{1,5}") {
            let re = compile_anchored(&regex::escape(&text)).unwrap();
            prop_assert!(re.is_match(&text));
            let extended = format!("{}{}", text, extra);
            prop_assert!(!re.is_match(&extended));
            let prefixed = format!("{}{}", extra, text);
            prop_assert!(!re.is_match(&prefixed));
        }

        /// A stray closing parenthesis is rejected instead of escaping the anchors
        #[test]
        fn unbalanced_close_rejected(left in "[A-Z]{0,8}", right in "[A-Z.*]{0,8}") {
            let matcher = ValueMatcher { matches_pattern: format!("{})|({}", left, right) };
            prop_assert!(TestCondition::resolve("/status", None, Some(&matcher)).is_err());
            let trailing = format!("{})", left);
            prop_assert!(compile_anchored(&trailing).is_err());
        }

        /// With both checks present, both must hold
        #[test]
        fn literal_and_pattern_is_conjunction(machine_type in arb_name(), other in arb_name()) {
            let value = format!("zones/us-east1-b/machineTypes/{}", machine_type);
            let matcher = ValueMatcher { matches_pattern: ".*machineTypes/.*".to_string() };
            let condition = TestCondition::resolve("/machineType", Some(&json!(value)), Some(&matcher)).unwrap();

            prop_assert!(condition.matches(&value));
            let different = format!("zones/us-east1-b/machineTypes/{}", other);
            prop_assert_eq!(condition.matches(&different), different == value);
        }

        /// Non-string values are rejected
        #[test]
        fn non_string_value_rejected(n in any::<i64>()) {
            prop_assert!(TestCondition::resolve("/status", Some(&json!(n)), None).is_err());
        }
    }
}

mod name_props {
    use super::*;
    use recapply::gcp::compute::{is_valid_resource_name, snapshot_name};

    proptest! {
        /// Generated snapshot names are always valid resource names
        #[test]
        fn generated_snapshot_name_is_valid(disk in arb_name(), hint in "\\$?[a-zA-Z_-]{0,20}") {
            let name = snapshot_name(&hint, &disk);
            prop_assert!(is_valid_resource_name(&name), "{} is invalid", name);
        }

        /// A valid hint is kept verbatim
        #[test]
        fn valid_hint_kept(disk in arb_name(), hint in arb_name()) {
            prop_assert_eq!(snapshot_name(&hint, &disk), hint);
        }

        /// Action names are case-insensitive
        #[test]
        fn action_case_insensitive(upper in any::<bool>()) {
            let name = if upper { "REPLACE" } else { "replace" };
            prop_assert_eq!(Action::parse(name), Some(Action::Replace));
        }
    }
}
