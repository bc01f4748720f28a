//! Operation Dispatcher
//!
//! Maps one recommendation operation onto Compute Engine calls. Routing is
//! split in two: [`plan`] resolves an [`Operation`] into a typed [`Step`]
//! without touching the cloud, and [`execute`] performs it.
//!
//! | action  | resource type | path           | step                                  |
//! |---------|---------------|----------------|---------------------------------------|
//! | test    | Instance      | `/machineType` | read instance, match machine type     |
//! | test    | Instance      | `/status`      | read instance, match status           |
//! | replace | Instance      | `/machineType` | stop, set machine type, start         |
//! | replace | Instance      | `/status`      | stop (target value `TERMINATED` only) |
//! | add     | Snapshot      | any            | snapshot the source disk              |
//! | remove  | Disk          | any            | delete the disk                       |

use super::error::{ApplyError, Result};
use super::locator::{machine_type_name, ResourceLocator, ZonalName};
use super::matcher::{expect_string, TestCondition};
use super::model::{Operation, SnapshotPayload};
use super::service::CloudService;
use serde_json::Value;

const INSTANCE_TYPE: &str = "compute.googleapis.com/Instance";
const DISK_TYPE: &str = "compute.googleapis.com/Disk";
const SNAPSHOT_TYPE: &str = "compute.googleapis.com/Snapshot";

/// Only status a `replace /status` may set
const TERMINATED: &str = "TERMINATED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Test,
    Replace,
    Add,
    Remove,
}

impl Action {
    /// Case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "test" => Some(Self::Test),
            "replace" => Some(Self::Replace),
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Instance,
    Disk,
    Snapshot,
}

impl ResourceType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            INSTANCE_TYPE => Some(Self::Instance),
            DISK_TYPE => Some(Self::Disk),
            SNAPSHOT_TYPE => Some(Self::Snapshot),
            _ => None,
        }
    }
}

/// Instance field addressed by an operation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    MachineType,
    Status,
    Other,
}

impl FieldPath {
    pub fn parse(s: &str) -> Self {
        match s {
            "/machineType" => Self::MachineType,
            "/status" => Self::Status,
            _ => Self::Other,
        }
    }
}

/// Concrete effect of one operation
#[derive(Debug, Clone)]
pub enum Step {
    TestMachineType {
        instance: ZonalName,
        condition: TestCondition,
    },
    TestStatus {
        instance: ZonalName,
        condition: TestCondition,
    },
    ReplaceMachineType {
        instance: ZonalName,
        machine_type: String,
    },
    StopInstance {
        instance: ZonalName,
    },
    CreateSnapshot {
        disk: ZonalName,
        name_hint: String,
    },
    DeleteDisk {
        disk: ZonalName,
    },
}

impl Step {
    /// Whether executing the step changes a resource
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::TestMachineType { .. } | Self::TestStatus { .. })
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TestMachineType { instance, condition } => {
                write!(f, "test machine type of {} {}", instance, condition)
            }
            Self::TestStatus { instance, condition } => {
                write!(f, "test status of {} {}", instance, condition)
            }
            Self::ReplaceMachineType {
                instance,
                machine_type,
            } => write!(
                f,
                "stop {0}, set machine type to {1}, start {0}",
                instance, machine_type
            ),
            Self::StopInstance { instance } => write!(f, "stop {}", instance),
            Self::CreateSnapshot { disk, name_hint } => {
                write!(f, "snapshot {} (name hint {:?})", disk, name_hint)
            }
            Self::DeleteDisk { disk } => write!(f, "delete {}", disk),
        }
    }
}

/// Resolve an operation into a step. Performs no cloud calls.
pub fn plan(operation: &Operation) -> Result<Step> {
    let unsupported = || {
        ApplyError::unsupported(
            &operation.action,
            &operation.resource_type,
            &operation.path,
        )
    };

    let Some(action) = Action::parse(&operation.action) else {
        return Err(unsupported());
    };
    let resource_type = ResourceType::parse(&operation.resource_type);
    let path = FieldPath::parse(&operation.path);

    match (action, resource_type) {
        (Action::Test, Some(ResourceType::Instance)) => {
            if path == FieldPath::Other {
                return Err(unsupported());
            }
            let condition = TestCondition::resolve(
                &operation.path,
                operation.value.as_ref(),
                operation.value_matcher.as_ref(),
            )?;
            let instance = ResourceLocator::parse(&operation.resource).zonal_instance()?;
            Ok(match path {
                FieldPath::MachineType => Step::TestMachineType {
                    instance,
                    condition,
                },
                _ => Step::TestStatus {
                    instance,
                    condition,
                },
            })
        }
        (Action::Replace, Some(ResourceType::Instance)) => match path {
            FieldPath::MachineType => {
                let value = expect_string(operation.value.as_ref().unwrap_or(&Value::Null))?;
                let machine_type = machine_type_name(&value)?.to_string();
                let instance = ResourceLocator::parse(&operation.resource).zonal_instance()?;
                Ok(Step::ReplaceMachineType {
                    instance,
                    machine_type,
                })
            }
            FieldPath::Status => {
                if operation.value.as_ref().and_then(Value::as_str) != Some(TERMINATED) {
                    return Err(unsupported());
                }
                let instance = ResourceLocator::parse(&operation.resource).zonal_instance()?;
                Ok(Step::StopInstance { instance })
            }
            FieldPath::Other => Err(unsupported()),
        },
        (Action::Add, Some(ResourceType::Snapshot)) => {
            let payload: SnapshotPayload = match &operation.value {
                Some(value) => serde_json::from_value(value.clone())?,
                None => SnapshotPayload::default(),
            };
            let source = payload
                .source_disk
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&operation.resource);
            let disk = ResourceLocator::parse(source).zonal_disk()?;
            Ok(Step::CreateSnapshot {
                disk,
                name_hint: payload.name,
            })
        }
        (Action::Remove, Some(ResourceType::Disk)) => {
            let disk = ResourceLocator::parse(&operation.resource).zonal_disk()?;
            Ok(Step::DeleteDisk { disk })
        }
        _ => Err(unsupported()),
    }
}

/// Perform a planned step against the cloud
pub async fn execute<S>(service: &S, step: &Step) -> Result<()>
where
    S: CloudService + ?Sized,
{
    tracing::info!("executing: {}", step);

    match step {
        Step::TestMachineType {
            instance,
            condition,
        } => {
            let snapshot = service
                .get_instance(&instance.project, &instance.zone, &instance.name)
                .await?;
            check(condition, &snapshot.machine_type, "/machineType", instance)
        }
        Step::TestStatus {
            instance,
            condition,
        } => {
            let snapshot = service
                .get_instance(&instance.project, &instance.zone, &instance.name)
                .await?;
            check(condition, &snapshot.status, "/status", instance)
        }
        Step::ReplaceMachineType {
            instance,
            machine_type,
        } => {
            let ZonalName {
                project,
                zone,
                name,
            } = instance;
            service.stop_instance(project, zone, name).await?;
            service
                .change_machine_type(project, zone, name, machine_type)
                .await?;
            service.start_instance(project, zone, name).await?;
            Ok(())
        }
        Step::StopInstance { instance } => {
            service
                .stop_instance(&instance.project, &instance.zone, &instance.name)
                .await?;
            Ok(())
        }
        Step::CreateSnapshot { disk, name_hint } => {
            service
                .create_snapshot(&disk.project, &disk.zone, &disk.name, name_hint)
                .await?;
            Ok(())
        }
        Step::DeleteDisk { disk } => {
            service
                .delete_disk(&disk.project, &disk.zone, &disk.name)
                .await?;
            Ok(())
        }
    }
}

/// Plan and execute a single operation
pub async fn dispatch<S>(service: &S, operation: &Operation) -> Result<()>
where
    S: CloudService + ?Sized,
{
    let step = plan(operation)?;
    execute(service, &step).await
}

fn check(condition: &TestCondition, observed: &str, path: &str, instance: &ZonalName) -> Result<()> {
    if condition.matches(observed) {
        tracing::debug!("{} of {} matches {}", path, instance, condition);
        return Ok(());
    }

    tracing::info!("{} of {} is {:?}, expected {}", path, instance, observed, condition);
    Err(ApplyError::ConditionNotMet {
        path: path.to_string(),
        resource: instance.to_string(),
        observed: observed.to_string(),
    })
}
