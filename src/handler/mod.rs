// src/handler/mod.rs
//! Translation of a "new VM" request into a single create-or-update call.
use tracing::{debug, info};

use crate::compute::models::{AvailabilitySetReference, OsProfile, VirtualMachineProperties};
use crate::compute::{
    ComputeError, OperationResponse, ProfileSource, VirtualMachine, VirtualMachineOperations,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// A required input was empty; nothing was sent
    MissingField(&'static str),
    /// The compute API call failed; carried unchanged
    Remote(ComputeError),
}

impl std::fmt::Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleError::MissingField(field) => {
                write!(f, "missing required value: {}", field)
            }
            HandleError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HandleError {}

impl From<ComputeError> for HandleError {
    fn from(e: ComputeError) -> Self {
        HandleError::Remote(e)
    }
}

/// Inputs of the "new VM" command
pub struct NewVmRequest<'a> {
    pub resource_group: String,
    pub name: String,
    pub location: String,
    pub profile: &'a dyn ProfileSource,
    pub availability_set_id: Option<String>,
    pub provision_vm_agent: Option<bool>,
}

impl NewVmRequest<'_> {
    fn validate(&self) -> Result<(), HandleError> {
        for (field, value) in [
            ("resource group", &self.resource_group),
            ("name", &self.name),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(HandleError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Build the submission object for `request` without sending it
pub fn build_virtual_machine(request: &NewVmRequest<'_>) -> Result<VirtualMachine, HandleError> {
    request.validate()?;

    let profile = request.profile;
    let mut properties = VirtualMachineProperties {
        hardware_profile: profile.hardware_profile(),
        storage_profile: profile.storage_profile(),
        network_profile: profile.network_profile(),
        os_profile: profile.os_profile(),
        availability_set: availability_set_reference(request.availability_set_id.as_deref()),
    };

    // Runs on the OS profile already embedded in the payload
    if let Some(provision) = request.provision_vm_agent {
        apply_provision_vm_agent(&mut properties.os_profile, provision);
    }

    Ok(VirtualMachine {
        location: request.location.clone(),
        name: request.name.clone(),
        properties,
    })
}

/// `None` for an absent or empty id
pub fn availability_set_reference(id: Option<&str>) -> Option<AvailabilitySetReference> {
    id.filter(|id| !id.is_empty())
        .map(|id| AvailabilitySetReference { id: id.to_string() })
}

/// Overwrite the VM agent provisioning setting of `os_profile`.
///
/// A Linux-only profile gets the flag on its Linux block. Anything else gets
/// it on the Windows block, which is created when missing. Other fields are
/// left alone.
pub fn apply_provision_vm_agent(os_profile: &mut OsProfile, provision: bool) {
    match os_profile.linux_configuration.as_mut() {
        Some(linux) if os_profile.windows_configuration.is_none() => {
            debug!(provision, "setting provisionVMAgent on linux configuration");
            linux.provision_vm_agent = Some(provision);
        }
        _ => {
            debug!(provision, "setting provisionVMAgent on windows configuration");
            os_profile
                .windows_configuration
                .get_or_insert_with(Default::default)
                .provision_vm_agent = Some(provision);
        }
    }
}

/// Build the VM from `request` and submit it through `ops`.
///
/// Exactly one call is made; its result or error comes back untouched.
pub async fn execute_new_vm(
    ops: &dyn VirtualMachineOperations,
    request: &NewVmRequest<'_>,
) -> Result<OperationResponse, HandleError> {
    let vm = build_virtual_machine(request)?;

    info!(
        resource_group = %request.resource_group,
        vm = %vm.name,
        location = %vm.location,
        availability_set = vm.properties.availability_set.is_some(),
        "submitting virtual machine"
    );

    let response = ops.create_or_update(&request.resource_group, &vm).await?;
    Ok(response)
}
