// src/lib.rs
pub mod cli;
pub mod compute;
mod handler;
mod logging;

// Re-export tracing for use in other modules
pub use tracing;

pub use compute::{
    ClientOptions, ComputeClient, ComputeError, OperationResponse, ProfileError, ProfileSource,
    VirtualMachine, VirtualMachineOperations, VmProfile,
};
pub use handler::{
    apply_provision_vm_agent, availability_set_reference, build_virtual_machine, execute_new_vm,
    HandleError, NewVmRequest,
};
pub use logging::init_tracing;
