// src/compute/mod.rs
pub mod client;
pub mod models;
pub mod profile;

pub use client::{ClientOptions, ComputeClient, ComputeError, VirtualMachineOperations};
pub use models::{
    AvailabilitySetReference, OperationResponse, VirtualMachine, VirtualMachineProperties,
};
pub use profile::{ProfileError, ProfileSource, VmProfile};
