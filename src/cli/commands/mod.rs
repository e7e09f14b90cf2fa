mod init;
mod vm;

pub use init::execute_init;
pub use vm::execute_vm_new;
