// src/compute/profile.rs
use base64::Engine;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::models::{
    DataDisk, HardwareProfile, ImageReference, LinuxConfiguration, NetworkInterfaceReference,
    NetworkInterfaceReferenceProperties, NetworkProfile, OsDisk, OsProfile, SshConfiguration,
    SshPublicKey, StorageProfile, SubResource, VaultCertificate, VaultSecretGroup,
    VirtualHardDisk, WindowsConfiguration,
};

/// Anything that can describe a VM as the four ARM profile blocks.
///
/// Each accessor returns a freshly built value; callers are free to mutate
/// what they get back.
pub trait ProfileSource {
    fn hardware_profile(&self) -> HardwareProfile;
    fn storage_profile(&self) -> StorageProfile;
    fn network_profile(&self) -> NetworkProfile;
    fn os_profile(&self) -> OsProfile;
}

#[derive(Debug)]
pub enum ProfileError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Read { path, source } => {
                write!(f, "failed to read profile {}: {}", path.display(), source)
            }
            ProfileError::Parse { path, message } => {
                write!(f, "invalid profile {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileError::Read { source, .. } => Some(source),
            ProfileError::Parse { .. } => None,
        }
    }
}

/// VM description as authored in a profile file (TOML or JSON)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmProfile {
    pub vm_size: String,
    #[serde(default)]
    pub image: Option<ImageSpec>,
    #[serde(default)]
    pub os_disk: Option<DiskSpec>,
    #[serde(default)]
    pub data_disks: Vec<DataDiskSpec>,
    #[serde(default)]
    pub network_interfaces: Vec<NicSpec>,
    #[serde(default)]
    pub os: OsSpec,
    #[serde(default)]
    pub secrets: Vec<SecretSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    pub publisher: Option<String>,
    pub offer: Option<String>,
    pub sku: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiskSpec {
    pub name: Option<String>,
    pub vhd_uri: Option<String>,
    pub caching: Option<String>,
    #[serde(default = "default_os_create_option")]
    pub create_option: String,
    pub os_type: Option<String>,
    pub disk_size_gb: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataDiskSpec {
    pub lun: u32,
    pub name: Option<String>,
    pub vhd_uri: Option<String>,
    pub caching: Option<String>,
    #[serde(default = "default_data_create_option")]
    pub create_option: String,
    pub disk_size_gb: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NicSpec {
    pub id: String,
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsSpec {
    pub computer_name: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Plain text; encoded to base64 on the wire
    pub custom_data: Option<String>,
    pub windows: Option<WindowsSpec>,
    pub linux: Option<LinuxSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowsSpec {
    pub provision_vm_agent: Option<bool>,
    pub enable_automatic_updates: Option<bool>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinuxSpec {
    pub disable_password_authentication: Option<bool>,
    pub provision_vm_agent: Option<bool>,
    #[serde(default)]
    pub ssh_public_keys: Vec<SshKeySpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SshKeySpec {
    pub path: String,
    pub key_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretSpec {
    pub source_vault_id: String,
    #[serde(default)]
    pub certificates: Vec<CertificateSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateSpec {
    pub url: String,
    pub store: Option<String>,
}

fn default_os_create_option() -> String {
    "FromImage".to_string()
}

fn default_data_create_option() -> String {
    "Empty".to_string()
}

impl VmProfile {
    /// Load a profile file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ProfileError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

impl ProfileSource for VmProfile {
    fn hardware_profile(&self) -> HardwareProfile {
        HardwareProfile {
            vm_size: self.vm_size.clone(),
        }
    }

    fn storage_profile(&self) -> StorageProfile {
        StorageProfile {
            image_reference: self.image.as_ref().map(|image| ImageReference {
                publisher: image.publisher.clone(),
                offer: image.offer.clone(),
                sku: image.sku.clone(),
                version: image.version.clone(),
                id: image.id.clone(),
            }),
            os_disk: self.os_disk.as_ref().map(|disk| OsDisk {
                name: disk.name.clone(),
                os_type: disk.os_type.clone(),
                vhd: vhd(&disk.vhd_uri),
                caching: disk.caching.clone(),
                create_option: disk.create_option.clone(),
                disk_size_gb: disk.disk_size_gb,
            }),
            data_disks: self
                .data_disks
                .iter()
                .map(|disk| DataDisk {
                    lun: disk.lun,
                    name: disk.name.clone(),
                    vhd: vhd(&disk.vhd_uri),
                    caching: disk.caching.clone(),
                    create_option: disk.create_option.clone(),
                    disk_size_gb: disk.disk_size_gb,
                })
                .collect(),
        }
    }

    fn network_profile(&self) -> NetworkProfile {
        NetworkProfile {
            network_interfaces: self
                .network_interfaces
                .iter()
                .map(|nic| NetworkInterfaceReference {
                    id: nic.id.clone(),
                    properties: nic
                        .primary
                        .map(|primary| NetworkInterfaceReferenceProperties {
                            primary: Some(primary),
                        }),
                })
                .collect(),
        }
    }

    fn os_profile(&self) -> OsProfile {
        let os = &self.os;
        OsProfile {
            computer_name: os.computer_name.clone(),
            admin_username: os.admin_username.clone(),
            admin_password: os.admin_password.clone(),
            custom_data: os
                .custom_data
                .as_ref()
                .map(|data| base64::engine::general_purpose::STANDARD.encode(data)),
            windows_configuration: os.windows.as_ref().map(|win| WindowsConfiguration {
                provision_vm_agent: win.provision_vm_agent,
                enable_automatic_updates: win.enable_automatic_updates,
                time_zone: win.time_zone.clone(),
            }),
            linux_configuration: os.linux.as_ref().map(|linux| LinuxConfiguration {
                disable_password_authentication: linux.disable_password_authentication,
                ssh: if linux.ssh_public_keys.is_empty() {
                    None
                } else {
                    Some(SshConfiguration {
                        public_keys: linux
                            .ssh_public_keys
                            .iter()
                            .map(|key| SshPublicKey {
                                path: key.path.clone(),
                                key_data: key.key_data.clone(),
                            })
                            .collect(),
                    })
                },
                provision_vm_agent: linux.provision_vm_agent,
            }),
            secrets: self
                .secrets
                .iter()
                .map(|secret| VaultSecretGroup {
                    source_vault: SubResource {
                        id: secret.source_vault_id.clone(),
                    },
                    vault_certificates: secret
                        .certificates
                        .iter()
                        .map(|cert| VaultCertificate {
                            certificate_url: cert.url.clone(),
                            certificate_store: cert.store.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn vhd(uri: &Option<String>) -> Option<VirtualHardDisk> {
    uri.as_ref().map(|uri| VirtualHardDisk { uri: uri.clone() })
}
