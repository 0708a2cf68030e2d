//! Decoding of `virsh dumpxml` documents.
//!
//! Only the fields a [`VirtualMachine`] carries are modelled. Everything else
//! in the document is ignored, and absent fields stay at their defaults since
//! what libvirt writes varies between versions and hypervisors.

use nasvirt_host::{normalize_memory_mb, optional_field};
use serde::Deserialize;

use crate::types::{VirtualMachine, VmDisk, VmNetwork};

/// Unit libvirt assumes when `<memory>` carries none.
const DEFAULT_MEMORY_UNIT: &str = "KiB";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Domain {
    uuid: String,
    name: String,
    memory: Memory,
    vcpu: Text,
    os: Os,
    devices: Devices,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Text {
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Memory {
    #[serde(rename = "@unit")]
    unit: Option<String>,
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Os {
    #[serde(rename = "type")]
    kind: OsType,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OsType {
    #[serde(rename = "@arch")]
    arch: String,
    #[serde(rename = "$text")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Devices {
    #[serde(rename = "disk")]
    disks: Vec<Disk>,
    #[serde(rename = "interface")]
    interfaces: Vec<Interface>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Disk {
    #[serde(rename = "@device")]
    device: Option<String>,
    driver: Option<Driver>,
    source: Option<Source>,
    target: Option<Target>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Driver {
    #[serde(rename = "@type")]
    kind: Option<String>,
}

/// `<source>` of both disks and interfaces; which attribute is set depends
/// on the element's `type`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Source {
    #[serde(rename = "@file")]
    file: Option<String>,
    #[serde(rename = "@dev")]
    dev: Option<String>,
    #[serde(rename = "@volume")]
    volume: Option<String>,
    #[serde(rename = "@network")]
    network: Option<String>,
    #[serde(rename = "@bridge")]
    bridge: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Target {
    #[serde(rename = "@bus")]
    bus: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Interface {
    #[serde(rename = "@type")]
    kind: String,
    mac: Option<Mac>,
    source: Option<Source>,
    model: Option<Model>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Mac {
    #[serde(rename = "@address")]
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Model {
    #[serde(rename = "@type")]
    kind: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(optional_field).map(str::to_string)
}

impl From<Disk> for VmDisk {
    fn from(disk: Disk) -> Self {
        let path = disk
            .source
            .and_then(|s| present(s.file).or(present(s.dev)).or(present(s.volume)));
        VmDisk {
            path,
            size_gb: None,
            format: present(disk.driver.and_then(|d| d.kind)),
            bus: present(disk.target.and_then(|t| t.bus)),
            device: present(disk.device),
        }
    }
}

impl From<Interface> for VmNetwork {
    fn from(interface: Interface) -> Self {
        VmNetwork {
            kind: interface.kind,
            source: interface
                .source
                .and_then(|s| present(s.network).or(present(s.bridge)).or(present(s.dev))),
            mac: present(interface.mac.and_then(|m| m.address)),
            model: present(interface.model.and_then(|m| m.kind)),
        }
    }
}

/// Decodes a domain document. Only malformed XML is an error.
///
/// Run state and autostart are not part of the document and are left at
/// their defaults.
pub fn parse_domain(xml: &str) -> Result<VirtualMachine, quick_xml::DeError> {
    let domain: Domain = quick_xml::de::from_str(xml)?;

    let memory_mb = domain
        .memory
        .value
        .trim()
        .parse::<f64>()
        .map(|value| {
            let unit = domain.memory.unit.as_deref().unwrap_or(DEFAULT_MEMORY_UNIT);
            normalize_memory_mb(value, unit)
        })
        .unwrap_or(0);

    Ok(VirtualMachine {
        uuid: domain.uuid.trim().to_string(),
        name: domain.name.trim().to_string(),
        memory_mb,
        vcpus: domain.vcpu.value.trim().parse().unwrap_or(0),
        os_type: domain.os.kind.name.trim().to_string(),
        architecture: domain.os.kind.arch,
        disks: domain.devices.disks.into_iter().map(VmDisk::from).collect(),
        networks: domain
            .devices
            .interfaces
            .into_iter()
            .map(VmNetwork::from)
            .collect(),
        ..VirtualMachine::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = r#"<domain type='kvm' id='3'>
  <name>vm01</name>
  <uuid>4dea22b3-1d52-d8f3-2516-782e98ab3fa0</uuid>
  <memory unit='KiB'>2097152</memory>
  <currentMemory unit='KiB'>2097152</currentMemory>
  <vcpu placement='static'>2</vcpu>
  <os>
    <type arch='x86_64' machine='pc-q35-8.2'>hvm</type>
    <boot dev='hd'/>
  </os>
  <features>
    <acpi/>
    <apic/>
  </features>
  <devices>
    <emulator>/usr/bin/qemu-system-x86_64</emulator>
    <disk type='file' device='disk'>
      <driver name='qemu' type='qcow2'/>
      <source file='/var/lib/libvirt/images/vm01.qcow2'/>
      <target dev='vda' bus='virtio'/>
    </disk>
    <controller type='usb' index='0' model='qemu-xhci'/>
    <interface type='network'>
      <mac address='52:54:00:6b:3c:58'/>
      <source network='default'/>
      <model type='virtio'/>
    </interface>
    <disk type='file' device='cdrom'>
      <driver name='qemu' type='raw'/>
      <source file='/srv/iso/debian-12.iso'/>
      <target dev='sda' bus='sata'/>
      <readonly/>
    </disk>
    <interface type='bridge'>
      <mac address='52:54:00:aa:bb:cc'/>
      <source bridge='br0'/>
      <model type='e1000'/>
    </interface>
    <graphics type='vnc' port='5900' autoport='yes' listen='0.0.0.0'/>
  </devices>
</domain>"#;

    #[test]
    fn decodes_identity_and_sizes() {
        let vm = parse_domain(DOMAIN).unwrap();
        assert_eq!(vm.name, "vm01");
        assert_eq!(vm.uuid, "4dea22b3-1d52-d8f3-2516-782e98ab3fa0");
        assert_eq!(vm.memory_mb, 2048);
        assert_eq!(vm.vcpus, 2);
        assert_eq!(vm.os_type, "hvm");
        assert_eq!(vm.architecture, "x86_64");
        assert_eq!(vm.state.as_str(), "unknown");
        assert!(!vm.autostart);
    }

    #[test]
    fn decodes_interleaved_devices() {
        let vm = parse_domain(DOMAIN).unwrap();
        assert_eq!(
            vm.disks,
            vec![
                VmDisk {
                    path: Some("/var/lib/libvirt/images/vm01.qcow2".to_string()),
                    size_gb: None,
                    format: Some("qcow2".to_string()),
                    bus: Some("virtio".to_string()),
                    device: Some("disk".to_string()),
                },
                VmDisk {
                    path: Some("/srv/iso/debian-12.iso".to_string()),
                    size_gb: None,
                    format: Some("raw".to_string()),
                    bus: Some("sata".to_string()),
                    device: Some("cdrom".to_string()),
                },
            ]
        );
        assert_eq!(vm.networks.len(), 2);
        assert_eq!(vm.networks[0].kind, "network");
        assert_eq!(vm.networks[0].source.as_deref(), Some("default"));
        assert_eq!(vm.networks[0].mac.as_deref(), Some("52:54:00:6b:3c:58"));
        assert_eq!(vm.networks[1].source.as_deref(), Some("br0"));
        assert_eq!(vm.networks[1].model.as_deref(), Some("e1000"));
    }

    #[test]
    fn memory_units_are_normalized() {
        let vm = parse_domain("<domain><memory unit='GiB'>4</memory></domain>").unwrap();
        assert_eq!(vm.memory_mb, 4096);
        let vm = parse_domain("<domain><memory unit='MiB'>512</memory></domain>").unwrap();
        assert_eq!(vm.memory_mb, 512);
        let vm = parse_domain("<domain><memory>1048576</memory></domain>").unwrap();
        assert_eq!(vm.memory_mb, 1024);
    }

    #[test]
    fn sparse_document_stays_at_defaults() {
        let vm = parse_domain("<domain><name>bare</name></domain>").unwrap();
        assert_eq!(vm.name, "bare");
        assert_eq!(vm.memory_mb, 0);
        assert_eq!(vm.vcpus, 0);
        assert!(vm.disks.is_empty());
        assert!(vm.networks.is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_domain("<domain><name>vm01</domain>").is_err());
    }
}
