use comfy_table::{ContentArrangement, Table, modifiers, presets};
use nasvirt_host::{Capability, CreateReport};
use nasvirt_libvirt::VirtualMachine;
use nasvirt_lxc::{Container, Template};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn print_status(lxc: &Capability, libvirt: &Capability) {
    let mut table = new_table(vec!["manager", "status", "reason"]);
    for (name, capability) in [("lxc", lxc), ("libvirt", libvirt)] {
        let status = if capability.is_enabled() {
            "enabled"
        } else {
            "disabled"
        };
        table.add_row(vec![name, status, capability.reason().unwrap_or("-")]);
    }
    println!("{table}")
}

pub fn print_containers(containers: &[Container]) {
    let mut table = new_table(vec![
        "name", "state", "pid", "ipv4", "ipv6", "autostart",
    ]);
    for container in containers {
        table.add_row(vec![
            container.name.clone(),
            container.state.to_string(),
            or_dash(container.pid),
            or_dash(container.ipv4.as_deref()),
            or_dash(container.ipv6.as_deref()),
            yes_no(container.autostart).to_string(),
        ]);
    }
    println!("{table}")
}

pub fn print_container(container: &Container) {
    let mut table = new_table(vec!["field", "value"]);
    table
        .add_row(vec!["name".to_string(), container.name.clone()])
        .add_row(vec!["state".to_string(), container.state.to_string()])
        .add_row(vec!["pid".to_string(), or_dash(container.pid)])
        .add_row(vec!["memory (MB)".to_string(), or_dash(container.memory_mb)])
        .add_row(vec![
            "memory limit (MB)".to_string(),
            or_dash(container.memory_limit_mb),
        ])
        .add_row(vec![
            "cpu (s)".to_string(),
            or_dash(container.cpu_seconds.map(|s| format!("{s:.2}"))),
        ])
        .add_row(vec!["ipv4".to_string(), or_dash(container.ipv4.as_deref())])
        .add_row(vec!["ipv6".to_string(), or_dash(container.ipv6.as_deref())])
        .add_row(vec![
            "autostart".to_string(),
            yes_no(container.autostart).to_string(),
        ])
        .add_row(vec![
            "template".to_string(),
            or_dash(container.template.as_deref()),
        ]);
    println!("{table}")
}

pub fn print_templates(templates: &[Template]) {
    let mut table = new_table(vec!["name", "description", "releases", "architectures"]);
    for template in templates {
        table.add_row(vec![
            template.name.to_string(),
            template.description.to_string(),
            template.releases.join(", "),
            template.architectures.join(", "),
        ]);
    }
    println!("{table}")
}

pub fn print_vms(vms: &[VirtualMachine]) {
    let mut table = new_table(vec![
        "name", "uuid", "state", "memory (MB)", "vcpus", "autostart",
    ]);
    for vm in vms {
        table.add_row(vec![
            vm.name.clone(),
            vm.uuid.clone(),
            vm.state.to_string(),
            vm.memory_mb.to_string(),
            vm.vcpus.to_string(),
            yes_no(vm.autostart).to_string(),
        ]);
    }
    println!("{table}")
}

pub fn print_vm(vm: &VirtualMachine) {
    let mut table = new_table(vec!["field", "value"]);
    table
        .add_row(vec!["name".to_string(), vm.name.clone()])
        .add_row(vec!["uuid".to_string(), vm.uuid.clone()])
        .add_row(vec!["state".to_string(), vm.state.to_string()])
        .add_row(vec!["memory (MB)".to_string(), vm.memory_mb.to_string()])
        .add_row(vec!["vcpus".to_string(), vm.vcpus.to_string()])
        .add_row(vec!["autostart".to_string(), yes_no(vm.autostart).to_string()])
        .add_row(vec!["os".to_string(), vm.os_type.clone()])
        .add_row(vec!["arch".to_string(), vm.architecture.clone()]);
    println!("{table}");

    if !vm.disks.is_empty() {
        let mut disks = new_table(vec!["path", "device", "format", "bus"]);
        for disk in &vm.disks {
            disks.add_row(vec![
                or_dash(disk.path.as_deref()),
                or_dash(disk.device.as_deref()),
                or_dash(disk.format.as_deref()),
                or_dash(disk.bus.as_deref()),
            ]);
        }
        println!("{disks}");
    }

    if !vm.networks.is_empty() {
        let mut networks = new_table(vec!["type", "source", "mac", "model"]);
        for network in &vm.networks {
            networks.add_row(vec![
                network.kind.clone(),
                or_dash(network.source.as_deref()),
                or_dash(network.mac.as_deref()),
                or_dash(network.model.as_deref()),
            ]);
        }
        println!("{networks}");
    }
}

pub fn print_report(kind: &str, report: &CreateReport) {
    println!("created {kind} {}", report.name);
    if report.is_clean() {
        return;
    }
    let mut table = new_table(vec!["step", "failure"]);
    for advisory in &report.advisories {
        table.add_row(vec![advisory.step.as_str(), advisory.message.as_str()]);
    }
    println!("some settings were not applied:\n{table}")
}
