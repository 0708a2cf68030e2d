//! Reading and appending directives in a container's host-side config file.
//!
//! The file is only ever appended to. When reading back, the last assignment
//! of a key wins, which is how lxc itself treats repeated keys.

use nasvirt_host::parse_memory_mb;

pub const AUTOSTART_DIRECTIVE: &str = "lxc.start.auto = 1";

const AUTOSTART_KEY: &str = "lxc.start.auto";
const MEMORY_MAX_KEY: &str = "lxc.cgroup2.memory.max";
const LEGACY_MEMORY_LIMIT_KEY: &str = "lxc.cgroup.memory.limit_in_bytes";
const TEMPLATE_PARAMETERS: &str = "# Parameters passed to the template:";

/// CPU quota period in microseconds used for `cpu.max`.
const CPU_PERIOD_US: u64 = 100_000;

pub fn memory_limit_directive(memory_mb: u64) -> String {
    format!("{MEMORY_MAX_KEY} = {memory_mb}M")
}

pub fn cpu_limit_directive(cpus: u32) -> String {
    format!(
        "lxc.cgroup2.cpu.max = {} {CPU_PERIOD_US}",
        u64::from(cpus) * CPU_PERIOD_US
    )
}

pub fn bridge_directives(bridge: &str) -> [String; 3] {
    [
        "lxc.net.0.type = veth".to_string(),
        format!("lxc.net.0.link = {bridge}"),
        "lxc.net.0.flags = up".to_string(),
    ]
}

/// What the config file says about a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFacts {
    pub autostart: bool,
    pub memory_limit_mb: Option<u64>,
    /// Distribution given to the `download` template.
    pub template: Option<String>,
}

pub fn parse_config(contents: &str) -> ConfigFacts {
    let mut facts = ConfigFacts::default();

    for line in contents.lines() {
        let line = line.trim();

        if let Some(parameters) = line.strip_prefix(TEMPLATE_PARAMETERS) {
            facts.template = template_dist(parameters).or(facts.template.take());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            AUTOSTART_KEY => facts.autostart = value == "1",
            MEMORY_MAX_KEY | LEGACY_MEMORY_LIMIT_KEY => facts.memory_limit_mb = cgroup_memory_mb(value),
            _ => {}
        }
    }

    facts
}

fn template_dist(parameters: &str) -> Option<String> {
    let mut words = parameters.split_whitespace();
    while let Some(word) = words.next() {
        if word == "--dist" || word == "-d" {
            return words.next().map(str::to_string);
        }
    }
    None
}

/// cgroup limits are plain bytes, a suffixed size, or `max`.
fn cgroup_memory_mb(value: &str) -> Option<u64> {
    if value == "max" {
        return None;
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return value.parse::<u64>().ok().map(|bytes| bytes / 1024 / 1024);
    }
    parse_memory_mb(value)
}
