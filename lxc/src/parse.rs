//! Parsers for `lxc-ls` and `lxc-info` output.

use nasvirt_host::{is_truthy, labeled_value, optional_field, parse_memory_mb};
use tracing::debug;

use crate::error::ParseError;
use crate::types::{Container, ContainerState};

/// Columns requested from `lxc-ls -f -F`, in the order [`parse_list`] maps them.
pub const LIST_COLUMNS: &str = "NAME,STATE,PID,IPV4,IPV6,AUTOSTART";

/// Parses `lxc-ls -f -F NAME,STATE,PID,IPV4,IPV6,AUTOSTART` output.
///
/// The header and blank lines are skipped. Lines that do not parse are
/// dropped so one odd container cannot blank the listing.
pub fn parse_list(stdout: &str) -> Vec<Container> {
    stdout
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let container = parse_list_line(line);
            if container.is_none() {
                debug!("[lxc] skipping unparseable listing line: {line:?}");
            }
            container
        })
        .collect()
}

pub fn parse_list_line(line: &str) -> Option<Container> {
    let fields = list_fields(line);
    if fields.len() < 2 {
        return None;
    }

    let state: ContainerState = fields[1].parse().ok()?;
    let mut container = Container::new(&fields[0], state);

    let field = |index: usize| fields.get(index).and_then(|f| optional_field(f));

    container.pid = field(2).and_then(|pid| pid.parse().ok());
    container.ipv4 = field(3).and_then(first_address);
    container.ipv6 = field(4).and_then(first_address);
    container.autostart = fields.get(5).is_some_and(|f| is_truthy(f));

    Some(container)
}

/// Splits on whitespace, keeping `10.0.3.5, 10.0.3.6` together as one cell.
fn list_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut continued = false;
    for token in line.split_whitespace() {
        match fields.last_mut() {
            Some(last) if continued => {
                last.push(' ');
                last.push_str(token);
            }
            _ => fields.push(token.to_string()),
        }
        continued = token.ends_with(',');
    }
    fields
}

fn first_address(cell: &str) -> Option<String> {
    cell.split(',')
        .map(str::trim)
        .find(|address| !address.is_empty())
        .map(str::to_string)
}

/// Parses `lxc-info -n <name>` output.
pub fn parse_info(name: &str, stdout: &str) -> Result<Container, ParseError> {
    let mut state = None;
    let mut container = Container::new(name, ContainerState::Stopped);

    for line in stdout.lines() {
        if let Some(value) = labeled_value(line, "State:") {
            state = Some(value.parse::<ContainerState>()?);
        } else if let Some(value) = labeled_value(line, "PID:") {
            container.pid = value.parse().ok();
        } else if let Some(value) = labeled_value(line, "IP:") {
            if value.contains(':') {
                container.ipv6.get_or_insert_with(|| value.to_string());
            } else if !value.is_empty() {
                container.ipv4.get_or_insert_with(|| value.to_string());
            }
        } else if let Some(value) = labeled_value(line, "Memory use:") {
            container.memory_mb = parse_memory_mb(value);
        } else if let Some(value) = labeled_value(line, "CPU use:") {
            container.cpu_seconds = value
                .split_whitespace()
                .next()
                .and_then(|seconds| seconds.parse().ok());
        }
    }

    container.state = state.ok_or(ParseError::MissingState)?;
    Ok(container)
}
