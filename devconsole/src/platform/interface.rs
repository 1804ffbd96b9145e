//! Interface status extraction from `show ip interface brief`.
//!
//! ```text
//! Interface                  IP-Address      OK? Method Status                Protocol
//! FastEthernet0/0            40.0.0.99       YES manual up                    up
//! FastEthernet0/1            unassigned      YES unset  administratively down down
//! ```
//!
//! Column widths vary between images and long interface names push columns
//! right, so rows are split on whitespace rather than cut at fixed offsets.
//! The `OK?` column anchors each row: a blank IP column shifts everything
//! left by one. Status may be one or two words; protocol is always the last
//! word.

use std::net::Ipv4Addr;

use serde::Serialize;

/// Status of one interface as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceStatus {
    pub name: String,
    /// Administrative/line status: `up`, `down`, `administratively down`.
    pub status: String,
    /// Line protocol status.
    pub protocol: String,
    /// Assigned address, if any.
    pub ip: Option<Ipv4Addr>,
}

impl InterfaceStatus {
    pub fn is_up(&self) -> bool {
        self.status == "up" && self.protocol == "up"
    }
}

/// Parse a `show ip interface brief` table.
///
/// Returns an empty list when no row can be recognised; this is "status
/// unavailable", not an error.
pub fn parse_ip_interface_brief(output: &str) -> Vec<InterfaceStatus> {
    output.lines().filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<InterfaceStatus> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    // name, [ip], ok?, method, status..., protocol
    let ok = fields
        .iter()
        .take(3)
        .position(|f| f.eq_ignore_ascii_case("YES") || f.eq_ignore_ascii_case("NO"))?;
    if ok == 0 || fields.len() < ok + 4 {
        return None;
    }

    let ip = match &fields[1..ok] {
        [] | ["unassigned"] => None,
        [text] => Some(text.parse::<Ipv4Addr>().ok()?),
        _ => return None,
    };

    let protocol = fields[fields.len() - 1];
    let status = fields[ok + 2..fields.len() - 1].join(" ");

    Some(InterfaceStatus {
        name: fields[0].to_string(),
        status,
        protocol: protocol.to_string(),
        ip,
    })
}
