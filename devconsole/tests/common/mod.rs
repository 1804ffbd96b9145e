//! Scripted console devices for integration tests.
//!
//! A [`FakeDevice`] plays a Linux shell or an IOS CLI on the far end of a
//! stream: it echoes each line, answers from a small script, prints its
//! prompt, and records every line it received.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use devconsole::Connector;
use devconsole::error::ConnectionError;
use devconsole::transport::telnet::{IAC, WILL};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, duplex};
use tokio::net::TcpListener;

pub const SETUP_DIALOG: &str =
    "Would you like to enter the initial configuration dialog? [yes/no]: ";
pub const PRESS_RETURN: &str = "\r\nPress RETURN to get started!\r\n";

pub const INTERFACE_BRIEF: &str = "\
Interface                  IP-Address      OK? Method Status                Protocol\r
Ethernet0/0                40.0.0.99       YES manual up                    up\r
Ethernet0/1                unassigned      YES unset  administratively down down\r
";

pub const INTERFACE_BRIEF_DOWN: &str = "\
Interface                  IP-Address      OK? Method Status                Protocol\r
Ethernet0/0                40.0.0.99       YES manual administratively down down\r
";

pub const LINUX_PING_OK: &str = "\
PING 20.0.0.1 (20.0.0.1) 56(84) bytes of data.\r
64 bytes from 20.0.0.1: icmp_seq=1 ttl=64 time=0.512 ms\r
64 bytes from 20.0.0.1: icmp_seq=2 ttl=64 time=0.401 ms\r
\r
--- 20.0.0.1 ping statistics ---\r
4 packets transmitted, 4 received, 0% packet loss, time 3004ms\r
";

pub const LINUX_PING_LOST: &str = "\
PING 20.0.0.9 (20.0.0.9) 56(84) bytes of data.\r
\r
--- 20.0.0.9 ping statistics ---\r
4 packets transmitted, 0 received, 100% packet loss, time 3060ms\r
";

const INVALID_INPUT: &str = "% Invalid input detected at '^' marker.\r\n";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Linux,
    Ios,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    User,
    Privileged,
    Config,
    Interface,
}

/// Script for one fake console.
#[derive(Clone)]
pub struct FakeDevice {
    dialect: Dialect,
    hostname: String,
    responses: Vec<(String, String)>,
    rejected: Vec<String>,
    enable_secret: Option<String>,
    start_mode: Mode,
    banners: Vec<&'static str>,
    silent: bool,
    answer_limit: Option<usize>,
    delay: Option<Duration>,
    received: Arc<Mutex<Vec<String>>>,
}

impl FakeDevice {
    pub fn linux(hostname: &str) -> Self {
        Self::new(Dialect::Linux, hostname)
    }

    pub fn ios(hostname: &str) -> Self {
        Self::new(Dialect::Ios, hostname)
    }

    fn new(dialect: Dialect, hostname: &str) -> Self {
        Self {
            dialect,
            hostname: hostname.to_string(),
            responses: Vec::new(),
            rejected: Vec::new(),
            enable_secret: None,
            start_mode: Mode::Privileged,
            banners: Vec::new(),
            silent: false,
            answer_limit: None,
            delay: None,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn respond(mut self, prefix: &str, output: &str) -> Self {
        self.responses.push((prefix.to_string(), output.to_string()));
        self
    }

    /// Refuse this configuration line.
    pub fn reject(mut self, line: &str) -> Self {
        self.rejected.push(line.to_string());
        self
    }

    /// Start in user exec, with `enable` asking for `secret`.
    pub fn enable_secret(mut self, secret: &str) -> Self {
        self.enable_secret = Some(secret.to_string());
        self.start_mode = Mode::User;
        self
    }

    /// Boot prompts shown until answered.
    pub fn banners(mut self, banners: &[&'static str]) -> Self {
        self.banners = banners.to_vec();
        self
    }

    /// Never print anything.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Answer the first `lines` lines, then go quiet.
    pub fn answer_only(mut self, lines: usize) -> Self {
        self.answer_limit = Some(lines);
        self
    }

    /// Hold every reply back for `delay`.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Lines received so far, terminators removed.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Play the console on `stream` until the peer hangs up.
    pub async fn serve<S>(self, mut stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut state = DeviceState {
            mode: self.start_mode,
            awaiting_password: false,
            banners: self.banners.iter().copied().collect(),
        };

        if stream.write_all(&[IAC, WILL, 1, IAC, WILL, 3]).await.is_err() {
            return;
        }

        let mut pending = Vec::new();
        let mut skip = 0usize;
        let mut buf = [0u8; 1024];
        loop {
            let n = match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };

            for &byte in &buf[..n] {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                if byte == IAC {
                    // Negotiation replies are always three bytes here
                    skip = 2;
                    continue;
                }
                if byte != b'\r' && byte != b'\n' {
                    pending.push(byte);
                    continue;
                }

                let line = String::from_utf8_lossy(&pending).into_owned();
                pending.clear();
                let count = {
                    let mut received = self.received.lock().unwrap();
                    received.push(line.clone());
                    received.len()
                };

                if self.silent || self.answer_limit.is_some_and(|limit| count > limit) {
                    continue;
                }
                let reply = match self.dialect {
                    Dialect::Linux => self.linux_reply(&line),
                    Dialect::Ios => self.ios_reply(&mut state, &line),
                };
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                if stream.write_all(reply.as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    }

    fn scripted(&self, line: &str) -> Option<&str> {
        let command = line.trim();
        self.responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.as_str())
    }

    fn linux_reply(&self, line: &str) -> String {
        let mut reply = format!("{}\r\n", line);
        if let Some(output) = self.scripted(line) {
            reply.push_str(output);
        }
        reply.push_str(&format!("root@{}:~# ", self.hostname));
        reply
    }

    fn ios_reply(&self, state: &mut DeviceState, line: &str) -> String {
        if let Some(banner) = state.banners.front().copied() {
            let answered = match banner {
                SETUP_DIALOG => line.trim() == "no",
                _ => true,
            };
            let mut reply = format!("{}\r\n", line);
            if answered {
                state.banners.pop_front();
            }
            match state.banners.front() {
                Some(next) => reply.push_str(next),
                None => reply.push_str(&self.ios_prompt(state.mode)),
            }
            return reply;
        }

        if state.awaiting_password {
            state.awaiting_password = false;
            let mut reply = String::from("\r\n");
            if self.enable_secret.as_deref() == Some(line) {
                state.mode = Mode::Privileged;
            } else {
                reply.push_str("% Access denied\r\n\r\n");
            }
            reply.push_str(&self.ios_prompt(state.mode));
            return reply;
        }

        let mut reply = format!("{}\r\n", line);
        let command = line.trim();
        match (state.mode, command) {
            (_, "") => {}
            (Mode::User, "enable") if self.enable_secret.is_some() => {
                state.awaiting_password = true;
                reply.push_str("Password: ");
                return reply;
            }
            (Mode::User, "enable") => state.mode = Mode::Privileged,
            (Mode::Privileged, "disable") => state.mode = Mode::User,
            (Mode::Privileged, "configure terminal") => {
                reply.push_str("Enter configuration commands, one per line.  End with CNTL/Z.\r\n");
                state.mode = Mode::Config;
            }
            (Mode::User, "configure terminal") => reply.push_str(INVALID_INPUT),
            (Mode::Config | Mode::Interface, "end") => state.mode = Mode::Privileged,
            (Mode::Interface, "exit") => state.mode = Mode::Config,
            (Mode::Config, "exit") => state.mode = Mode::Privileged,
            (Mode::Config | Mode::Interface, _) => {
                if self.rejected.iter().any(|r| r == command) {
                    reply.push_str(INVALID_INPUT);
                } else if command.starts_with("interface ") {
                    state.mode = Mode::Interface;
                }
            }
            (Mode::User | Mode::Privileged, _) => {
                if let Some(output) = self.scripted(line) {
                    reply.push_str(output);
                }
            }
        }
        reply.push_str(&self.ios_prompt(state.mode));
        reply
    }

    fn ios_prompt(&self, mode: Mode) -> String {
        match mode {
            Mode::User => format!("{}>", self.hostname),
            Mode::Privileged => format!("{}#", self.hostname),
            Mode::Config => format!("{}(config)#", self.hostname),
            Mode::Interface => format!("{}(config-if)#", self.hostname),
        }
    }
}

struct DeviceState {
    mode: Mode,
    awaiting_password: bool,
    banners: VecDeque<&'static str>,
}

/// In-memory connector serving fake devices by port.
#[derive(Clone, Default)]
pub struct FakeConnector {
    devices: Arc<Mutex<HashMap<u16, FakeDevice>>>,
    attempts: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, port: u16, device: FakeDevice) -> FakeDevice {
        self.devices.lock().unwrap().insert(port, device.clone());
        device
    }

    /// Number of connect calls made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for FakeConnector {
    type Stream = DuplexStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        _timeout: Duration,
    ) -> Result<DuplexStream, ConnectionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let device = self.devices.lock().unwrap().get(&port).cloned();
        let Some(device) = device else {
            return Err(ConnectionError::ConnectFailed {
                host: host.to_string(),
                port,
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        };

        let (ours, theirs) = duplex(16 * 1024);
        tokio::spawn(device.serve(theirs));
        Ok(ours)
    }
}

/// Serve `device` on a real loopback listener accepting one connection.
pub async fn spawn_tcp(device: FakeDevice) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            device.serve(stream).await;
        }
    });
    port
}
