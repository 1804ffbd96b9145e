//! Task runner against scripted devices.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    FakeConnector, FakeDevice, INTERFACE_BRIEF, INTERFACE_BRIEF_DOWN, LINUX_PING_LOST,
    LINUX_PING_OK, init_logging,
};
use devconsole::error::{ConnectionError, DriverError};
use devconsole::tasks::{
    DEFAULT_BANDWIDTH, DEFAULT_IPERF_PORT, DEFAULT_MONITORED_INTERFACE, DEFAULT_TEST_DURATION,
    Deployment, InterfaceHealth, TaskRunner,
};
use devconsole::{Error, Inventory};
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

const INVENTORY: &str = r#"
hosts:
  router:
    port: 5001
    groups: [cisco]
  pc1:
    port: 5002
    groups: [linux]
  router2:
    port: 5003
    groups: [cisco]
  router3:
    port: 5004
    groups: [cisco]
  pc3:
    port: 5005
    groups: [linux]
"#;

fn runner(connector: &FakeConnector) -> TaskRunner<FakeConnector> {
    let inventory = Arc::new(Inventory::from_yaml_str(INVENTORY).unwrap());
    TaskRunner::with_connector(inventory, connector.clone())
}

#[tokio::test(start_paused = true)]
async fn test_reachability() {
    init_logging();
    let connector = FakeConnector::new();
    connector.add(5002, FakeDevice::linux("pc1").respond("ping -c 4 -W 2 20.0.0.1", LINUX_PING_OK));
    connector.add(5005, FakeDevice::linux("pc3").respond("ping", LINUX_PING_LOST));
    let runner = runner(&connector);

    let ok = assert_ok!(runner.check_reachability("pc1", "20.0.0.1").await);
    assert!(ok.success);
    assert!(ok.to_string().starts_with("SUCCESS"));

    let lost = assert_ok!(runner.check_reachability("pc3", "20.0.0.9").await);
    assert!(!lost.success);
    assert!(lost.output.contains("100% packet loss"));
}

#[tokio::test(start_paused = true)]
async fn test_reachability_unknown_source() {
    let connector = FakeConnector::new();
    let runner = runner(&connector);

    let result = runner.check_reachability("pc9", "20.0.0.1").await;
    assert!(matches!(
        assert_err!(result),
        Error::Connection(ConnectionError::UnknownDevice { .. })
    ));
    assert_eq!(connector.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_interface_health() {
    let connector = FakeConnector::new();
    connector.add(
        5001,
        FakeDevice::ios("router").respond("show ip interface brief", INTERFACE_BRIEF),
    );
    let runner = runner(&connector);

    let found = assert_ok!(runner.interface_health("router", "Ethernet0/0").await);
    match &found {
        InterfaceHealth::Found(status) => assert!(status.is_up()),
        other => panic!("unexpected health: {other:?}"),
    }
    assert_eq!(
        found.to_string(),
        "Interface Ethernet0/0: Status=up, Protocol=up, IP=40.0.0.99"
    );

    let missing = assert_ok!(runner.interface_health("router", "Serial0/0").await);
    assert_eq!(
        missing,
        InterfaceHealth::Missing {
            available: vec!["Ethernet0/0".to_string(), "Ethernet0/1".to_string()],
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_interface_health_with_blank_ip_column() {
    let table = "\
Interface                  IP-Address      OK? Method Status                Protocol\r
Ethernet0/0                40.0.0.99       YES manual up                    up\r
Ethernet0/1                                YES unset  administratively down down\r
";
    let connector = FakeConnector::new();
    connector.add(
        5001,
        FakeDevice::ios("router").respond("show ip interface brief", table),
    );
    let runner = runner(&connector);

    let health = assert_ok!(runner.interface_health("router", "Ethernet0/1").await);
    assert_eq!(
        health.to_string(),
        "Interface Ethernet0/1: Status=administratively down, Protocol=down, IP=unassigned"
    );
}

#[tokio::test(start_paused = true)]
async fn test_interface_health_linux_is_unavailable() {
    let connector = FakeConnector::new();
    let runner = runner(&connector);

    let health = assert_ok!(runner.interface_health("pc1", "eth0").await);
    assert_eq!(health, InterfaceHealth::Unavailable);
    assert_eq!(connector.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_detect_link_failures() {
    init_logging();
    let connector = FakeConnector::new();
    connector.add(
        5001,
        FakeDevice::ios("router").respond("show ip interface brief", INTERFACE_BRIEF),
    );
    connector.add(
        5003,
        FakeDevice::ios("router2").respond("show ip interface brief", INTERFACE_BRIEF_DOWN),
    );
    // router3 has no listener; pc1 and pc3 are not swept
    let runner = runner(&connector);

    let issues = runner.detect_link_failures(DEFAULT_MONITORED_INTERFACE).await;
    let devices: Vec<_> = issues.iter().map(|i| i.device.as_str()).collect();
    assert_eq!(devices, vec!["router2", "router3"]);
    assert!(issues[0].detail.contains("administratively down"));
    assert_eq!(connector.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_deploy_dry_run_touches_nothing() {
    let connector = FakeConnector::new();
    let runner = runner(&connector);

    let deployment = assert_ok!(runner.deploy_config("router", "ip route 0.0.0.0 0.0.0.0 20.0.0.1", true).await);
    assert!(matches!(deployment, Deployment::DryRun { .. }));
    assert!(deployment.to_string().starts_with("[DRY-RUN]"));
    assert_eq!(connector.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deploy_applies_per_platform() {
    let connector = FakeConnector::new();
    let router = connector.add(5001, FakeDevice::ios("router"));
    let pc = connector.add(5002, FakeDevice::linux("pc1"));
    let runner = runner(&connector);

    let applied = assert_ok!(
        runner
            .deploy_config("router", "interface Ethernet0/1\n no shutdown\nexit", false)
            .await
    );
    match applied {
        Deployment::Applied {
            device,
            port,
            transcript,
        } => {
            assert_eq!(device, "router");
            assert_eq!(port, 5001);
            assert_eq!(transcript.commands().last(), Some("end"));
        }
        other => panic!("unexpected deployment: {other:?}"),
    }
    assert!(router.received().contains(&" no shutdown".to_string()));

    assert_ok!(
        runner
            .deploy_config("pc1", "ip addr add 20.0.0.10/24 dev eth0\nip link set eth0 up", false)
            .await
    );
    assert_eq!(
        pc.received(),
        vec!["", "ip addr add 20.0.0.10/24 dev eth0", "ip link set eth0 up"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_traffic_server() {
    let connector = FakeConnector::new();
    let pc = connector.add(5005, FakeDevice::linux("pc3"));
    let runner = runner(&connector);

    assert_ok!(runner.start_traffic_server("pc3", DEFAULT_IPERF_PORT).await);
    assert_eq!(pc.received(), vec!["", "iperf3 -s -p 5201 -D"]);

    let refused = runner.start_traffic_server("router", DEFAULT_IPERF_PORT).await;
    assert!(matches!(
        assert_err!(refused),
        Error::Driver(DriverError::UnsupportedOperation { .. })
    ));
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_traffic_test_waits_for_duration() {
    let connector = FakeConnector::new();
    let pc = connector.add(
        5002,
        FakeDevice::linux("pc1").respond(
            "iperf3 -c",
            "[  5]   0.00-5.00   sec  5.96 MBytes  10.0 Mbits/sec  sender\r\n",
        ),
    );
    let runner = runner(&connector);

    let start = Instant::now();
    let result = runner
        .run_traffic_test("pc1", "20.0.0.3", DEFAULT_TEST_DURATION, DEFAULT_BANDWIDTH)
        .await;
    let elapsed = start.elapsed();

    let result = assert_ok!(result);
    assert!(result.contains("10.0 Mbits/sec"));
    assert_eq!(result.wait, Duration::from_secs(7));
    assert!(elapsed >= Duration::from_secs(7));
    assert_eq!(pc.received()[1], "iperf3 -c 20.0.0.3 -t 5 -b 10M");
}

#[tokio::test(start_paused = true)]
async fn test_traffic_test_rejects_bad_arguments() {
    let connector = FakeConnector::new();
    let runner = runner(&connector);

    let zero = runner
        .run_traffic_test("pc1", "20.0.0.3", Duration::ZERO, DEFAULT_BANDWIDTH)
        .await;
    assert!(matches!(
        assert_err!(zero),
        Error::Driver(DriverError::InvalidArgument { what: "duration", .. })
    ));

    let injected = runner
        .run_traffic_test("pc1", "20.0.0.3 -R", DEFAULT_TEST_DURATION, DEFAULT_BANDWIDTH)
        .await;
    assert!(matches!(
        assert_err!(injected),
        Error::Driver(DriverError::InvalidArgument { .. })
    ));
    assert_eq!(connector.attempts(), 0);
}
