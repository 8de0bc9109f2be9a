//! Test doubles and common utilities for monitor contract tests
//!
//! The doubles are cheap to clone; clones share their counters and state so
//! a test can keep a handle after boxing one into the Monitor.

#![allow(dead_code)]

use floatip_core::error::{Error, Result};
use floatip_core::traits::{InterfaceConfigurator, Neighbor, PresenceScanner, Sleeper};
use floatip_core::{MacAddr, MonitorConfig, RunMode};
use std::collections::BTreeSet;
use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub const TARGET_MAC: &str = "AA:BB:CC:DD:EE:FF";
pub const TARGET_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);
pub const INTERFACE: &str = "eth0";

pub fn target_mac() -> MacAddr {
    TARGET_MAC.parse().expect("valid test MAC")
}

/// Scan output in which the peer answers at the managed IP
pub fn peer_present() -> Vec<Neighbor> {
    vec![
        Neighbor::new("11:22:33:44:55:66".parse().unwrap(), Ipv4Addr::new(192, 168, 1, 1)),
        Neighbor::new(target_mac(), TARGET_IP),
    ]
}

/// Scan output without the peer
pub fn peer_absent() -> Vec<Neighbor> {
    vec![Neighbor::new(
        "11:22:33:44:55:66".parse().unwrap(),
        Ipv4Addr::new(192, 168, 1, 1),
    )]
}

/// A scanner returning scripted results
#[derive(Clone)]
pub struct FakeScanner {
    neighbors: Arc<Mutex<Result<Vec<Neighbor>>>>,
    available: Arc<AtomicBool>,
    scan_count: Arc<AtomicUsize>,
    scanned_interfaces: Arc<Mutex<Vec<String>>>,
}

impl FakeScanner {
    pub fn new(neighbors: Vec<Neighbor>) -> Self {
        Self {
            neighbors: Arc::new(Mutex::new(Ok(neighbors))),
            available: Arc::new(AtomicBool::new(true)),
            scan_count: Arc::new(AtomicUsize::new(0)),
            scanned_interfaces: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A scanner whose every scan fails
    pub fn failing(message: &str) -> Self {
        let scanner = Self::new(Vec::new());
        *scanner.neighbors.lock().unwrap() = Err(Error::scan(message));
        scanner
    }

    /// A scanner whose tool is missing
    pub fn unavailable() -> Self {
        let scanner = Self::new(Vec::new());
        scanner.available.store(false, Ordering::SeqCst);
        scanner
    }

    /// Change what subsequent scans return
    pub fn set_neighbors(&self, neighbors: Vec<Neighbor>) {
        *self.neighbors.lock().unwrap() = Ok(neighbors);
    }

    pub fn scan_count(&self) -> usize {
        self.scan_count.load(Ordering::SeqCst)
    }

    pub fn scanned_interfaces(&self) -> Vec<String> {
        self.scanned_interfaces.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PresenceScanner for FakeScanner {
    async fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::missing_dependency(
                "/usr/sbin/arp-scan",
                "install it with `apt-get install arp-scan`",
            ))
        }
    }

    async fn scan(&self, interface: &str) -> Result<Vec<Neighbor>> {
        self.scan_count.fetch_add(1, Ordering::SeqCst);
        self.scanned_interfaces
            .lock()
            .unwrap()
            .push(interface.to_string());
        match &*self.neighbors.lock().unwrap() {
            Ok(neighbors) => Ok(neighbors.clone()),
            Err(e) => Err(Error::scan(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// A recorded mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add(String, Ipv4Addr, u8),
    Remove(String, Ipv4Addr, u8),
}

/// An in-memory interface with call tracking
#[derive(Clone)]
pub struct FakeInterface {
    addresses: Arc<Mutex<BTreeSet<Ipv4Addr>>>,
    mutations: Arc<Mutex<Vec<Mutation>>>,
    list_count: Arc<AtomicUsize>,
    fail_mutations: Arc<AtomicBool>,
    fail_listing: Arc<AtomicBool>,
    privileged: Arc<AtomicBool>,
    available: Arc<AtomicBool>,
    exists: Arc<AtomicBool>,
}

impl FakeInterface {
    pub fn new() -> Self {
        Self {
            addresses: Arc::new(Mutex::new(BTreeSet::new())),
            mutations: Arc::new(Mutex::new(Vec::new())),
            list_count: Arc::new(AtomicUsize::new(0)),
            fail_mutations: Arc::new(AtomicBool::new(false)),
            fail_listing: Arc::new(AtomicBool::new(false)),
            privileged: Arc::new(AtomicBool::new(true)),
            available: Arc::new(AtomicBool::new(true)),
            exists: Arc::new(AtomicBool::new(true)),
        }
    }

    /// An interface that already carries `ip`
    pub fn with_address(ip: Ipv4Addr) -> Self {
        let iface = Self::new();
        iface.addresses.lock().unwrap().insert(ip);
        iface
    }

    pub fn addresses(&self) -> BTreeSet<Ipv4Addr> {
        self.addresses.lock().unwrap().clone()
    }

    pub fn has_address(&self, ip: Ipv4Addr) -> bool {
        self.addresses.lock().unwrap().contains(&ip)
    }

    /// Simulate an external actor changing the interface
    pub fn external_add(&self, ip: Ipv4Addr) {
        self.addresses.lock().unwrap().insert(ip);
    }

    pub fn external_remove(&self, ip: Ipv4Addr) {
        self.addresses.lock().unwrap().remove(&ip);
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.lock().unwrap().len()
    }

    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn set_privileged(&self, privileged: bool) {
        self.privileged.store(privileged, Ordering::SeqCst);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_exists(&self, exists: bool) {
        self.exists.store(exists, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl InterfaceConfigurator for FakeInterface {
    async fn ensure_privileged(&self) -> Result<()> {
        if self.privileged.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::privilege("must run as root"))
        }
    }

    async fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::missing_dependency(
                "/sbin/ip",
                "install iproute2 (`apt-get install iproute2`)",
            ))
        }
    }

    async fn interface_exists(&self, interface: &str) -> Result<bool> {
        Ok(interface == INTERFACE && self.exists.load(Ordering::SeqCst))
    }

    async fn list_addresses(&self, _interface: &str) -> Result<BTreeSet<Ipv4Addr>> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::interface("Device \"eth0\" does not exist."));
        }
        Ok(self.addresses())
    }

    async fn add_address(&self, interface: &str, ip: Ipv4Addr, prefix_len: u8) -> Result<()> {
        self.mutations
            .lock()
            .unwrap()
            .push(Mutation::Add(interface.to_string(), ip, prefix_len));
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Error::interface("RTNETLINK answers: Operation not permitted"));
        }
        let inserted = self.addresses.lock().unwrap().insert(ip);
        assert!(inserted, "add_address called for an already bound address");
        Ok(())
    }

    async fn remove_address(&self, interface: &str, ip: Ipv4Addr, prefix_len: u8) -> Result<()> {
        self.mutations
            .lock()
            .unwrap()
            .push(Mutation::Remove(interface.to_string(), ip, prefix_len));
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Error::interface("RTNETLINK answers: Operation not permitted"));
        }
        let removed = self.addresses.lock().unwrap().remove(&ip);
        assert!(removed, "remove_address called for an unbound address");
        Ok(())
    }
}

/// A sleeper that records requested durations and returns immediately
///
/// Optionally fires a shutdown signal once a given number of sleeps happened.
#[derive(Clone)]
pub struct RecordingSleeper {
    durations: Arc<Mutex<Vec<Duration>>>,
    shutdown: Arc<Mutex<Option<(usize, oneshot::Sender<()>)>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self {
            durations: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(Mutex::new(None)),
        }
    }

    /// Send on `tx` during the `after`-th sleep
    pub fn shutdown_after(after: usize, tx: oneshot::Sender<()>) -> Self {
        let sleeper = Self::new();
        *sleeper.shutdown.lock().unwrap() = Some((after, tx));
        sleeper
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.durations.lock().unwrap().clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.durations.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let count = {
            let mut durations = self.durations.lock().unwrap();
            durations.push(duration);
            durations.len()
        };

        let mut shutdown = self.shutdown.lock().unwrap();
        if matches!(&*shutdown, Some((after, _)) if *after == count) {
            if let Some((_, tx)) = shutdown.take() {
                let _ = tx.send(());
            }
        }
    }
}

/// Helper to create a minimal MonitorConfig for testing
pub fn minimal_config() -> MonitorConfig {
    MonitorConfig::new(target_mac(), TARGET_IP, INTERFACE)
}

/// Minimal single-shot configuration
pub fn single_shot_config() -> MonitorConfig {
    minimal_config().with_run_mode(RunMode::SingleShot)
}

/// Collects formatted log lines for the current thread
///
/// `#[tokio::test]` runs on a current-thread runtime, so a thread-local
/// default subscriber sees every event the awaited code emits.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.buffer.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Whether some line contains every fragment
    pub fn contains_all(&self, fragments: &[&str]) -> bool {
        self.lines()
            .iter()
            .any(|line| fragments.iter().all(|f| line.contains(f)))
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
