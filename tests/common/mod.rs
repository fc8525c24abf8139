//! Shared test fixtures.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use magikplat::{ArmCpuInfo, Error, HostInfo, Platform, Result};

/// Deterministic [`HostInfo`] with call counters.
#[derive(Clone)]
pub struct StubHost {
    pub os: String,
    pub arch: String,
    pub os_version: Option<String>,
    pub arm: std::result::Result<ArmCpuInfo, String>,
    pub features: std::result::Result<HashSet<String>, String>,
    pub arm_calls: Arc<AtomicUsize>,
    pub feature_calls: Arc<AtomicUsize>,
}

impl StubHost {
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            os_version: None,
            arm: Err("no arm identification".to_string()),
            features: Ok(HashSet::new()),
            arm_calls: Arc::new(AtomicUsize::new(0)),
            feature_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn linux_amd64() -> Self {
        Self::new("linux", "amd64")
    }

    pub fn linux_arm(arch: &str, cpu_architecture: &str) -> Self {
        Self::new("linux", arch).with_arm(cpu_architecture, None)
    }

    pub fn windows(os_version: &str) -> Self {
        let mut host = Self::new("windows", "amd64");
        host.os_version = Some(os_version.to_string());
        host
    }

    pub fn with_arm(mut self, cpu_architecture: &str, model_name: Option<&str>) -> Self {
        self.arm = Ok(ArmCpuInfo {
            architecture: cpu_architecture.to_string(),
            model_name: model_name.map(String::from),
        });
        self
    }

    pub fn with_features(mut self, tiers: &[&[&str]]) -> Self {
        self.features = Ok(tiers
            .iter()
            .flat_map(|tier| tier.iter().map(|f| f.to_string()))
            .collect());
        self
    }

    pub fn failing_features(mut self, reason: &str) -> Self {
        self.features = Err(reason.to_string());
        self
    }
}

impl HostInfo for StubHost {
    fn os(&self) -> String {
        self.os.clone()
    }

    fn architecture(&self) -> String {
        self.arch.clone()
    }

    fn os_version(&self) -> Option<String> {
        self.os_version.clone()
    }

    fn arm_cpu(&self) -> Result<ArmCpuInfo> {
        self.arm_calls.fetch_add(1, Ordering::SeqCst);
        self.arm.clone().map_err(Error::Detection)
    }

    fn amd64_features(&self) -> Result<HashSet<String>> {
        self.feature_calls.fetch_add(1, Ordering::SeqCst);
        self.features.clone().map_err(Error::Detection)
    }
}

pub fn windows(os_version: &str) -> Platform {
    Platform::new("windows", "amd64").with_os_version(os_version)
}

pub fn linux(arch: &str) -> Platform {
    Platform::new("linux", arch)
}
