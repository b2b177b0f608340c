//! Compute device selection.
//!
//! The device is resolved once at startup and applied to every task. Inference
//! itself runs in the pipeline server; the resolved device is forwarded with
//! each request so the server places the model accordingly.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::llm::core::errors::LlmError;

/// Device node exposed by the NVIDIA driver when an accelerator is present.
const NVIDIA_CTL_NODE: &str = "/dev/nvidiactl";

/// Environment variable restricting visible CUDA devices.
const CUDA_VISIBLE_DEVICES_ENV: &str = "CUDA_VISIBLE_DEVICES";

/// Configured device preference.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreference {
    /// Use an accelerator if one is detected, else the CPU.
    #[default]
    Auto,
    /// Always use the CPU.
    Cpu,
    /// Always use the accelerator.
    Accelerator,
}

impl FromStr for DevicePreference {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "accelerator" | "gpu" | "cuda" => Ok(Self::Accelerator),
            other => Err(LlmError::InvalidConfig(format!(
                "unknown device preference: {other}"
            ))),
        }
    }
}

/// Resolved compute device.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeDevice {
    /// General-purpose processor.
    Cpu,
    /// GPU accelerator.
    Accelerator,
}

impl ComputeDevice {
    /// Resolve a preference into a concrete device.
    #[must_use]
    pub fn resolve(preference: DevicePreference) -> Self {
        match preference {
            DevicePreference::Cpu => Self::Cpu,
            DevicePreference::Accelerator => Self::Accelerator,
            DevicePreference::Auto => {
                let visible = std::env::var(CUDA_VISIBLE_DEVICES_ENV).ok();
                Self::detect(Path::new(NVIDIA_CTL_NODE).exists(), visible.as_deref())
            }
        }
    }

    /// Detection rule, split out from the environment probe.
    fn detect(driver_present: bool, cuda_visible_devices: Option<&str>) -> Self {
        match cuda_visible_devices.map(str::trim) {
            Some("" | "-1") => Self::Cpu,
            Some(_) => Self::Accelerator,
            None if driver_present => Self::Accelerator,
            None => Self::Cpu,
        }
    }

    /// Whether the device is an accelerator.
    #[must_use]
    pub const fn is_accelerator(self) -> bool {
        matches!(self, Self::Accelerator)
    }

    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Accelerator => "accelerator",
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
