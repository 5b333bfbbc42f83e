//! Backend selection.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type CpuBackend = burn::backend::NdArray;
pub type GpuBackend = burn::backend::Wgpu;

pub type CpuAutodiff = burn::backend::Autodiff<CpuBackend>;
pub type GpuAutodiff = burn::backend::Autodiff<GpuBackend>;

/// Which burn backend a command runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// CPU via ndarray; always available.
    #[default]
    NdArray,

    /// GPU via wgpu.
    Wgpu,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NdArray => "ndarray",
            Self::Wgpu    => "wgpu",
        }
    }

    pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
        burn::backend::ndarray::NdArrayDevice::Cpu
    }

    pub fn gpu_device() -> burn::backend::wgpu::WgpuDevice {
        burn::backend::wgpu::WgpuDevice::default()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndarray" | "cpu" => Ok(Self::NdArray),
            "wgpu"    | "gpu" => Ok(Self::Wgpu),
            other => Err(format!("unknown backend '{other}' (expected 'ndarray' or 'wgpu')")),
        }
    }
}
