//! Compute device detection for Whisper inference
//!
//! GPU support in whisper.cpp is a compile-time backend, so availability is
//! decided by the enabled cargo feature (`cuda` or `metal`) plus a runtime
//! escape hatch for forcing CPU inference on machines where the compiled
//! backend misbehaves.

use tracing::info;

/// Environment variable forcing CPU inference even when a GPU backend is compiled in
pub const FORCE_CPU_ENV: &str = "WHISPER_CLI_FORCE_CPU";

/// Selected compute device and the precision mode that goes with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Whether an accelerator backend is usable
    pub gpu_available: bool,
    /// Device identifier reported to the caller
    pub device: &'static str,
    /// Numeric precision mode reported to the caller
    pub compute_type: &'static str,
}

impl DeviceProfile {
    /// Detect the best available compute device
    pub fn detect() -> Self {
        let backend = if cfg!(feature = "cuda") {
            Some("cuda")
        } else if cfg!(feature = "metal") {
            Some("metal")
        } else {
            None
        };
        let force_cpu = std::env::var_os(FORCE_CPU_ENV).is_some();

        let profile = Self::resolve(backend, force_cpu);
        info!(
            "gpu available: {}, device: {}, compute_type: {}",
            profile.gpu_available, profile.device, profile.compute_type
        );
        profile
    }

    fn resolve(backend: Option<&'static str>, force_cpu: bool) -> Self {
        match backend {
            Some(device) if !force_cpu => Self {
                gpu_available: true,
                device,
                compute_type: "float16",
            },
            _ => Self {
                gpu_available: false,
                device: "cpu",
                compute_type: "int8",
            },
        }
    }
}
