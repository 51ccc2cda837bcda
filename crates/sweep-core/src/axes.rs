//! Axis definitions
//!
//! Three axes span the experiment: CPU models, workload sizes (which depend on
//! the CPU model) and benchmarks (shared by every CPU/size pair).
//!
//! A CPU model with no size entry contributes zero jobs. That used to happen
//! silently; [`Axes::validate`] now reports it, and under
//! [`Strictness::Deny`] refuses to go on.

use crate::error::AxisError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Ordered axis values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axes {
    /// CPU models in submission order
    pub cpus: Vec<String>,
    /// Benchmarks run for every CPU/size pair
    pub benchmarks: Vec<String>,
    /// Workload sizes permitted per CPU model. CPUs absent here run nothing.
    #[serde(default)]
    pub sizes: IndexMap<String, Vec<String>>,
}

/// How axis inconsistencies are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Log a warning and skip the affected combinations
    #[default]
    Warn,
    /// Refuse to enumerate
    Deny,
}

/// A disagreement between the CPU list and the size map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", content = "cpu", rename_all = "kebab-case")]
pub enum AxisIssue {
    /// Declared CPU has no size entry
    MissingSizes(String),
    /// Declared CPU maps to an empty size list
    EmptySizes(String),
    /// Size entry for a CPU that is not declared
    OrphanSizes(String),
}

impl AxisIssue {
    #[must_use]
    pub fn cpu(&self) -> &str {
        match self {
            Self::MissingSizes(cpu) | Self::EmptySizes(cpu) | Self::OrphanSizes(cpu) => cpu,
        }
    }
}

impl fmt::Display for AxisIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSizes(cpu) => write!(f, "cpu {cpu} has no size entry"),
            Self::EmptySizes(cpu) => write!(f, "cpu {cpu} has an empty size list"),
            Self::OrphanSizes(cpu) => write!(f, "sizes declared for unknown cpu {cpu}"),
        }
    }
}

/// Result of checking CPU/size consistency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisReport {
    pub issues: Vec<AxisIssue>,
}

impl AxisReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Declared CPU models that will contribute no jobs
    pub fn skipped_cpus(&self) -> impl Iterator<Item = &str> + '_ {
        self.issues.iter().filter_map(|issue| match issue {
            AxisIssue::MissingSizes(cpu) | AxisIssue::EmptySizes(cpu) => Some(cpu.as_str()),
            AxisIssue::OrphanSizes(_) => None,
        })
    }
}

impl Axes {
    #[must_use]
    pub fn new(
        cpus: impl IntoIterator<Item = impl Into<String>>,
        sizes: impl IntoIterator<
            Item = (impl Into<String>, impl IntoIterator<Item = impl Into<String>>),
        >,
        benchmarks: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            cpus: cpus.into_iter().map(Into::into).collect(),
            sizes: sizes
                .into_iter()
                .map(|(cpu, s)| (cpu.into(), s.into_iter().map(Into::into).collect()))
                .collect(),
            benchmarks: benchmarks.into_iter().map(Into::into).collect(),
        }
    }

    /// Axis values of the SPEC full-system experiment
    #[must_use]
    pub fn spec_defaults() -> Self {
        Self::new(
            ["kvm", "atomic", "o3", "timing"],
            [
                ("kvm", vec!["test", "ref"]),
                ("atomic", vec!["test"]),
                ("o3", vec!["test"]),
                ("timing", vec!["test"]),
            ],
            SPEC_BENCHMARKS.iter().copied(),
        )
    }

    /// Compare the CPU list against the size map without failing.
    #[must_use]
    pub fn check(&self) -> AxisReport {
        let mut issues = Vec::new();
        for cpu in &self.cpus {
            match self.sizes.get(cpu) {
                None => issues.push(AxisIssue::MissingSizes(cpu.clone())),
                Some(sizes) if sizes.is_empty() => issues.push(AxisIssue::EmptySizes(cpu.clone())),
                Some(_) => {}
            }
        }
        for cpu in self.sizes.keys() {
            if !self.cpus.contains(cpu) {
                issues.push(AxisIssue::OrphanSizes(cpu.clone()));
            }
        }
        AxisReport { issues }
    }

    /// Validate the axes before enumeration.
    ///
    /// # Errors
    /// - `EmptyAxis` if there are no CPU models or no benchmarks
    /// - `InvalidValue` if a value cannot be a path component
    /// - `Duplicate` if a value repeats on its axis
    /// - `Inconsistent` under [`Strictness::Deny`] when [`Axes::check`] finds issues
    pub fn validate(&self, strictness: Strictness) -> Result<AxisReport, AxisError> {
        if self.cpus.is_empty() {
            return Err(AxisError::EmptyAxis("cpu"));
        }
        if self.benchmarks.is_empty() {
            return Err(AxisError::EmptyAxis("benchmark"));
        }

        check_values("cpu", &self.cpus)?;
        check_values("benchmark", &self.benchmarks)?;
        for sizes in self.sizes.values() {
            check_values("size", sizes)?;
        }

        let report = self.check();
        if report.is_clean() {
            return Ok(report);
        }
        match strictness {
            Strictness::Deny => Err(AxisError::Inconsistent(report.issues)),
            Strictness::Warn => {
                for issue in &report.issues {
                    tracing::warn!(cpu = issue.cpu(), "{issue}; its combinations are skipped");
                }
                Ok(report)
            }
        }
    }

    /// Jobs the matrix will produce: sum over CPUs of sizes times benchmarks
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.cpus
            .iter()
            .filter_map(|cpu| self.sizes.get(cpu))
            .map(Vec::len)
            .sum::<usize>()
            * self.benchmarks.len()
    }
}

fn check_values(axis: &'static str, values: &[String]) -> Result<(), AxisError> {
    let mut seen = HashSet::with_capacity(values.len());
    for value in values {
        let usable = !value.is_empty()
            && value != "."
            && value != ".."
            && !value.contains(['/', '\\'])
            && value.trim() == value;
        if !usable {
            return Err(AxisError::InvalidValue {
                axis,
                value: value.clone(),
            });
        }
        if !seen.insert(value.as_str()) {
            return Err(AxisError::Duplicate {
                axis,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Benchmarks installed on the SPEC disk image
pub const SPEC_BENCHMARKS: [&str; 47] = [
    "503.bwaves_r", "507.cactuBSSN_r", "508.namd_r", "510.parest_r", "511.povray_r", "519.lbm_r",
    "521.wrf_r", "526.blender_r", "527.cam4_r", "538.imagick_r", "544.nab_r", "549.fotonik3d_r",
    "554.roms_r", "997.specrand_fr", "603.bwaves_s", "607.cactuBSSN_s", "619.lbm_s", "621.wrf_s",
    "627.cam4_s", "628.pop2_s", "638.imagick_s", "644.nab_s", "649.fotonik3d_s", "654.roms_s",
    "996.specrand_fs", "500.perlbench_r", "502.gcc_r", "505.mcf_r", "520.omnetpp_r", "523.xalancbmk_r",
    "525.x264_r", "531.deepsjeng_r", "541.leela_r", "548.exchange2_r", "557.xz_r", "999.specrand_ir",
    "600.perlbench_s", "602.gcc_s", "605.mcf_s", "620.omnetpp_s", "623.xalancbmk_s", "625.x264_s",
    "631.deepsjeng_s", "641.leela_s", "648.exchange2_s", "657.xz_s", "998.specrand_is",
];
