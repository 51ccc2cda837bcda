//! Stock artifact set of the SPEC full-system experiment
//!
//! Registers, in dependency order, everything a run of the experiment refers
//! to: the experiments checkout, the gem5 sources and binary, the `m5` guest
//! utility, packer, the SPEC disk image and the Linux kernel.

use crate::descriptor::{ArtifactHandle, ArtifactKind, ArtifactSpec};
use crate::error::ArtifactError;
use crate::graph::{ArtifactGraph, ArtifactGraphBuilder};

pub const GEM5_VERSION: &str = "20.1.0.2";
pub const KERNEL_VERSION: &str = "4.19.83";
pub const RESOURCES_COMMIT: &str = "cee972a1727abd80924dad73d9f3b5cf0f13012d";

/// Handles of the stock artifacts, by role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentArtifacts {
    pub experiments_repo: ArtifactHandle,
    pub gem5_repo: ArtifactHandle,
    pub gem5_binary: ArtifactHandle,
    pub m5_binary: ArtifactHandle,
    pub packer: ArtifactHandle,
    pub disk_image: ArtifactHandle,
    pub linux_binary: ArtifactHandle,
}

/// Build the artifact graph of the experiment.
///
/// # Errors
/// Only fails if the registrations below are inconsistent with each other.
pub fn spec_experiment_artifacts() -> Result<(ArtifactGraph, ExperimentArtifacts), ArtifactError> {
    let mut builder = ArtifactGraphBuilder::new();

    let experiments_repo = builder.register(
        ArtifactSpec::new("spec2006 Experiment", ArtifactKind::GitRepo)
            .with_command(format!(
                "
                git clone https://gem5.googlesource.com/public/gem5-resources
                cd gem5-resources
                git checkout {RESOURCES_COMMIT}
                cd src/spec-2006
                git init
                git remote add origin https://github.com/yllekn/spec2006-experiments.git
                "
            ))
            .with_path("./")
            .with_cwd("./")
            .with_documentation(format!(
                "
                local repo to run spec 2006 experiments with gem5 full system mode;
                resources cloned from https://gem5.googlesource.com/public/gem5-resources upto commit {RESOURCES_COMMIT} of stable branch
                "
            )),
    )?;

    let gem5_repo = builder.register(
        ArtifactSpec::new("gem5", ArtifactKind::GitRepo)
            .with_command(format!(
                "
                git clone -b v{GEM5_VERSION} https://gem5.googlesource.com/public/gem5
                cd gem5
                scons build/X86/gem5.opt -j8
                "
            ))
            .with_path("gem5/")
            .with_cwd("./")
            .with_documentation(format!("cloned gem5 v{GEM5_VERSION}")),
    )?;

    let gem5_binary = builder.register(
        ArtifactSpec::new(format!("gem5-{GEM5_VERSION}"), ArtifactKind::SimulatorBinary)
            .with_command("scons build/X86/gem5.opt -j8")
            .with_path("gem5/build/X86/gem5.opt")
            .with_cwd("gem5/")
            .with_input(&gem5_repo)
            .with_documentation(format!("compiled gem5 v{GEM5_VERSION} binary")),
    )?;

    let m5_binary = builder.register(
        ArtifactSpec::new("m5", ArtifactKind::Binary)
            .with_command("scons build/x86/out/m5")
            .with_path("gem5/util/m5/build/x86/out/m5")
            .with_cwd("gem5/util/m5")
            .with_input(&gem5_repo)
            .with_documentation("m5 utility"),
    )?;

    let packer = builder.register(
        ArtifactSpec::new("packer", ArtifactKind::Binary)
            .with_command(
                "
                wget https://releases.hashicorp.com/packer/1.6.6/packer_1.6.6_linux_amd64.zip;
                unzip packer_1.6.6_linux_amd64.zip;
                ",
            )
            .with_path("disk-image/packer")
            .with_cwd("disk-image")
            .with_documentation(
                "Program to build disk images. Downloaded from https://www.packer.io/.",
            ),
    )?;

    let disk_image = builder.register(
        ArtifactSpec::new("spec-2006", ArtifactKind::DiskImage)
            .with_command("./packer build spec-2006/spec-2006.json")
            .with_path("disk-image/spec-2006/spec-2006-image/spec-2006")
            .with_cwd("disk-image/")
            .with_input(&packer)
            .with_input(&experiments_repo)
            .with_input(&m5_binary)
            .with_documentation(
                "Ubuntu Server with SPEC 2006 installed, m5 binary installed and root auto login",
            ),
    )?;

    let linux_binary = builder.register(
        ArtifactSpec::new(format!("vmlinux-{KERNEL_VERSION}"), ArtifactKind::Kernel)
            .with_command(format!(
                "wget http://dist.gem5.org/dist/v20-1/kernels/x86/static/vmlinux-{KERNEL_VERSION}"
            ))
            .with_path(format!("/vmlinux-{KERNEL_VERSION}"))
            .with_cwd("./")
            .with_input(&experiments_repo)
            .with_documentation(format!("kernel binary for v{KERNEL_VERSION}")),
    )?;

    let handles = ExperimentArtifacts {
        experiments_repo,
        gem5_repo,
        gem5_binary,
        m5_binary,
        packer,
        disk_image,
        linux_binary,
    };
    Ok((builder.build(), handles))
}
