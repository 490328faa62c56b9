//! Partition-wide kernels: the per-block kernels applied to every block
//! of a [`MeshData`], one block per rayon task.
//!
//! Blocks own disjoint arrays, so the per-block work runs concurrently.
//! Two partitions are paired block by block and must span the same number
//! of blocks.

use rayon::prelude::*;

use tessera_core::Real;
use tessera_data::{Container, MeshData};

use crate::error::UpdateError;
use crate::fill::FillDerivedRegistry;
use crate::kernels;

fn check_same_blocks(a: &MeshData, b: &MeshData) -> Result<(), UpdateError> {
    if a.num_blocks() == b.num_blocks() {
        Ok(())
    } else {
        Err(UpdateError::MismatchedContainers {
            reason: format!(
                "partition of {} blocks paired with {}",
                a.num_blocks(),
                b.num_blocks()
            ),
        })
    }
}

fn for_each_block<F>(md: &MeshData, f: F) -> Result<(), UpdateError>
where
    F: Fn(usize, &Container) -> Result<(), UpdateError> + Sync,
{
    (0..md.num_blocks())
        .into_par_iter()
        .try_for_each(|b| f(b, md.block_data(b)?))
}

/// [`kernels::flux_divergence`] on every block.
pub fn flux_divergence(input: &MeshData, dudt: &MeshData) -> Result<(), UpdateError> {
    check_same_blocks(input, dudt)?;
    for_each_block(input, |b, c| kernels::flux_divergence(c, dudt.block_data(b)?))
}

/// [`kernels::update_container`] on every block.
pub fn update_mesh_data(
    input: &MeshData,
    rate: &MeshData,
    dt: Real,
    out: &MeshData,
) -> Result<(), UpdateError> {
    check_same_blocks(input, rate)?;
    check_same_blocks(input, out)?;
    for_each_block(input, |b, c| {
        kernels::update_container(c, rate.block_data(b)?, dt, out.block_data(b)?)
    })
}

/// [`kernels::average_containers`] on every block.
pub fn average_mesh_data(c1: &MeshData, c2: &MeshData, weight: Real) -> Result<(), UpdateError> {
    check_same_blocks(c1, c2)?;
    for_each_block(c1, |b, c| {
        kernels::average_containers(c, c2.block_data(b)?, weight)
    })
}

/// The smallest per-block estimate, [`Real::MAX`] when nothing constrains
/// the step. Any invalid package estimate fails the whole partition with
/// [`UpdateError::InvalidTimestep`].
pub fn estimate_timestep(md: &MeshData) -> Result<Real, UpdateError> {
    let estimates = (0..md.num_blocks())
        .into_par_iter()
        .map(|b| kernels::estimate_timestep(md.block_data(b)?))
        .collect::<Result<Vec<Real>, UpdateError>>()?;
    Ok(estimates.into_iter().fold(Real::MAX, Real::min))
}

/// [`FillDerivedRegistry::fill_derived`] on every block.
pub fn fill_derived(registry: &FillDerivedRegistry, md: &MeshData) -> Result<(), UpdateError> {
    for_each_block(md, |_, c| registry.fill_derived(c))
}
