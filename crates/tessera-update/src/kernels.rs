//! Per-block kernels over the independent cell variables of a container.
//!
//! Input and output containers are paired by position: the `n`-th
//! independent cell variable of one is matched with the `n`-th of the
//! other, in ascending label order. Every kernel touches interior cells
//! only and visits them in `(k, j, l, i)` order.
//!
//! Results are computed into a staging buffer while the inputs are
//! read-locked and written back afterwards, so an output may alias one of
//! its inputs.

use tessera_arena::SharedArray;
use tessera_core::{MetadataFlag, Real};
use tessera_data::{BlockInfo, Container, ContainerIterator, Variable};
use tessera_mesh::{IndexDomain, IndexShape};

use crate::error::UpdateError;

/// The block a container is bound to.
pub(crate) fn bound_block(container: &Container) -> Result<&BlockInfo, UpdateError> {
    container
        .block()
        .map(|b| b.as_ref())
        .ok_or(UpdateError::Unbound)
}

/// Independent cell variables of `a` and `b`, paired by position. Every
/// pair must share one shape, and that shape must cover `block`'s cells.
fn paired<'a>(
    block: &BlockInfo,
    a: &'a Container,
    b: &'a Container,
) -> Result<Vec<(&'a Variable, &'a Variable)>, UpdateError> {
    let lhs = ContainerIterator::cells(a, [MetadataFlag::Independent]);
    let rhs = ContainerIterator::cells(b, [MetadataFlag::Independent]);
    if lhs.len() != rhs.len() {
        return Err(UpdateError::MismatchedContainers {
            reason: format!(
                "{} independent variables paired with {}",
                lhs.len(),
                rhs.len()
            ),
        });
    }
    lhs.iter()
        .zip(rhs.iter())
        .map(|(x, y)| {
            if x.shape() != y.shape() {
                return Err(UpdateError::MismatchedContainers {
                    reason: format!(
                        "'{}' {:?} paired with '{}' {:?}",
                        x.label(),
                        x.shape(),
                        y.label(),
                        y.shape()
                    ),
                });
            }
            let expected = block.cell_shape(x.dim(4)?);
            if x.shape() != expected {
                return Err(UpdateError::MismatchedContainers {
                    reason: format!(
                        "'{}' has shape {:?}, block {} needs {:?}",
                        x.label(),
                        x.shape(),
                        block.id(),
                        expected
                    ),
                });
            }
            Ok((x, y))
        })
        .collect()
}

/// The flux of `var` along `dir`, which must extend one face past the
/// variable along that direction.
fn checked_flux(
    container: &Container,
    var: &Variable,
    dir: usize,
) -> Result<SharedArray, UpdateError> {
    let flux = container.flux(var.label(), dir)?;
    let mut expected = var.shape();
    expected[dir - 1] += 1;
    let dims = flux.read_recursive().dims();
    if dims != expected {
        return Err(UpdateError::MismatchedContainers {
            reason: format!(
                "flux {dir} of '{}' has shape {dims:?}, expected {expected:?}",
                var.label()
            ),
        });
    }
    Ok(flux)
}

fn for_each_interior(
    shape: &IndexShape,
    ncomp: usize,
    mut f: impl FnMut(usize, usize, usize, usize),
) {
    let ib = shape.bounds_i(IndexDomain::Interior);
    let jb = shape.bounds_j(IndexDomain::Interior);
    let kb = shape.bounds_k(IndexDomain::Interior);
    for k in kb.iter() {
        for j in jb.iter() {
            for l in 0..ncomp {
                for i in ib.iter() {
                    f(l, k, j, i);
                }
            }
        }
    }
}

fn interior_len(shape: &IndexShape, ncomp: usize) -> usize {
    let ib = shape.bounds_i(IndexDomain::Interior);
    let jb = shape.bounds_j(IndexDomain::Interior);
    let kb = shape.bounds_k(IndexDomain::Interior);
    ncomp * ib.len() * jb.len() * kb.len()
}

fn write_staged(
    container: &Container,
    label: &str,
    shape: &IndexShape,
    ncomp: usize,
    staged: Vec<Real>,
) -> Result<(), UpdateError> {
    let array = container.data(label)?;
    let mut out = array.write();
    let mut values = staged.into_iter();
    for_each_interior(shape, ncomp, |l, k, j, i| {
        if let Some(v) = values.next() {
            out.set(l, k, j, i, v);
        }
    });
    Ok(())
}

/// Write the negated flux divergence of every independent variable of
/// `input` into the matching variable of `dudt`.
///
/// Fluxes along the second and third directions contribute only when the
/// block has at least two and three active dimensions respectively.
pub fn flux_divergence(input: &Container, dudt: &Container) -> Result<(), UpdateError> {
    let block = bound_block(input)?;
    let shape = block.shape();
    let coords = block.coords();
    let ndim = shape.ndim();
    let ib = shape.bounds_i(IndexDomain::Interior);
    let jb = shape.bounds_j(IndexDomain::Interior);
    let kb = shape.bounds_k(IndexDomain::Interior);

    let width = ib.e + 2;
    let mut x1area = vec![0.0; width];
    let mut x2area0 = vec![0.0; width];
    let mut x2area1 = vec![0.0; width];
    let mut x3area0 = vec![0.0; width];
    let mut x3area1 = vec![0.0; width];
    let mut vol = vec![0.0; width];

    let pairs = paired(block, input, dudt)?;
    tracing::trace!(block = %block.id(), variables = pairs.len(), "flux divergence");
    for (q, out) in pairs {
        let ncomp = q.dim(4)?;
        let flux1 = checked_flux(input, q, 1)?;
        let flux2 = (ndim >= 2)
            .then(|| checked_flux(input, q, 2))
            .transpose()?;
        let flux3 = (ndim >= 3)
            .then(|| checked_flux(input, q, 3))
            .transpose()?;

        let staged = {
            let f1 = flux1.read_recursive();
            let f2 = flux2.as_ref().map(|a| a.read_recursive());
            let f3 = flux3.as_ref().map(|a| a.read_recursive());
            let mut staged = Vec::with_capacity(interior_len(shape, ncomp));
            for k in kb.iter() {
                for j in jb.iter() {
                    coords.face1_area(k, j, ib.s, ib.e + 1, &mut x1area);
                    coords.cell_volume(k, j, ib.s, ib.e, &mut vol);
                    if ndim >= 2 {
                        coords.face2_area(k, j, ib.s, ib.e, &mut x2area0);
                        coords.face2_area(k, j + 1, ib.s, ib.e, &mut x2area1);
                    }
                    if ndim >= 3 {
                        coords.face3_area(k, j, ib.s, ib.e, &mut x3area0);
                        coords.face3_area(k + 1, j, ib.s, ib.e, &mut x3area1);
                    }
                    for l in 0..ncomp {
                        for i in ib.iter() {
                            let mut du = x1area[i + 1] * f1.get(l, k, j, i + 1)
                                - x1area[i] * f1.get(l, k, j, i);
                            if let Some(f2) = &f2 {
                                du += x2area1[i] * f2.get(l, k, j + 1, i)
                                    - x2area0[i] * f2.get(l, k, j, i);
                            }
                            if let Some(f3) = &f3 {
                                du += x3area1[i] * f3.get(l, k + 1, j, i)
                                    - x3area0[i] * f3.get(l, k, j, i);
                            }
                            staged.push(-du / vol[i]);
                        }
                    }
                }
            }
            staged
        };
        write_staged(dudt, out.label(), shape, ncomp, staged)?;
    }
    Ok(())
}

/// `out = input + dt * rate` over interior cells.
///
/// `out` may be the same container as `input` or `rate`.
pub fn update_container(
    input: &Container,
    rate: &Container,
    dt: Real,
    out: &Container,
) -> Result<(), UpdateError> {
    let block = bound_block(input)?;
    let shape = block.shape();
    let sources = paired(block, input, rate)?;
    let targets = paired(block, input, out)?;
    for ((q, r), (_, o)) in sources.into_iter().zip(targets) {
        let ncomp = q.dim(4)?;
        let q_arr = input.data(q.label())?;
        let r_arr = rate.data(r.label())?;
        let staged = {
            let qv = q_arr.read_recursive();
            let rv = r_arr.read_recursive();
            let mut staged = Vec::with_capacity(interior_len(shape, ncomp));
            for_each_interior(shape, ncomp, |l, k, j, i| {
                staged.push(qv.get(l, k, j, i) + dt * rv.get(l, k, j, i));
            });
            staged
        };
        write_staged(out, o.label(), shape, ncomp, staged)?;
    }
    Ok(())
}

/// `c1 = weight * c1 + (1 - weight) * c2` over interior cells.
///
/// `weight` is not range-checked; values outside `[0, 1]` extrapolate.
pub fn average_containers(
    c1: &Container,
    c2: &Container,
    weight: Real,
) -> Result<(), UpdateError> {
    let block = bound_block(c1)?;
    let shape = block.shape();
    for (a, b) in paired(block, c1, c2)? {
        let ncomp = a.dim(4)?;
        let a_arr = c1.data(a.label())?;
        let b_arr = c2.data(b.label())?;
        let staged = {
            let av = a_arr.read_recursive();
            let bv = b_arr.read_recursive();
            let mut staged = Vec::with_capacity(interior_len(shape, ncomp));
            for_each_interior(shape, ncomp, |l, k, j, i| {
                staged.push(weight * av.get(l, k, j, i) + (1.0 - weight) * bv.get(l, k, j, i));
            });
            staged
        };
        write_staged(c1, a.label(), shape, ncomp, staged)?;
    }
    Ok(())
}

/// The smallest timestep any package of the container's block allows.
///
/// Returns [`Real::MAX`] when no package supplies an estimate; callers
/// treat that as "no constraint" rather than a usable timestep. An estimate
/// that is zero, negative, NaN or infinite fails with
/// [`UpdateError::InvalidTimestep`].
pub fn estimate_timestep(container: &Container) -> Result<Real, UpdateError> {
    let block = bound_block(container)?;
    let mut min_dt = Real::MAX;
    for package in block.packages().iter() {
        if let Some(dt) = package.estimate_timestep(container) {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(UpdateError::InvalidTimestep {
                    package: package.name().to_string(),
                    value: dt,
                });
            }
            min_dt = min_dt.min(dt);
        }
    }
    Ok(min_dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_arena::{ArenaConfig, ArrayArena};
    use tessera_core::{BlockId, Metadata};
    use tessera_data::Packages;
    use tessera_mesh::UniformCartesian;

    fn block(cells: [usize; 3], ndim: usize) -> Arc<BlockInfo> {
        Arc::new(BlockInfo::new(
            BlockId(0),
            IndexShape::new(cells, 1, ndim).unwrap(),
            Box::new(UniformCartesian::unit()),
            Arc::new(Packages::new()),
        ))
    }

    fn container(info: &Arc<BlockInfo>, labels: &[&str]) -> Container {
        let arena = ArrayArena::new(ArenaConfig::default()).unwrap().into_shared();
        let mut c = Container::with_block(arena, Arc::clone(info));
        for label in labels {
            c.add(
                *label,
                info.cell_shape(1),
                Metadata::new([MetadataFlag::Independent]),
            )
            .unwrap();
        }
        c
    }

    #[test]
    fn interior_visit_order() {
        let shape = IndexShape::new([2, 2, 1], 1, 2).unwrap();
        let mut seen = Vec::new();
        for_each_interior(&shape, 2, |l, k, j, i| seen.push((l, k, j, i)));
        assert_eq!(seen.len(), interior_len(&shape, 2));
        assert_eq!(seen[0], (0, 0, 1, 1));
        assert_eq!(seen[1], (0, 0, 1, 2));
        assert_eq!(seen[2], (1, 0, 1, 1));
    }

    #[test]
    fn unbound_container_rejected() {
        let arena = ArrayArena::new(ArenaConfig::default()).unwrap().into_shared();
        let c = Container::new(arena);
        assert_eq!(estimate_timestep(&c), Err(UpdateError::Unbound));
        assert_eq!(flux_divergence(&c, &c), Err(UpdateError::Unbound));
    }

    #[test]
    fn count_mismatch_rejected() {
        let info = block([4, 1, 1], 1);
        let a = container(&info, &["u", "v"]);
        let b = container(&info, &["u"]);
        assert!(matches!(
            update_container(&a, &a, 1.0, &b),
            Err(UpdateError::MismatchedContainers { .. })
        ));
    }

    #[test]
    fn variable_smaller_than_block_rejected() {
        let info = block([4, 1, 1], 1);
        let arena = ArrayArena::new(ArenaConfig::default()).unwrap().into_shared();
        let mut c = Container::with_block(arena, Arc::clone(&info));
        c.add(
            "u",
            [3, 1, 1, 1, 1, 1],
            Metadata::new([MetadataFlag::Independent]),
        )
        .unwrap();
        for result in [
            update_container(&c, &c, 1.0, &c),
            average_containers(&c, &c, 0.5),
            flux_divergence(&c, &c),
        ] {
            assert!(matches!(
                result,
                Err(UpdateError::MismatchedContainers { .. })
            ));
        }
        assert!(c.data("u").unwrap().read().as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn divergence_of_linear_flux_in_2d() {
        let info = block([3, 3, 1], 2);
        let input = container(&info, &["u"]);
        let dudt = container(&info, &["u"]);
        {
            let f2 = input.flux("u", 2).unwrap();
            let mut f2 = f2.write();
            let [ni, nj, ..] = f2.dims();
            for j in 0..nj {
                for i in 0..ni {
                    f2.set(0, 0, j, i, 2.0 * j as Real);
                }
            }
        }
        flux_divergence(&input, &dudt).unwrap();
        let out = dudt.data("u").unwrap();
        let out = out.read();
        for j in 1..=3 {
            for i in 1..=3 {
                assert_eq!(out.get(0, 0, j, i), -2.0);
            }
        }
        // Ghost cells untouched.
        assert_eq!(out.get(0, 0, 0, 0), 0.0);
    }
}
