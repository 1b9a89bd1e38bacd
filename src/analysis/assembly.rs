//! Global stiffness assembly and the partitioned linear solve

use log::debug;
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use super::supports::BoundaryMap;
use crate::error::BridgeResult;
use crate::math::{self, csr_matvec, Mat6, SparseCholeskySolver, SparseMatrixBuilder};
use crate::mesh::Mesh;

/// Global stiffness matrix of one element, `Tᵀ · k · T`
pub fn element_global_stiffness(mesh: &Mesh, element: usize) -> BridgeResult<Mat6> {
    let element = &mesh.elements[element];
    let section = mesh.section(element);
    let k_local = math::beam_local_stiffness(element.length, section.e, section.a, section.i)?;
    let (cos, sin) = element.direction_cosines();
    let t = math::beam_transformation_matrix(cos, sin);
    Ok(t.transpose() * k_local * t)
}

/// Assemble the global stiffness matrix, including any pier springs
pub fn global_stiffness(mesh: &Mesh, boundary: &BoundaryMap) -> BridgeResult<CsrMatrix<f64>> {
    let mut builder = SparseMatrixBuilder::new(mesh.dof_count());

    for (e, element) in mesh.elements.iter().enumerate() {
        let k = element_global_stiffness(mesh, e)?;
        builder.add_element_matrix(&element.dofs(), &k);
    }
    for &(dof, k) in &boundary.springs {
        builder.add(dof, dof, k);
    }

    let csr = builder.to_csr();
    debug!(
        "Global stiffness: {} DOFs, {} stored entries",
        builder.size(),
        csr.nnz()
    );
    Ok(csr)
}

/// Displacements and support forces of a solved system
#[derive(Debug, Clone)]
pub struct LinearSolution {
    /// Full displacement vector
    pub displacements: DVector<f64>,
    /// Support force per DOF; zero on DOFs with no support
    pub reactions: DVector<f64>,
}

/// Solve `K x = f` with constrained DOFs eliminated.
///
/// `K_FF x_F = f_F - K_FC x_C`, then `R = K x - f` on constrained DOFs
/// and `R = -k v` on spring DOFs.
pub fn solve_partitioned(
    k: &CsrMatrix<f64>,
    f: &DVector<f64>,
    boundary: &BoundaryMap,
    pivot_tolerance: f64,
) -> BridgeResult<LinearSolution> {
    let n = k.nrows();
    let free = boundary.free_dofs();

    // Global DOF -> position in the free system
    let mut free_index = vec![None; n];
    for (i, &dof) in free.iter().enumerate() {
        free_index[dof] = Some(i);
    }

    let mut x = boundary.prescribed();

    if !free.is_empty() {
        let mut k_ff = SparseMatrixBuilder::new(free.len());
        let mut rhs = DVector::from_iterator(free.len(), free.iter().map(|&d| f[d]));

        for (row, col, &value) in k.triplet_iter() {
            let Some(r) = free_index[row] else { continue };
            match free_index[col] {
                Some(c) => k_ff.add(r, c, value),
                None => rhs[r] -= value * x[col],
            }
        }

        let mut solver = SparseCholeskySolver::new(&k_ff.to_csr());
        solver.factorize(pivot_tolerance)?;
        let x_free = solver.solve(&rhs);

        for (i, &dof) in free.iter().enumerate() {
            x[dof] = x_free[i];
        }
    }

    let residual = csr_matvec(k, &x) - f;
    let mut reactions = DVector::zeros(n);
    for dof in boundary.constrained_dofs() {
        reactions[dof] = residual[dof];
    }
    for &(dof, stiffness) in &boundary.springs {
        reactions[dof] = -stiffness * x[dof];
    }

    debug!(
        "Solved {} free / {} constrained DOFs",
        free.len(),
        n - free.len()
    );

    Ok(LinearSolution {
        displacements: x,
        reactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::supports::{SupportResolver, VerticalSupport};
    use crate::elements::PierConfig;
    use crate::error::BridgeError;
    use crate::mesh::MeshBuilder;
    use approx::assert_relative_eq;

    fn settlement(rate: f64) -> VerticalSupport {
        VerticalSupport::Settlement { rate }
    }

    #[test]
    fn test_global_stiffness_symmetric() {
        let mesh = MeshBuilder::new(10.0, 4).build().unwrap();
        let boundary = BoundaryMap::new(mesh.dof_count());
        let k = global_stiffness(&mesh, &boundary).unwrap();
        assert_eq!(k.nrows(), 15);
        for (r, c, v) in k.triplet_iter() {
            let mirror = k.get_entry(c, r).map(|e| e.into_value()).unwrap_or(0.0);
            assert_relative_eq!(*v, mirror, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_cantilever_tip_load() {
        // δ = PL³/3EI, θ = PL²/2EI at the tip
        let mesh = MeshBuilder::new(4.0, 8).build().unwrap();
        let section = mesh.sections[0];
        let boundary = SupportResolver::new(&mesh, 1e-6)
            .resolve(&[PierConfig::fixed(0.0, 5.0)], settlement(0.0))
            .unwrap();
        let k = global_stiffness(&mesh, &boundary).unwrap();
        let mut f = DVector::zeros(mesh.dof_count());
        f[8 * 3 + 1] = -1000.0;

        let solution = solve_partitioned(&k, &f, &boundary, 1e-10).unwrap();
        let ei = section.ei();
        assert_relative_eq!(
            solution.displacements[8 * 3 + 1],
            -1000.0 * 64.0 / (3.0 * ei),
            max_relative = 1e-6
        );
        assert_relative_eq!(
            solution.displacements[8 * 3 + 2],
            -1000.0 * 16.0 / (2.0 * ei),
            max_relative = 1e-6
        );
        assert_relative_eq!(solution.reactions[1], 1000.0, max_relative = 1e-6);
        assert_relative_eq!(solution.reactions[2], 4000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_imposed_settlement_is_honoured() {
        let mesh = MeshBuilder::new(20.0, 10).build().unwrap();
        let piers = [
            PierConfig::fixed_pin(0.0, 10.0),
            PierConfig::roller(1.0, 5.0),
        ];
        let boundary = SupportResolver::new(&mesh, 1e-6)
            .resolve(&piers, settlement(0.002))
            .unwrap();
        let k = global_stiffness(&mesh, &boundary).unwrap();
        let f = DVector::zeros(mesh.dof_count());

        let solution = solve_partitioned(&k, &f, &boundary, 1e-10).unwrap();
        assert_relative_eq!(solution.displacements[31], 0.01, max_relative = 1e-9);
        // Simply supported: rigid tilt, no reactions
        assert_relative_eq!(solution.displacements[16], 0.005, max_relative = 1e-6);
        assert!(solution.reactions.amax() < 1.0);
    }

    #[test]
    fn test_unsupported_is_singular() {
        let mesh = MeshBuilder::new(10.0, 4).build().unwrap();
        let boundary = BoundaryMap::new(mesh.dof_count());
        let k = global_stiffness(&mesh, &boundary).unwrap();
        let f = DVector::zeros(mesh.dof_count());
        let err = solve_partitioned(&k, &f, &boundary, 1e-10).unwrap_err();
        assert!(matches!(err, BridgeError::SingularSystem(_)));
    }

    #[test]
    fn test_spring_reactions() {
        let mesh = MeshBuilder::new(10.0, 4).build().unwrap();
        let piers = [PierConfig::fixed_pin(0.0, 10.0), PierConfig::roller(1.0, 10.0)];
        let boundary = SupportResolver::new(&mesh, 1e-6)
            .resolve(
                &piers,
                VerticalSupport::Elastic {
                    modulus: 1e6,
                    area: 1.0,
                },
            )
            .unwrap();
        let k = global_stiffness(&mesh, &boundary).unwrap();
        let mut f = DVector::zeros(mesh.dof_count());
        f[2 * 3 + 1] = -500.0;

        let solution = solve_partitioned(&k, &f, &boundary, 1e-10).unwrap();
        // Both springs carry half and compress by F/k
        assert_relative_eq!(solution.reactions[1], 250.0, max_relative = 1e-6);
        assert_relative_eq!(solution.reactions[13], 250.0, max_relative = 1e-6);
        assert_relative_eq!(solution.displacements[1], -250.0 / 1e5, max_relative = 1e-6);
    }
}
