//! Mathematical utilities for beam FEA calculations

pub mod sparse;

use nalgebra::{SMatrix, SVector};

use crate::error::{BridgeError, BridgeResult};

pub use sparse::{csr_matvec, SparseCholeskySolver, SparseMatrixBuilder};

/// 6x6 matrix for element stiffness `[u_i, v_i, θ_i, u_j, v_j, θ_j]`
pub type Mat6 = SMatrix<f64, 6, 6>;
/// 6-element vector for element forces/displacements
pub type Vec6 = SVector<f64, 6>;

/// Gauss-Legendre abscissae for 2 points on [-1, 1]
const GAUSS_2: [f64; 2] = [-0.577_350_269_189_625_8, 0.577_350_269_189_625_8];

/// Compute the local stiffness matrix for a 2D Euler-Bernoulli beam element
///
/// # Arguments
/// * `length` - Element length
/// * `e` - Modulus of elasticity
/// * `a` - Cross-sectional area
/// * `i` - Second moment of area
///
/// # Returns
/// 6x6 local stiffness matrix
pub fn beam_local_stiffness(length: f64, e: f64, a: f64, i: f64) -> BridgeResult<Mat6> {
    for (name, value) in [("length", length), ("E", e), ("A", a), ("I", i)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(BridgeError::InvalidConfig(format!(
                "element {name} must be positive, got {value}"
            )));
        }
    }

    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let ei_l3 = e * i / l3;
    let ei_l2 = e * i / l2;
    let ei_l = e * i / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,   0.0,          0.0,         -ea_l,  0.0,          0.0,
        // Row 1: shear at i
        0.0,    12.0*ei_l3,   6.0*ei_l2,   0.0,    -12.0*ei_l3,  6.0*ei_l2,
        // Row 2: moment at i
        0.0,    6.0*ei_l2,    4.0*ei_l,    0.0,    -6.0*ei_l2,   2.0*ei_l,
        // Row 3: axial at j
        -ea_l,  0.0,          0.0,         ea_l,   0.0,          0.0,
        // Row 4: shear at j
        0.0,    -12.0*ei_l3,  -6.0*ei_l2,  0.0,    12.0*ei_l3,   -6.0*ei_l2,
        // Row 5: moment at j
        0.0,    6.0*ei_l2,    2.0*ei_l,    0.0,    -6.0*ei_l2,   4.0*ei_l,
    ];

    Ok(Mat6::from_row_slice(&data))
}

/// Compute the transformation matrix for a 2D beam element
///
/// # Arguments
/// * `cos` - Cosine of the element angle to global X
/// * `sin` - Sine of the element angle to global X
///
/// # Returns
/// 6x6 matrix mapping global to local DOFs (`d_local = T * d_global`)
pub fn beam_transformation_matrix(cos: f64, sin: f64) -> Mat6 {
    let mut t = Mat6::zeros();

    for offset in [0, 3] {
        t[(offset, offset)] = cos;
        t[(offset, offset + 1)] = sin;
        t[(offset + 1, offset)] = -sin;
        t[(offset + 1, offset + 1)] = cos;
        t[(offset + 2, offset + 2)] = 1.0;
    }

    t
}

/// Compute fixed end reactions for a transverse point load
///
/// # Arguments
/// * `p` - Load magnitude (positive = local +y)
/// * `a` - Distance from i-node to load
/// * `length` - Element length
pub fn fer_point_load(p: f64, a: f64, length: f64) -> Vec6 {
    let l = length;
    let b = l - a;
    let l2 = l * l;
    let l3 = l2 * l;

    let mut fer = Vec6::zeros();
    fer[1] = -p * b * b * (3.0 * a + b) / l3;
    fer[2] = -p * a * b * b / l2;
    fer[4] = -p * a * a * (a + 3.0 * b) / l3;
    fer[5] = p * a * a * b / l2;
    fer
}

/// Compute fixed end reactions for a transverse uniform load over the full element
///
/// # Arguments
/// * `w` - Load intensity (force per unit length, positive = local +y)
/// * `length` - Element length
pub fn fer_uniform_load(w: f64, length: f64) -> Vec6 {
    let l = length;
    let l2 = l * l;

    let mut fer = Vec6::zeros();
    fer[1] = -w * l / 2.0;
    fer[2] = -w * l2 / 12.0;
    fer[4] = -w * l / 2.0;
    fer[5] = w * l2 / 12.0;
    fer
}

/// Compute fixed end reactions for a uniform load over `[x1, x2]` of the element
///
/// The point-load reactions are cubic in the load position, so two Gauss
/// points integrate them exactly.
pub fn fer_partial_uniform_load(w: f64, x1: f64, x2: f64, length: f64) -> Vec6 {
    let half = 0.5 * (x2 - x1);
    let mid = 0.5 * (x1 + x2);

    GAUSS_2
        .iter()
        .map(|xi| fer_point_load(w * half, mid + half * xi, length))
        .fold(Vec6::zeros(), |acc, f| acc + f)
}
