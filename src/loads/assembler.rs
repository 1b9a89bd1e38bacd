//! Load assembler - converts loads into equivalent nodal forces

use log::debug;
use nalgebra::DVector;

use super::load::{Load, VehicleLoad};
use crate::elements::DOF_V;
use crate::error::{BridgeError, BridgeResult};
use crate::math::{self, Vec6};
use crate::mesh::Mesh;

/// Loads acting between the ends of one element
#[derive(Debug, Clone, Default)]
pub struct ElementLoading {
    /// Summed fixed end reactions in local coordinates
    pub fer: Vec6,
    /// Interior point loads `(distance from i-node, magnitude)`
    pub point_loads: Vec<(f64, f64)>,
    /// Uniform segments `(start, end, intensity)` in local coordinates
    pub segments: Vec<(f64, f64, f64)>,
}

impl ElementLoading {
    /// Resultant of the applied loads over `[0, x]`
    pub fn shear_increment(&self, x: f64) -> f64 {
        let points: f64 = self
            .point_loads
            .iter()
            .filter(|(a, _)| *a <= x)
            .map(|(_, p)| p)
            .sum();
        let segments: f64 = self
            .segments
            .iter()
            .filter(|(a, _, _)| *a < x)
            .map(|(a, b, w)| w * (b.min(x) - a))
            .sum();
        points + segments
    }

    /// Moment about the section at `x` of the applied loads over `[0, x]`
    pub fn moment_increment(&self, x: f64) -> f64 {
        let points: f64 = self
            .point_loads
            .iter()
            .filter(|(a, _)| *a <= x)
            .map(|(a, p)| p * (x - a))
            .sum();
        let segments: f64 = self
            .segments
            .iter()
            .filter(|(a, _, _)| *a < x)
            .map(|(a, b, w)| {
                let e = b.min(x);
                // ∫ w (x - s) ds over [a, e]
                w * (e - a) * (x - 0.5 * (a + e))
            })
            .sum();
        points + segments
    }
}

/// Global load vector plus the per-element data needed for post-processing
#[derive(Debug, Clone)]
pub struct AssembledLoads {
    /// Equivalent nodal loads (`3 * n_nodes`)
    pub nodal: DVector<f64>,
    /// One entry per mesh element
    pub elements: Vec<ElementLoading>,
    /// Sum of applied vertical forces in N
    pub total_vertical: f64,
}

/// Accumulates loads onto a mesh
pub struct LoadAssembler<'a> {
    mesh: &'a Mesh,
    loads: AssembledLoads,
}

impl<'a> LoadAssembler<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            loads: AssembledLoads {
                nodal: DVector::zeros(mesh.dof_count()),
                elements: vec![ElementLoading::default(); mesh.elements.len()],
                total_vertical: 0.0,
            },
        }
    }

    /// Check a load against the deck extent without applying it
    pub fn validate(&self, load: &Load) -> BridgeResult<()> {
        match load {
            Load::Point {
                magnitude,
                position,
            } => {
                check_magnitude(*magnitude)?;
                self.check_position(position.resolve(self.mesh.length))?;
            }
            Load::Distributed {
                magnitude_per_length,
                start,
                end,
            } => {
                check_magnitude(*magnitude_per_length)?;
                let (x1, x2) = (start.resolve(self.mesh.length), end.resolve(self.mesh.length));
                self.check_position(x1)?;
                self.check_position(x2)?;
                if x2 - x1 <= self.mesh.tolerance() {
                    return Err(BridgeError::InvalidLoad(format!(
                        "distributed load range [{x1}, {x2}] is empty"
                    )));
                }
            }
            Load::Vehicle(vehicle) => {
                vehicle.validate()?;
                self.check_position(vehicle.position.resolve(self.mesh.length))?;
            }
        }
        Ok(())
    }

    /// Apply one load
    pub fn add(&mut self, load: &Load) -> BridgeResult<()> {
        self.validate(load)?;
        let length = self.mesh.length;

        match load {
            Load::Point {
                magnitude,
                position,
            } => self.add_point(*magnitude, position.resolve(length)),
            Load::Distributed {
                magnitude_per_length,
                start,
                end,
            } => self.add_distributed(
                *magnitude_per_length,
                start.resolve(length),
                end.resolve(length),
            ),
            Load::Vehicle(vehicle) => self.add_vehicle(vehicle),
        }
        Ok(())
    }

    /// Apply the deck self-weight as a downward uniform load on every element
    pub fn add_self_weight(&mut self, gravity: f64) {
        for (e, element) in self.mesh.elements.iter().enumerate() {
            let w = -self.mesh.section(element).weight_per_length(gravity);
            self.add_segment(e, 0.0, element.length, w);
        }
    }

    pub fn finish(self) -> AssembledLoads {
        debug!(
            "Load vector assembled: total vertical load {:.3} N",
            self.loads.total_vertical
        );
        self.loads
    }

    fn check_position(&self, x: f64) -> BridgeResult<()> {
        let tol = self.mesh.tolerance();
        if !x.is_finite() || x < -tol || x > self.mesh.length + tol {
            return Err(BridgeError::InvalidLoad(format!(
                "position {x} m lies outside [0, {}]",
                self.mesh.length
            )));
        }
        Ok(())
    }

    fn add_point(&mut self, p: f64, x: f64) {
        let x = x.clamp(0.0, self.mesh.length);
        let node = self.mesh.nearest_node(x);

        if (node.x - x).abs() <= self.mesh.tolerance() {
            self.loads.nodal[node.dof(DOF_V)] += p;
        } else {
            let e = self.mesh.element_at(x);
            let element = self.mesh.elements[e];
            let a = x - element.x_i;
            let fer = math::fer_point_load(p, a, element.length);
            self.scatter_fer(e, &fer);
            self.loads.elements[e].point_loads.push((a, p));
        }
        self.loads.total_vertical += p;
    }

    fn add_distributed(&mut self, w: f64, x1: f64, x2: f64) {
        let tol = self.mesh.tolerance();
        let (x1, x2) = (x1.max(0.0), x2.min(self.mesh.length));

        for (e, element) in self.mesh.elements.iter().enumerate() {
            let s1 = x1.max(element.x_i);
            let s2 = x2.min(element.x_j());
            if s2 - s1 > tol {
                let (a, b) = (s1 - element.x_i, s2 - element.x_i);
                let (a, b) = if a <= tol && element.length - b <= tol {
                    (0.0, element.length)
                } else {
                    (a, b)
                };
                self.add_segment(e, a, b, w);
            }
        }
    }

    fn add_vehicle(&mut self, vehicle: &VehicleLoad) {
        let axles = vehicle.axles_on_deck(self.mesh.length, self.mesh.tolerance());
        if axles.len() < vehicle.axle_loads.len() {
            debug!(
                "{} of {} axles are off the deck",
                vehicle.axle_loads.len() - axles.len(),
                vehicle.axle_loads.len()
            );
        }
        for (x, p) in axles {
            self.add_point(p, x);
        }
    }

    fn add_segment(&mut self, e: usize, a: f64, b: f64, w: f64) {
        let length = self.mesh.elements[e].length;
        let fer = if a == 0.0 && b == length {
            math::fer_uniform_load(w, length)
        } else {
            math::fer_partial_uniform_load(w, a, b, length)
        };
        self.scatter_fer(e, &fer);
        self.loads.elements[e].segments.push((a, b, w));
        self.loads.total_vertical += w * (b - a);
    }

    /// Subtract an element's fixed end reactions from the global load vector
    fn scatter_fer(&mut self, e: usize, fer_local: &Vec6) {
        let element = self.mesh.elements[e];
        let (cos, sin) = element.direction_cosines();
        let t = math::beam_transformation_matrix(cos, sin);
        let fer_global = t.transpose() * fer_local;

        for (k, dof) in element.dofs().into_iter().enumerate() {
            self.loads.nodal[dof] -= fer_global[k];
        }
        self.loads.elements[e].fer += fer_local;
    }
}

fn check_magnitude(value: f64) -> BridgeResult<()> {
    if !value.is_finite() {
        return Err(BridgeError::InvalidLoad(format!(
            "load magnitude {value} is not finite"
        )));
    }
    Ok(())
}

/// Validate every load, then assemble them; nothing is returned on failure
pub fn assemble_loads(mesh: &Mesh, loads: &[Load], self_weight: Option<f64>) -> BridgeResult<AssembledLoads> {
    let mut assembler = LoadAssembler::new(mesh);
    for load in loads {
        assembler.validate(load)?;
    }
    for load in loads {
        assembler.add(load)?;
    }
    if let Some(gravity) = self_weight {
        assembler.add_self_weight(gravity);
    }
    Ok(assembler.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;
    use approx::assert_relative_eq;

    fn mesh() -> Mesh {
        MeshBuilder::new(10.0, 5).build().unwrap()
    }

    fn vertical_sum(loads: &AssembledLoads) -> f64 {
        (0..loads.nodal.len() / 3).map(|n| loads.nodal[n * 3 + 1]).sum()
    }

    #[test]
    fn test_point_on_node_is_direct() {
        let mesh = mesh();
        let loads = assemble_loads(&mesh, &[Load::point(-100.0, 4.0)], None).unwrap();
        assert_relative_eq!(loads.nodal[2 * 3 + 1], -100.0);
        assert!(loads.elements.iter().all(|e| e.point_loads.is_empty()));
    }

    #[test]
    fn test_point_between_nodes_keeps_equilibrium() {
        let mesh = mesh();
        // 0.5 m into element 1 (2 m to 4 m)
        let loads = assemble_loads(&mesh, &[Load::point(-100.0, 2.5)], None).unwrap();
        let f = &loads.nodal;

        assert_relative_eq!(vertical_sum(&loads), -100.0, epsilon = 1e-9);
        // Moments about x = 0: Σ (F_y x + M) equals -100 * 2.5
        let moment: f64 = (0..6).map(|n| f[n * 3 + 1] * 2.0 * n as f64 + f[n * 3 + 2]).sum();
        assert_relative_eq!(moment, -250.0, epsilon = 1e-9);
        // Not a simple linear split
        assert!((f[4] - (-75.0)).abs() > 1.0);
        assert_eq!(loads.elements[1].point_loads, vec![(0.5, -100.0)]);
    }

    #[test]
    fn test_distributed_over_partial_elements() {
        let mesh = mesh();
        let loads = assemble_loads(&mesh, &[Load::distributed(-10.0, 1.0, 7.0)], None).unwrap();
        assert_relative_eq!(vertical_sum(&loads), -60.0, epsilon = 1e-9);
        assert_relative_eq!(loads.total_vertical, -60.0, epsilon = 1e-9);
        assert_eq!(loads.elements[0].segments, vec![(1.0, 2.0, -10.0)]);
        assert_eq!(loads.elements[1].segments, vec![(0.0, 2.0, -10.0)]);
        assert!(loads.elements[4].segments.is_empty());
    }

    #[test]
    fn test_full_element_uniform_end_moments() {
        let mesh = mesh();
        let loads = assemble_loads(&mesh, &[Load::uniform(-12.0)], None).unwrap();
        // Interior node moments cancel, end moments are ∓ wL²/12
        assert_relative_eq!(loads.nodal[2], -12.0 * 4.0 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(loads.nodal[3 * 2 + 2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(loads.nodal[5 * 3 + 2], 12.0 * 4.0 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vehicle_axles() {
        let mesh = mesh();
        let truck = VehicleLoad::two_axle(-50.0, -80.0, 3.0, 5.0);
        let loads = assemble_loads(&mesh, &[Load::vehicle(truck.clone())], None).unwrap();
        assert_relative_eq!(loads.total_vertical, -130.0, epsilon = 1e-9);

        let rear_off = assemble_loads(&mesh, &[Load::vehicle(truck.at(8.0))], None).unwrap();
        assert_relative_eq!(rear_off.total_vertical, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_self_weight() {
        let mesh = mesh();
        let loads = assemble_loads(&mesh, &[], Some(9.81)).unwrap();
        let w = mesh.sections[0].weight_per_length(9.81);
        assert_relative_eq!(loads.total_vertical, -w * 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_out_of_range_loads_rejected() {
        let mesh = mesh();
        for load in [
            Load::point(-1.0, 10.5),
            Load::point(-1.0, -0.1),
            Load::point_at_ratio(-1.0, 1.2),
            Load::distributed(-1.0, 2.0, 11.0),
            Load::distributed(-1.0, 5.0, 5.0),
            Load::vehicle(VehicleLoad::two_axle(-1.0, -1.0, 2.0, -3.0)),
            Load::point(f64::NAN, 2.0),
        ] {
            let err = assemble_loads(&mesh, &[Load::point(-5.0, 1.0), load], None).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidLoad(_)), "{err}");
        }
    }

    #[test]
    fn test_increments() {
        let loading = ElementLoading {
            fer: Vec6::zeros(),
            point_loads: vec![(1.0, -10.0)],
            segments: vec![(0.0, 2.0, -3.0)],
        };
        assert_relative_eq!(loading.shear_increment(0.5), -1.5);
        assert_relative_eq!(loading.shear_increment(2.0), -16.0);
        // -10 * 1 + (-3) * 2 * (2 - 1)
        assert_relative_eq!(loading.moment_increment(2.0), -16.0);
    }
}
