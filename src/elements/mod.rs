//! Structural elements module

mod node;
mod section;
mod support;

pub use node::{Element, Node, DOFS_PER_NODE, DOF_THETA, DOF_U, DOF_V};
pub use section::{MaterialGrade, SectionOverride, SectionProperties};
pub use support::{PierConfig, PierLayout, Releases, SupportType};
