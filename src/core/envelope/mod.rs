pub mod foundation_wall;
pub mod slab;
pub mod surfaces;

pub use foundation_wall::{foundation_wall_u_factors, FoundationWallUFactors};
pub use slab::{basement_slab_u_factor, slab_f_factor};
