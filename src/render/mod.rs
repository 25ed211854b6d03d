mod crisp;
mod picking;

pub use crisp::crisp_line_coordinate;
pub use picking::{aliased_disc_shape, picking_color, picking_index};
