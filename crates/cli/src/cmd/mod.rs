mod matrix;
mod release;

pub use matrix::{MatrixArgs, cmd_matrix};
pub use release::cmd_release;
