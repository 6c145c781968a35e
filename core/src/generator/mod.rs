use crate::*;
use ndarray::Array2;

pub use random::*;

mod random;

/// Produces a freshly shuffled card layout for the given dimensions. Pair
/// placement policy lives here, not in the engine; callers validate the size
/// before asking for a layout.
pub trait GridGenerator {
    fn generate(&mut self, size: GridSize) -> Array2<Card>;
}
