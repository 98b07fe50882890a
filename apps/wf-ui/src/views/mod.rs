pub mod circuit_view;
pub mod forms;
pub mod results_view;
pub mod sequence_view;

pub use circuit_view::CircuitView;
pub use forms::FormsView;
pub use results_view::ResultsView;
pub use sequence_view::SequenceView;
