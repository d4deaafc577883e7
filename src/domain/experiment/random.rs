//! Source of random draws for variant allocation

/// Supplies draws that should lie in `[0, 1)`.
///
/// Returning `None` signals an exhausted source. The engine rejects `None`
/// and out-of-range values alike.
pub trait RandomSource: Send {
    /// Produce the next draw
    fn next_draw(&mut self) -> Option<f64>;
}

impl<F> RandomSource for F
where
    F: FnMut() -> Option<f64> + Send,
{
    fn next_draw(&mut self) -> Option<f64> {
        self()
    }
}
