/// Actions an observer can take during a Nelder-Mead pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the pass after the current step and report the best point so far.
    StopEarly,
}
