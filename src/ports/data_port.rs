//! Market data access port trait.

use crate::domain::error::BiasError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Establish the provider session. Called once per process before any fetch.
    fn authenticate(&self) -> Result<(), BiasError> {
        Ok(())
    }

    /// The most recent `count` bars for `symbol` at `frequency`, oldest first.
    /// May return fewer bars when the provider has less history.
    fn fetch_bars(
        &self,
        symbol: &str,
        frequency: &str,
        count: usize,
    ) -> Result<Vec<OhlcvBar>, BiasError>;
}
