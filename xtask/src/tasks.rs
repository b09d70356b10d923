pub mod ci;
pub mod coverage;
pub mod distribute;
