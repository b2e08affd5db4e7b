/// Opt-in deviations from the canonical instruction semantics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `8XY6`/`8XYE` shift Vy and store the result in Vx, as the original COSMAC VIP
    /// interpreter did. Off by default: Vx is shifted in place.
    pub shift_from_vy: bool,
}

/// Engine construction options.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,
    /// Seed for the `CXNN` random source; drawn from the OS when `None`.
    pub seed: Option<u64>,
}
