pub mod mfapi;
pub mod util;
