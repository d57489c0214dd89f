//! File-format boundaries: earnings text, CSV series, model artifact, exports.

pub mod earnings;
pub mod export;
pub mod model;
pub mod series;
