//! Terminal plotting.

mod ascii;

pub use ascii::render_ascii_plot;
