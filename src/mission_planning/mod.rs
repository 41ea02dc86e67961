// Mission planning module: per-agent path following

pub mod path_component;

pub use path_component::*;
