pub mod engine;
pub mod io;
pub mod model;
pub mod palette;
pub mod panels;
pub mod scale;
pub mod scene;
pub mod stats;
pub mod tsv;
pub mod view;
