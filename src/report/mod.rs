pub mod html;
pub mod pdf;
pub mod svg;
pub mod zip;
