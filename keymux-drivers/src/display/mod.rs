//! Display word writers

pub mod bitbang;

pub use bitbang::BitBangWriter;
