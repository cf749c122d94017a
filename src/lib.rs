pub mod cache;
pub mod carousel;
pub mod cell;
pub mod config;
pub mod display;
pub mod font;
pub mod image;
pub mod input;
pub mod pages;
pub mod task;
pub mod weather;
