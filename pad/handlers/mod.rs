pub mod pad;
pub mod predict;
pub mod upload;
