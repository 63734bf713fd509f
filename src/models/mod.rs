pub mod dimensions;
pub mod elements;
pub mod request;
pub mod result;
