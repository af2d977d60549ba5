pub mod scalar;
pub mod string;
