pub mod env;
pub mod interpreter;
pub mod maze;
pub mod robot;
pub mod value;
