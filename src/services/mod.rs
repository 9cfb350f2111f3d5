pub mod backend;
pub mod dispatcher;
pub mod renderer;
pub mod session;
