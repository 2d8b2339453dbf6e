pub mod appliance;
pub mod environment;
pub mod intent;
pub mod recommendation;

pub use appliance::*;
pub use environment::*;
pub use intent::*;
pub use recommendation::*;
