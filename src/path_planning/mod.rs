// Path Planning algorithms module

pub mod informed_rrt_star;

pub use informed_rrt_star::*;
