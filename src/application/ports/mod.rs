//! Ports - Boundary interfaces between the application core and the host

pub mod outbound;
