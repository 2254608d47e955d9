mod coordinator;

pub use coordinator::RenewalCoordinator;
