mod service;

pub use service::InstallationService;
