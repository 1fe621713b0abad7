mod service;

pub use service::CommunicationService;
