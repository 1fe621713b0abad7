mod bus_listener;
mod message_router;

pub use bus_listener::BusListener;
pub use message_router::MessageRouter;
