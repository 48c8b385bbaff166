pub mod transports;
