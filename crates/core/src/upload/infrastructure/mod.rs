pub mod http_event_sink;
