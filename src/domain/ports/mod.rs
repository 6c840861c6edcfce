mod http_port;

pub use http_port::{HttpPort, HttpRequest, HttpResponse};

#[cfg(test)]
pub use http_port::MockHttpPort;

#[cfg(test)]
pub mod mocks {
    pub use super::http_port::mock::{Route, RoutedHttp};
}
