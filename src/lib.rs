pub mod io_struct;
pub mod logging;
pub mod middleware;
pub mod prompt;
pub mod proxy_state;
pub mod rate_limit;
pub mod server;
pub mod upstream;
