pub mod warn;
pub mod myfrom;
pub mod html {
    pub mod meta;
}
pub mod ahtml;
pub mod http_request_method;
pub mod http_response_status_codes;
pub mod util;
pub mod config;
pub mod form;
pub mod layout;
pub mod webutils;
pub mod apachelog;
pub mod handlers;
pub mod server;
