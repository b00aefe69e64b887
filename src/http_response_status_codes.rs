//! The HTTP response statuses this server produces.

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Status

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpResponseStatusCode {
    OK200,
    NotFound404,
    MethodNotAllowed405,
    InternalServerError500,
    NotImplemented501,
}

impl HttpResponseStatusCode {
    pub fn code(self) -> u16 {
        match self {
            Self::OK200 => 200,
            Self::NotFound404 => 404,
            Self::MethodNotAllowed405 => 405,
            Self::InternalServerError500 => 500,
            Self::NotImplemented501 => 501,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::OK200 => "OK",
            Self::NotFound404 => "Not Found",
            Self::MethodNotAllowed405 => "Method Not Allowed",
            Self::InternalServerError500 => "Internal Server Error",
            Self::NotImplemented501 => "Not Implemented",
        }
    }

    pub fn desc(self) -> &'static str {
        match self {
            Self::OK200 =>
                "The request succeeded.",
            Self::NotFound404 =>
                "The server cannot find the requested resource.",
            Self::MethodNotAllowed405 =>
                "The request method is known by the server but is not \
                 supported by the target resource.",
            Self::InternalServerError500 =>
                "The server has encountered a situation it does not know \
                 how to handle.",
            Self::NotImplemented501 =>
                "The request method is not supported by the server and \
                 cannot be handled.",
        }
    }
}
